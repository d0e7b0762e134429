//! DNAT destination inference for Docker-style IPv6 rulesets.
//!
//! Docker's `ip6tables-nft` output leaves the nat table with a bare
//! `xt target "DNAT"` while the filter table carries the real destination in
//! an `ip6 daddr ADDR ... dport PORT ... accept` rule. When exactly one such
//! address exists for the rule's protocol and port, the NAT rule is rewritten
//! to `dnat to [ADDR]:PORT`. Several candidates are never guessed between.
//!
//! This pass is independent from the parser and can be switched off through
//! [`crate::NormalizeOptions::infer_dnat`].

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

const UNRESOLVED_DNAT: &str = r#"xt target "DNAT""#;

static COMPANION_ACCEPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ip6\s+daddr\s+(\S+).*?\b(tcp|udp)\s+dport\s+(\d+).*?\baccept\b")
        .expect("companion accept pattern is valid")
});

static TRANSPORT_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(tcp|udp)\s+dport\s+(\d+)\b").expect("transport port pattern is valid")
});

/// Protocol (`tcp`/`udp`) and destination port.
pub type ServicePort = (String, String);

/// Collect accept-rule destination addresses per protocol and port.
pub fn companion_destinations(text: &str) -> BTreeMap<ServicePort, BTreeSet<String>> {
    let mut found: BTreeMap<ServicePort, BTreeSet<String>> = BTreeMap::new();
    for caps in COMPANION_ACCEPT.captures_iter(text) {
        found
            .entry((caps[2].to_string(), caps[3].to_string()))
            .or_default()
            .insert(caps[1].to_string());
    }
    found
}

/// Rewrite undestined `xt target "DNAT"` lines whose destination is unambiguous.
pub fn infer_dnat_targets(text: &str) -> String {
    let destinations = companion_destinations(text);
    text.split('\n')
        .map(|line| resolve_line(line, &destinations))
        .collect::<Vec<_>>()
        .join("\n")
}

fn resolve_line<'a>(
    line: &'a str,
    destinations: &BTreeMap<ServicePort, BTreeSet<String>>,
) -> Cow<'a, str> {
    if !line.contains(UNRESOLVED_DNAT) || line.contains("to:") || line.contains("dnat to") {
        return Cow::Borrowed(line);
    }
    let Some(caps) = TRANSPORT_PORT.captures(line) else {
        return Cow::Borrowed(line);
    };
    let (proto, port) = (&caps[1], &caps[2]);

    let mut candidates = destinations
        .get(&(proto.to_string(), port.to_string()))
        .into_iter()
        .flatten();
    match (candidates.next(), candidates.next()) {
        (Some(addr), None) => {
            let target = format!("dnat to {}:{port}", bracket_v6(addr));
            debug!(proto, port, %target, "inferred DNAT destination");
            Cow::Owned(line.replace(UNRESOLVED_DNAT, &target))
        }
        (None, _) => {
            debug!(proto, port, "no companion accept rule for DNAT target");
            Cow::Borrowed(line)
        }
        (Some(_), Some(_)) => {
            debug!(proto, port, "ambiguous DNAT destination; leaving rule unchanged");
            Cow::Borrowed(line)
        }
    }
}

fn bracket_v6(addr: &str) -> Cow<'_, str> {
    if addr.contains(':') && !(addr.starts_with('[') && addr.ends_with(']')) {
        Cow::Owned(format!("[{addr}]"))
    } else {
        Cow::Borrowed(addr)
    }
}
