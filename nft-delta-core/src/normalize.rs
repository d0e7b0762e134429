//! Canonicalization of equivalent statement spellings.
//!
//! `iptables-nft` style rulesets print NAT targets as `xt target "DNAT"`
//! and carry live counter values. Both are rewritten here so that a rule
//! compares equal to its canonical nftables spelling.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::comments::strip_comments;
use crate::infer::infer_dnat_targets;

static XT_NAT_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bxt\s+target\s+"?(DNAT|SNAT|MASQUERADE)"?(?:\s+to\s*:\s*([^\s;]+))?"#)
        .expect("xt target pattern is valid")
});

static COUNTER_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcounter\s+packets\s+\d+\s+bytes\s+\d+\b").expect("counter pattern is valid")
});

/// Configures which normalization passes run.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Fill in missing `xt target "DNAT"` destinations from companion
    /// `ip6 daddr ... accept` rules.
    pub infer_dnat: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { infer_dnat: true }
    }
}

/// Normalize ruleset text with default options.
pub fn normalize(text: &str) -> String {
    normalize_with_options(text, &NormalizeOptions::default())
}

/// Strip comments and rewrite known aliases into canonical form.
///
/// Never fails: text that matches no known alias passes through unchanged.
pub fn normalize_with_options(text: &str, opts: &NormalizeOptions) -> String {
    let text = strip_comments(text);
    let text = rewrite_legacy_targets(&text);
    let text = erase_counter_values(&text);
    if opts.infer_dnat {
        infer_dnat_targets(&text)
    } else {
        debug!("DNAT inference disabled");
        text
    }
}

/// Rewrite `xt target "MASQUERADE"` and destined `DNAT`/`SNAT` targets.
///
/// `DNAT` and `SNAT` without `to:` are left for [`infer_dnat_targets`].
pub fn rewrite_legacy_targets(text: &str) -> String {
    XT_NAT_TARGET
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let end = caps.get(0).map_or(text.len(), |m| m.end());
            let at_boundary = text[end..]
                .chars()
                .next()
                .is_none_or(|next| next.is_whitespace() || next == ';');
            if !at_boundary {
                return whole.to_string();
            }

            match (&caps[1], caps.get(2)) {
                ("MASQUERADE", _) => "masquerade".to_string(),
                ("DNAT", Some(dest)) => format!("dnat to {}", dest.as_str()),
                ("SNAT", Some(dest)) => format!("snat to {}", dest.as_str()),
                _ => whole.to_string(),
            }
        })
        .into_owned()
}

/// Replace `counter packets N bytes N` with a bare `counter`.
pub fn erase_counter_values(text: &str) -> String {
    COUNTER_VALUES.replace_all(text, "counter").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_masquerade_with_or_without_quotes() {
        assert_eq!(
            rewrite_legacy_targets("oifname \"eth0\" xt target \"MASQUERADE\";"),
            "oifname \"eth0\" masquerade;"
        );
        assert_eq!(rewrite_legacy_targets("xt target MASQUERADE"), "masquerade");
    }

    #[test]
    fn rewrites_destined_nat_targets() {
        assert_eq!(
            rewrite_legacy_targets("tcp dport 80 xt target \"DNAT\" to:10.0.0.5:8080"),
            "tcp dport 80 dnat to 10.0.0.5:8080"
        );
        assert_eq!(
            rewrite_legacy_targets("xt target \"SNAT\" to : 192.0.2.1;"),
            "snat to 192.0.2.1;"
        );
    }

    #[test]
    fn leaves_undestined_dnat_and_snat_alone() {
        let line = "tcp dport 80 xt target \"DNAT\"";
        assert_eq!(rewrite_legacy_targets(line), line);
        let line = "xt target \"SNAT\";";
        assert_eq!(rewrite_legacy_targets(line), line);
    }

    #[test]
    fn requires_a_statement_boundary_after_target() {
        let line = "xt target \"MASQUERADE\"x";
        assert_eq!(rewrite_legacy_targets(line), line);
    }

    #[test]
    fn erases_counter_values() {
        assert_eq!(
            erase_counter_values("ip saddr 10.0.0.0/8 counter packets 10 bytes 200 accept"),
            "ip saddr 10.0.0.0/8 counter accept"
        );
        assert_eq!(
            erase_counter_values("counter packets 999 bytes 1"),
            erase_counter_values("counter packets 10 bytes 200")
        );
    }

    #[test]
    fn normalize_runs_every_pass_and_is_idempotent() {
        let input = "table ip nat { # docker\n\tchain POSTROUTING {\n\t\tcounter packets 4 bytes 240 xt target \"MASQUERADE\" /* legacy */\n\t}\n}\n";
        let once = normalize(input);
        assert_eq!(
            once,
            "table ip nat {\n\tchain POSTROUTING {\n\t\tcounter masquerade \n\t}\n}\n"
        );
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn inference_can_be_disabled() {
        let input = "ip6 daddr 2001:db8::5 tcp dport 8080 accept\ntcp dport 8080 xt target \"DNAT\"";
        let opts = NormalizeOptions { infer_dnat: false };
        assert_eq!(normalize_with_options(input, &opts), input);
        assert!(normalize(input).contains("dnat to [2001:db8::5]:8080"));
    }
}
