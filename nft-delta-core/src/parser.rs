use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::comments::strip_comments;
use crate::model::{Chain, Ruleset, Table};

static TABLE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)table\s+(\S+)\s+(\S+)\s*\{").expect("table pattern is valid")
});

static CHAIN_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)chain\s+(\S+)\s*\{").expect("chain pattern is valid")
});

/// Errors that can occur while parsing ruleset text into a [`Ruleset`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// An opening brace has no matching closing brace before end of input.
    #[error("unmatched '{{' in {block} opened on line {line}")]
    UnmatchedBrace { block: String, line: usize },
    /// A brace scan was requested at an offset that does not hold `{`.
    #[error("brace scan must start at '{{', found none at offset {0}")]
    NotAtBrace(usize),
    /// Failed to read input file.
    #[error("failed to read ruleset file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse declarative ruleset text into a [`Ruleset`].
///
/// Comments are stripped first. Only `table` and nested `chain` blocks are
/// recovered; anything else inside a table (sets, maps) is skipped.
pub fn parse(text: &str) -> Result<Ruleset, ParseError> {
    let clean = strip_comments(text);
    let mut tables: Vec<TableDraft> = Vec::new();
    let mut offset = 0;

    while let Some(caps) = TABLE_OPEN.captures(&clean[offset..]) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let open = offset + whole.end() - 1;
        let (family, name) = (&caps[2], &caps[3]);
        let close = matching_brace(&clean, open)
            .ok_or_else(|| unmatched(&clean, open, format!("table {family} {name}")))?;

        let idx = match tables
            .iter()
            .position(|t| t.family == family && t.name == name)
        {
            Some(idx) => {
                debug!(family, name, "merging repeated table declaration");
                idx
            }
            None => {
                tables.push(TableDraft::new(family, name, &caps[1]));
                tables.len() - 1
            }
        };
        parse_table_body(&clean, open + 1, close, &mut tables[idx])?;

        offset = close + 1;
    }

    debug!(tables = tables.len(), "parsed ruleset");
    Ok(Ruleset::new(
        tables.into_iter().map(TableDraft::finish).collect(),
    ))
}

/// Parse a ruleset file into a [`Ruleset`].
pub fn parse_file(path: &Path) -> Result<Ruleset, ParseError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

/// Given the offset of a `{`, return the offset of its matching `}`.
///
/// Braces inside double-quoted strings do not count.
pub fn find_matching_brace(text: &str, open: usize) -> Result<usize, ParseError> {
    if text.as_bytes().get(open) != Some(&b'{') {
        return Err(ParseError::NotAtBrace(open));
    }
    matching_brace(text, open).ok_or_else(|| unmatched(text, open, "block".to_string()))
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (pos, b) in text.bytes().enumerate().skip(open) {
        if in_string {
            if b == b'\n' {
                in_string = false;
                escaped = false;
            } else if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }
    None
}

fn unmatched(text: &str, open: usize, block: String) -> ParseError {
    let line = text[..open].matches('\n').count() + 1;
    ParseError::UnmatchedBrace { block, line }
}

fn parse_table_body(
    clean: &str,
    start: usize,
    end: usize,
    table: &mut TableDraft,
) -> Result<(), ParseError> {
    let body = &clean[start..end];
    let mut offset = 0;

    while let Some(caps) = CHAIN_OPEN.captures(&body[offset..]) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let open = offset + whole.end() - 1;
        let name = &caps[2];
        let close = matching_brace(body, open)
            .ok_or_else(|| unmatched(clean, start + open, format!("chain {name}")))?;

        let mut chain = ChainDraft::new(name, &caps[1]);
        chain.classify(&body[open + 1..close]);
        table.absorb(chain);

        offset = close + 1;
    }
    Ok(())
}

fn is_header(content: &str) -> bool {
    if !content.ends_with(';') {
        return false;
    }
    let padded = format!(" {content} ");
    content.starts_with("type ")
        || content.starts_with("policy ")
        || content.starts_with("flags ")
        || padded.contains(" hook ")
        || padded.contains(" priority ")
}

struct TableDraft {
    family: String,
    name: String,
    indent: String,
    chains: Vec<ChainDraft>,
}

impl TableDraft {
    fn new(family: &str, name: &str, indent: &str) -> Self {
        Self {
            family: family.to_string(),
            name: name.to_string(),
            indent: indent.to_string(),
            chains: Vec::new(),
        }
    }

    fn absorb(&mut self, chain: ChainDraft) {
        match self.chains.iter_mut().find(|c| c.name == chain.name) {
            Some(existing) => {
                debug!(table = %self.name, chain = %chain.name, "merging repeated chain declaration");
                existing.merge(chain);
            }
            None => self.chains.push(chain),
        }
    }

    fn finish(self) -> Table {
        debug!(family = %self.family, table = %self.name, chains = self.chains.len(), "parsed table");
        Table::new(
            self.family,
            self.name,
            self.indent,
            self.chains.into_iter().map(ChainDraft::finish).collect(),
        )
    }
}

struct ChainDraft {
    name: String,
    indent: String,
    header_lines: Vec<String>,
    rules: Vec<String>,
    blank_after_header: bool,
}

impl ChainDraft {
    fn new(name: &str, indent: &str) -> Self {
        Self {
            name: name.to_string(),
            indent: indent.to_string(),
            header_lines: Vec::new(),
            rules: Vec::new(),
            blank_after_header: false,
        }
    }

    /// Sort body lines into headers and rules, in source order.
    fn classify(&mut self, body: &str) {
        let mut saw_header = false;
        let mut pending_blank = false;

        for raw in body.lines() {
            let line = raw.trim_end();
            if line.is_empty() {
                if saw_header && self.rules.is_empty() {
                    pending_blank = true;
                }
                continue;
            }

            if self.rules.is_empty() && is_header(line.trim_start()) {
                self.header_lines.push(line.to_string());
                saw_header = true;
            } else {
                if saw_header && pending_blank {
                    self.blank_after_header = true;
                    pending_blank = false;
                }
                self.rules.push(line.to_string());
            }
        }
    }

    fn merge(&mut self, later: ChainDraft) {
        if self.header_lines.is_empty() {
            self.header_lines = later.header_lines;
            self.blank_after_header = later.blank_after_header;
        }
        self.rules.extend(later.rules);
    }

    fn finish(self) -> Chain {
        Chain::new(
            self.name,
            self.indent,
            self.header_lines,
            self.rules,
            self.blank_after_header,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_brace_tracks_depth() {
        let text = "a { b { c } d } e";
        assert_eq!(find_matching_brace(text, 2).expect("match"), 14);
        assert_eq!(find_matching_brace(text, 6).expect("match"), 10);
    }

    #[test]
    fn matching_brace_skips_quoted_braces() {
        let text = r#"{ comment "}{" }"#;
        assert_eq!(find_matching_brace(text, 0).expect("match"), text.len() - 1);
    }

    #[test]
    fn matching_brace_requires_open_brace() {
        assert!(matches!(
            find_matching_brace("abc", 1),
            Err(ParseError::NotAtBrace(1))
        ));
    }

    #[test]
    fn header_detection_uses_whole_words() {
        assert!(is_header("type filter hook input priority 0;"));
        assert!(is_header("policy drop;"));
        assert!(is_header("flags offload;"));
        assert!(is_header("hook ingress device eth0 priority 0;"));
        assert!(!is_header("type filter hook input priority 0"));
        assert!(!is_header("meta hookish 1;"));
        assert!(!is_header("tcp dport 22 accept;"));
    }

    #[test]
    fn headers_stop_at_first_rule() {
        let mut chain = ChainDraft::new("input", "\t");
        chain.classify("\n\t\ttype filter hook input priority 0;\n\n\t\tiif lo accept\n\t\tpolicy drop;\n");
        assert_eq!(chain.header_lines, vec!["\t\ttype filter hook input priority 0;"]);
        assert_eq!(chain.rules, vec!["\t\tiif lo accept", "\t\tpolicy drop;"]);
        assert!(chain.blank_after_header);
    }

    #[test]
    fn blank_line_before_headers_is_not_a_separator() {
        let mut chain = ChainDraft::new("input", "\t");
        chain.classify("\n\n\t\ttype filter hook input priority 0;\n\t\tiif lo accept\n");
        assert!(!chain.blank_after_header);
    }
}
