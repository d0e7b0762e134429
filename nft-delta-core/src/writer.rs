use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::delta::{delta, ChainContent, ChainDelta, TableDelta};
use crate::model::Ruleset;

/// Errors that can occur while writing rendered output.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to write output file.
    #[error("failed to write ruleset file: {0}")]
    Io(#[from] std::io::Error),
}

/// Render the tables, chains, and rules `current` adds on top of `base`.
pub fn render_delta(current: &Ruleset, base: &Ruleset) -> String {
    write_delta(&delta(current, base))
}

/// Serialize a computed delta as declarative ruleset text.
///
/// Indentation is copied from the source. Chains of one table are separated
/// by a blank line. The result ends with a newline unless it is empty.
pub fn write_delta(tables: &[TableDelta]) -> String {
    let mut out = String::new();
    for table in tables {
        push_line(
            &mut out,
            &format!("{}table {} {} {{", table.indent, table.family, table.name),
        );
        for (idx, chain) in table.chains.iter().enumerate() {
            if idx > 0 {
                push_line(&mut out, "");
            }
            write_chain(&mut out, chain);
        }
        push_line(&mut out, &format!("{}}}", table.indent));
    }
    out
}

/// Write rendered text to `path`.
pub fn write_file(path: &Path, text: &str) -> Result<(), WriteError> {
    fs::write(path, text)?;
    Ok(())
}

fn write_chain(out: &mut String, chain: &ChainDelta) {
    push_line(out, &format!("{}chain {} {{", chain.indent, chain.name));
    match &chain.content {
        ChainContent::Full {
            header_lines,
            blank_after_header,
            rules,
        } => {
            for line in header_lines {
                push_line(out, line);
            }
            if *blank_after_header && !rules.is_empty() {
                push_line(out, "");
            }
            for line in rules {
                push_line(out, line);
            }
        }
        ChainContent::Partial { rules } => {
            for line in rules {
                push_line(out, line);
            }
        }
    }
    push_line(out, &format!("{}}}", chain.indent));
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
