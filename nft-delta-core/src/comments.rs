//! Comment removal ahead of structural parsing.
//!
//! Block comments go first, then every remaining line loses a trailing `//`
//! or `#` comment. Markers inside double-quoted strings are plain text, so
//! `comment "rule #3"` survives intact.

/// Remove `/* ... */` block comments and trailing `//` / `#` line comments.
///
/// An unterminated block comment runs to the end of the input. Lines are
/// never dropped: a line that held only a comment comes back empty.
pub fn strip_comments(text: &str) -> String {
    let (mut current, mut removed) = strip_block_comments(text);
    // Dropping a block can leave `/` right before `*`.
    while removed {
        let (next, again) = strip_block_comments(&current);
        current = next;
        removed = again;
    }

    current
        .split('\n')
        .map(strip_line_comment)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_block_comments(text: &str) -> (String, bool) {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut removed = false;
    let mut in_string = false;
    // Quotes after an unquoted `#` or `//` are comment text, not strings.
    let mut in_line_comment = false;
    let mut copied_from = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' if bytes.get(i + 1).is_some_and(|next| *next != b'\n') => i += 1,
                b'"' | b'\n' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }

        match b {
            b'\n' => in_line_comment = false,
            b'"' if !in_line_comment => in_string = true,
            b'#' => in_line_comment = true,
            // Advance one byte only: in `//*` the second `/` opens a block.
            b'/' if bytes.get(i + 1) == Some(&b'/') => in_line_comment = true,
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&text[copied_from..i]);
                removed = true;
                let end = text[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |pos| i + 2 + pos + 2);
                i = end;
                copied_from = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    out.push_str(&text[copied_from..]);
    (out, removed)
}

fn strip_line_comment(line: &str) -> &str {
    match line_comment_start(line) {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}

fn line_comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_string => i += 1,
            b'"' => in_string = !in_string,
            b'#' if !in_string => return Some(i),
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}
