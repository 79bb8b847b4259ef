//! Source preparation: comment blanking and statement splitting.
//!
//! Comments are overwritten with spaces instead of removed so every byte
//! offset in the prepared text is also a valid offset into the original
//! input. Error positions therefore never need remapping.

use crate::error::GenError;

/// A statement slice of the prepared text and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Build a syntax error for a byte offset into `input`.
pub fn syntax_error(input: &str, offset: usize, message: impl Into<String>) -> GenError {
    let (line, column) = line_col(input, offset);
    GenError::Syntax {
        position: offset,
        line,
        column,
        message: message.into(),
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub fn line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(input.len());
    while !input.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Replace `-- `, `#` and `/* */` comments with spaces, keeping quoted text intact.
pub fn blank_comments(input: &str) -> Result<String, GenError> {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                let end = quoted_end(input, i, c)
                    .ok_or_else(|| syntax_error(input, i, format!("unterminated {} quote", c)))?;
                out.push_str(&input[i + 1..=end]);
                while chars.peek().is_some_and(|&(j, _)| j <= end) {
                    chars.next();
                }
            }
            '-' if bytes.get(i + 1) == Some(&b'-')
                && bytes
                    .get(i + 2)
                    .is_none_or(|b| b.is_ascii_whitespace()) =>
            {
                let end = input[i..].find('\n').map(|n| i + n).unwrap_or(input.len());
                blank(&mut out, &input[i..end]);
                while chars.peek().is_some_and(|&(j, _)| j < end) {
                    chars.next();
                }
            }
            '#' => {
                let end = input[i..].find('\n').map(|n| i + n).unwrap_or(input.len());
                blank(&mut out, &input[i..end]);
                while chars.peek().is_some_and(|&(j, _)| j < end) {
                    chars.next();
                }
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = input[i + 2..]
                    .find("*/")
                    .map(|n| i + 2 + n + 2)
                    .ok_or_else(|| syntax_error(input, i, "unterminated block comment"))?;
                blank(&mut out, &input[i..end]);
                while chars.peek().is_some_and(|&(j, _)| j < end) {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    debug_assert_eq!(out.len(), input.len());
    Ok(out)
}

/// Byte offset of the closing quote of the quoted run starting at `start`.
/// Doubled quotes escape, and so does a backslash inside `'` and `"` strings.
fn quoted_end(input: &str, start: usize, quote: char) -> Option<usize> {
    let bytes = input.as_bytes();
    let q = quote as u8;
    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' && quote != '`' {
            i += 2;
            continue;
        }
        if b == q {
            if bytes.get(i + 1) == Some(&q) {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

fn blank(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat_n(' ', c.len_utf8()));
        }
    }
}

/// Split prepared text on `;` outside quotes. Blank statements are dropped.
pub fn split_statements(prepared: &str) -> Vec<Statement<'_>> {
    let bytes = prepared.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            q @ (b'\'' | b'"' | b'`') => {
                // Comments are already blanked, so quotes are balanced.
                i = quoted_end(prepared, i, q as char).unwrap_or(bytes.len()) + 1;
                continue;
            }
            b';' => {
                push_statement(&mut statements, prepared, start, i);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    push_statement(&mut statements, prepared, start, prepared.len());
    statements
}

fn push_statement<'a>(out: &mut Vec<Statement<'a>>, text: &'a str, start: usize, end: usize) {
    let raw = &text[start..end];
    let trimmed = raw.trim_start();
    if trimmed.trim_end().is_empty() {
        return;
    }
    out.push(Statement {
        text: trimmed.trim_end(),
        offset: start + (raw.len() - trimmed.len()),
    });
}
