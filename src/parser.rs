//! MySQL DDL parser using nom.
//!
//! Turns raw DDL text into [`CreateTable`] declarations, one per
//! `CREATE TABLE` statement, in source order.
//!
//! ```text
//! CREATE TABLE `t_order` (              ─┬─ header: name, TEMPORARY, IF NOT EXISTS
//!   `id` bigint NOT NULL AUTO_INCREMENT, ─┼─ columns: name, type, attributes
//!   PRIMARY KEY (`id`)                   ─┼─ keys and constraints
//! ) ENGINE=InnoDB COMMENT='orders';      ─┴─ table options
//! ```
//!
//! Other statements (`SET`, `DROP TABLE`, `INSERT`, ...) are skipped. One
//! malformed `CREATE TABLE` fails the whole input.

pub mod ast;
mod grammar;
pub mod source;


pub use ast::*;

use crate::error::GenResult;
use source::{blank_comments, split_statements, syntax_error};

/// Parse every `CREATE TABLE` statement in `input`.
pub fn parse(input: &str) -> GenResult<Vec<CreateTable>> {
    let prepared = blank_comments(input)?;
    let mut tables = Vec::new();

    for stmt in split_statements(&prepared) {
        if grammar::create_table_head(stmt.text).is_err() {
            tracing::trace!(offset = stmt.offset, "skipping non CREATE TABLE statement");
            continue;
        }

        let consumed = |remaining: &str| stmt.offset + (stmt.text.len() - remaining.len());
        match grammar::create_table(stmt.text) {
            Ok(("", mut table)) => {
                table.offset = stmt.offset;
                tables.push(table);
            }
            Ok((remaining, _)) => {
                return Err(syntax_error(
                    input,
                    consumed(remaining),
                    format!("unexpected trailing content: '{}'", snippet(remaining)),
                ));
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let message = if e.input.is_empty() {
                    "unexpected end of statement".to_string()
                } else {
                    format!("unexpected input near '{}'", snippet(e.input))
                };
                return Err(syntax_error(input, consumed(e.input), message));
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(syntax_error(
                    input,
                    stmt.offset + stmt.text.len(),
                    "unexpected end of statement",
                ));
            }
        }
    }

    Ok(tables)
}

/// First few words of the offending text, for error messages.
fn snippet(text: &str) -> String {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .nth(24)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let cut = &text[..end];
    cut.split_whitespace().collect::<Vec<_>>().join(" ")
}
