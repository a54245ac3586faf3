//! Safe SQL identifier handling.
//!
//! [`Ident`] represents a possibly qualified identifier (`table.column`) used
//! for where-clause attributes and [`Value::Column`](crate::Value::Column)
//! references. Rendering always goes through the dialect's quoting rules.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts may use any of `"..."`, `` `...` `` or `[...]`, with the
//!   closing delimiter doubled to escape it; they allow any character except NUL.
//!
//! # Example
//! ```ignore
//! use sqlweave::{Ident, dialect::MySql};
//!
//! let c = Ident::parse(r#"users."Display Name""#)?;
//! assert_eq!(c.to_sql(&MySql, true), "`users`.`Display Name`");
//! # Ok::<(), sqlweave::WeaveError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
}

/// A SQL identifier (column, table, or schema name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

fn closing_delimiter(open: char) -> Option<char> {
    match open {
        '"' => Some('"'),
        '`' => Some('`'),
        '[' => Some(']'),
        _ => None,
    }
}

impl Ident {
    /// Create a single quoted identifier part.
    pub fn quoted(name: &str) -> WeaveResult<Self> {
        if name.is_empty() {
            return Err(WeaveError::validation("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(WeaveError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"` or `` `a b` `` or `[a b]`
    /// - Mixed: `public."UserTable".id`
    pub fn parse(s: &str) -> WeaveResult<Self> {
        if s.is_empty() {
            return Err(WeaveError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(WeaveError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(WeaveError::validation("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(WeaveError::validation(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if let Some(close) = chars.peek().copied().and_then(closing_delimiter) {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == close => {
                            if chars.peek() == Some(&close) {
                                chars.next();
                                name.push(close);
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => return Err(WeaveError::validation("Unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(WeaveError::validation("Empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(WeaveError::validation(if name.is_empty() {
                        format!("Invalid identifier start character: '{c}'")
                    } else {
                        format!("Invalid character in identifier: '{c}'")
                    }));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(WeaveError::validation("Empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        if parts.is_empty() {
            return Err(WeaveError::validation("Empty identifier"));
        }

        Ok(Self { parts })
    }

    /// Render the identifier for `dialect`.
    ///
    /// Quoted parts are always quoted; unquoted parts only when `quote_all` is set.
    pub fn to_sql(&self, dialect: &dyn Dialect, quote_all: bool) -> String {
        let mut out = String::new();
        self.write_sql(dialect, quote_all, &mut out);
        out
    }

    pub(crate) fn write_sql(&self, dialect: &dyn Dialect, quote_all: bool, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) if !quote_all => out.push_str(s),
                IdentPart::Unquoted(s) | IdentPart::Quoted(s) => {
                    out.push_str(&dialect.quote_identifier(s));
                }
            }
        }
    }
}
