//! Dialect descriptors.
//!
//! A [`Dialect`] tells the scanner which characters quote identifiers and
//! whether backslashes escape quotes, tells the bind mapper which native bind
//! syntax to emit, and tells the escaper how literals are spelled.
//!
//! Descriptors are immutable and are shared between any number of concurrent
//! callers, usually as `&dyn Dialect` or `Arc<dyn Dialect>`.
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::dialect::{self, DialectOptions};
//!
//! let pg = dialect::by_name("postgres", DialectOptions::new())?;
//! assert_eq!(pg.quote_identifier("user"), r#""user""#);
//! # Ok::<(), sqlweave::WeaveError>(())
//! ```

mod builtin;


use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{WeaveError, WeaveResult};

pub use builtin::{Db2, MariaDb, MsSql, MySql, Postgres, Snowflake, Sqlite};

/// Names accepted by [`by_name`].
pub const DIALECT_NAMES: &[&str] = &[
    "postgres",
    "mysql",
    "mariadb",
    "sqlite",
    "mssql",
    "db2",
    "snowflake",
];

/// Native bind-parameter syntax of a dialect.
///
/// This is also the per-dialect switch for whether a repeated bind name
/// reuses one slot (`Numbered`) or takes one slot per occurrence (`Positional`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindStyle {
    /// Anonymous positional markers such as `?`: one value per occurrence.
    Positional { token: &'static str },
    /// Numbered markers such as `$1`: a repeated name reuses its index.
    Numbered { prefix: &'static str },
    /// Named markers such as `@name`: the driver resolves names itself.
    Named { prefix: &'static str },
}

/// Options that change how a dialect lexes and escapes strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectOptions {
    /// When `false`, backslashes escape characters inside ordinary string
    /// literals (Postgres `standard_conforming_strings = off`).
    pub standard_conforming_strings: bool,
}

impl Default for DialectOptions {
    fn default() -> Self {
        Self {
            standard_conforming_strings: true,
        }
    }
}

impl DialectOptions {
    /// Create options with defaults (standard conforming strings on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether string literals are standard conforming.
    pub fn standard_conforming_strings(mut self, enabled: bool) -> Self {
        self.standard_conforming_strings = enabled;
        self
    }
}

/// Quoting, escaping and placeholder conventions of one SQL dialect.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Short lowercase name (`"postgres"`, `"mysql"`, ...).
    fn name(&self) -> &'static str;

    /// Opening and closing characters used to quote identifiers.
    fn identifier_delimiter(&self) -> (char, char);

    /// Native bind syntax.
    fn bind_style(&self) -> BindStyle;

    fn supports_named_bind_parameters(&self) -> bool {
        matches!(self.bind_style(), BindStyle::Named { .. })
    }

    /// Whether the `standard_conforming_strings` option means anything here.
    fn supports_non_standard_conforming_strings(&self) -> bool {
        false
    }

    /// Whether `\` escapes a quote inside an ordinary `'...'` literal.
    fn can_backslash_escape(&self) -> bool {
        false
    }

    /// Whether `E'...'` strings (always backslash-escapable) exist.
    fn supports_escape_string_constants(&self) -> bool {
        false
    }

    /// Whether `$tag$ ... $tag$` opens a string literal.
    fn supports_dollar_quoted_strings(&self) -> bool {
        true
    }

    /// Whether array values have a literal syntax.
    fn supports_arrays(&self) -> bool {
        false
    }

    /// Escape a string as a quoted SQL literal.
    fn escape_string(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        for ch in value.chars() {
            if ch == '\'' {
                out.push('\'');
            }
            out.push(ch);
        }
        out.push('\'');
        out
    }

    /// Escape raw bytes as a SQL literal.
    fn escape_buffer(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex(bytes))
    }

    fn escape_bool(&self, value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    /// Render an array literal from items that are already escaped.
    fn escape_array_literal(&self, _items: &[String]) -> WeaveResult<String> {
        Err(WeaveError::unsupported(format!(
            "the {} dialect has no array literal syntax",
            self.name()
        )))
    }

    /// Text of a timestamp literal, before string escaping.
    fn format_timestamp(&self, value: &DateTime<Utc>) -> String {
        value.format("%Y-%m-%d %H:%M:%S%.3f +00:00").to_string()
    }

    /// Quote a single identifier part, doubling any embedded closing delimiter.
    fn quote_identifier(&self, name: &str) -> String {
        let (left, right) = self.identifier_delimiter();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(left);
        for ch in name.chars() {
            if ch == right {
                out.push(right);
            }
            out.push(ch);
        }
        out.push(right);
        out
    }
}

/// Look up a built-in dialect by name.
///
/// `options` only affects dialects that support them (currently Postgres).
pub fn by_name(name: &str, options: DialectOptions) -> WeaveResult<Arc<dyn Dialect>> {
    let dialect: Arc<dyn Dialect> = match name.trim().to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => Arc::new(Postgres::with_options(options)),
        "mysql" => Arc::new(MySql),
        "mariadb" => Arc::new(MariaDb),
        "sqlite" | "sqlite3" => Arc::new(Sqlite),
        "mssql" | "sqlserver" => Arc::new(MsSql),
        "db2" => Arc::new(Db2),
        "snowflake" => Arc::new(Snowflake),
        other => {
            return Err(WeaveError::validation(format!(
                "unknown dialect '{other}', expected one of: {}",
                DIALECT_NAMES.join(", ")
            )));
        }
    };
    Ok(dialect)
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}
