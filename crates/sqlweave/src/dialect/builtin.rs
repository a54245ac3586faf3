use chrono::{DateTime, Utc};

use super::{BindStyle, Dialect, DialectOptions, hex};
use crate::error::WeaveResult;

/// PostgreSQL.
#[derive(Debug, Clone, Default)]
pub struct Postgres {
    options: DialectOptions,
}

impl Postgres {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DialectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DialectOptions {
        &self.options
    }
}

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn identifier_delimiter(&self) -> (char, char) {
        ('"', '"')
    }

    fn bind_style(&self) -> BindStyle {
        BindStyle::Numbered { prefix: "$" }
    }

    fn supports_non_standard_conforming_strings(&self) -> bool {
        true
    }

    fn can_backslash_escape(&self) -> bool {
        !self.options.standard_conforming_strings
    }

    fn supports_escape_string_constants(&self) -> bool {
        true
    }

    fn supports_arrays(&self) -> bool {
        true
    }

    fn escape_string(&self, value: &str) -> String {
        let backslashes = self.can_backslash_escape();
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        for ch in value.chars() {
            match ch {
                '\'' => out.push_str("''"),
                '\\' if backslashes => out.push_str("\\\\"),
                // text values cannot carry NUL
                '\0' => out.push_str("\\0"),
                c => out.push(c),
            }
        }
        out.push('\'');
        out
    }

    fn escape_buffer(&self, bytes: &[u8]) -> String {
        format!("E'\\\\x{}'", hex(bytes))
    }

    fn escape_array_literal(&self, items: &[String]) -> WeaveResult<String> {
        Ok(format!("ARRAY[{}]", items.join(",")))
    }
}

/// Escape a string the way MySQL and MariaDB expect with backslash escapes enabled.
pub(crate) fn escape_mysql_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\u{1A}' => out.push_str("\\Z"),
            '\'' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn format_naive_timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// MySQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_delimiter(&self) -> (char, char) {
        ('`', '`')
    }

    fn bind_style(&self) -> BindStyle {
        BindStyle::Positional { token: "?" }
    }

    fn can_backslash_escape(&self) -> bool {
        true
    }

    fn escape_string(&self, value: &str) -> String {
        escape_mysql_string(value)
    }

    fn format_timestamp(&self, value: &DateTime<Utc>) -> String {
        format_naive_timestamp(value)
    }
}

/// MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MariaDb;

impl Dialect for MariaDb {
    fn name(&self) -> &'static str {
        "mariadb"
    }

    fn identifier_delimiter(&self) -> (char, char) {
        ('`', '`')
    }

    fn bind_style(&self) -> BindStyle {
        BindStyle::Positional { token: "?" }
    }

    fn can_backslash_escape(&self) -> bool {
        true
    }

    fn escape_string(&self, value: &str) -> String {
        escape_mysql_string(value)
    }

    fn format_timestamp(&self, value: &DateTime<Utc>) -> String {
        format_naive_timestamp(value)
    }
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_delimiter(&self) -> (char, char) {
        ('`', '`')
    }

    fn bind_style(&self) -> BindStyle {
        BindStyle::Named { prefix: "$" }
    }

    fn escape_bool(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }
}

/// Microsoft SQL Server.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSql;

impl Dialect for MsSql {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn identifier_delimiter(&self) -> (char, char) {
        ('[', ']')
    }

    fn bind_style(&self) -> BindStyle {
        BindStyle::Named { prefix: "@" }
    }

    fn escape_string(&self, value: &str) -> String {
        format!("N'{}'", value.replace('\'', "''"))
    }

    fn escape_buffer(&self, bytes: &[u8]) -> String {
        format!("0x{}", hex(bytes))
    }

    fn escape_bool(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }
}

/// IBM Db2.
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2;

impl Dialect for Db2 {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn identifier_delimiter(&self) -> (char, char) {
        ('"', '"')
    }

    fn bind_style(&self) -> BindStyle {
        BindStyle::Positional { token: "?" }
    }

    fn escape_buffer(&self, bytes: &[u8]) -> String {
        format!("BLOB(x'{}')", hex(bytes))
    }
}

/// Snowflake.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snowflake;

impl Dialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn identifier_delimiter(&self) -> (char, char) {
        ('"', '"')
    }

    fn bind_style(&self) -> BindStyle {
        BindStyle::Positional { token: "?" }
    }
}
