//! `tracing` integration.
//!
//! Free functions report their results at `DEBUG` under the `sqlweave.sql`
//! target. [`SqlTracer`] lets a [`Weaver`](crate::Weaver) choose the level
//! and how much SQL text ends up in each event.

use tracing::Level;

/// Default number of bytes of SQL kept in an event.
pub const DEFAULT_MAX_SQL_LENGTH: usize = 200;

/// Which operation produced the SQL being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    BindMapping,
    Replacement,
    Where,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BindMapping => "bind",
            Self::Replacement => "replace",
            Self::Where => "where",
        }
    }
}

/// Emits finished SQL as `tracing` events.
#[derive(Debug, Clone)]
pub struct SqlTracer {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlTracer {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(DEFAULT_MAX_SQL_LENGTH),
        }
    }
}

impl SqlTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    pub(crate) fn emit(&self, operation: Operation, dialect: &str, param_count: usize, sql: &str) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    _ => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate(sql);
        emit_at_level!(
            self.level,
            target: "sqlweave.sql",
            operation = operation.as_str(),
            dialect,
            param_count,
            sql = %sql,
        );
    }
}

/// Truncate `sql` for log output with the default limit.
pub(crate) fn truncate_sql(sql: &str) -> std::borrow::Cow<'_, str> {
    SqlTracer::default().truncate(sql)
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("héllo", 2), "h");
        assert_eq!(truncate_sql_bytes("hello", 10), "hello");
    }

    #[test]
    fn tracer_truncation_is_configurable() {
        let long = "x".repeat(300);
        assert_eq!(SqlTracer::new().truncate(&long).len(), DEFAULT_MAX_SQL_LENGTH + 3);
        assert_eq!(SqlTracer::new().max_sql_length(10).truncate(&long), "xxxxxxxxxx...");
        assert_eq!(SqlTracer::new().no_truncate().truncate(&long).len(), 300);
    }
}
