//! Client-side replacement injection.
//!
//! Replacements are spliced into the SQL as escaped literals before the
//! statement reaches a driver. Use them for values that are safe to inline;
//! everything else belongs in bind parameters.
//!
//! ```ignore
//! use sqlweave::dialect::Postgres;
//! use sqlweave::replace::{Replacements, inject_replacements};
//!
//! let sql = inject_replacements(
//!     "select :one as foo, :two as bar",
//!     &Postgres::new(),
//!     &Replacements::named([("one", 1), ("two", 2)]),
//! )?;
//! assert_eq!(sql, "select 1 as foo, 2 as bar");
//! # Ok::<(), sqlweave::WeaveError>(())
//! ```

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};
use crate::escape::{DialectEscaper, EscapeOptions, Escaper};
use crate::scan::{Detect, Scanner};
use crate::trace::truncate_sql;
use crate::value::Value;

/// Replacement values: a list consumed by `?`, or a map looked up by `:name`.
#[derive(Debug, Clone, PartialEq)]
pub enum Replacements {
    Positional(Vec<Value>),
    Named(BTreeMap<String, Value>),
}

impl Replacements {
    /// Build named replacements from `(name, value)` pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build positional replacements.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Accept a JSON array or object. `null` yields `None`, meaning "nothing to inject".
    pub fn from_json(json: serde_json::Value) -> WeaveResult<Option<Self>> {
        match json {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Array(items) => Ok(Some(Self::Positional(
                items.into_iter().map(Value::from_json).collect(),
            ))),
            serde_json::Value::Object(map) => Ok(Some(Self::Named(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ))),
            other => Err(WeaveError::InvalidReplacements {
                received: other.to_string(),
            }),
        }
    }

    fn detect(&self) -> Detect {
        match self {
            Self::Positional(_) => Detect::POSITIONAL,
            Self::Named(_) => Detect::NAMED,
        }
    }
}

/// Replace `:name` or `?` placeholders in plain SQL with escaped literals.
pub fn inject_replacements(
    sql: &str,
    dialect: &dyn Dialect,
    replacements: &Replacements,
) -> WeaveResult<String> {
    inject_replacements_with(sql, dialect, replacements, &DialectEscaper::new(dialect))
}

/// [`inject_replacements`] with a caller-supplied [`Escaper`].
pub fn inject_replacements_with(
    sql: &str,
    dialect: &dyn Dialect,
    replacements: &Replacements,
    escaper: &dyn Escaper,
) -> WeaveResult<String> {
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;
    let mut consumed = 0;

    let mut scanner = Scanner::new(sql, dialect).detect(replacements.detect());
    while let Some(p) = scanner.next_placeholder()? {
        let value = match replacements {
            Replacements::Named(map) => {
                map.get(p.name)
                    .ok_or_else(|| WeaveError::MissingNamedReplacement {
                        name: p.name.to_string(),
                    })?
            }
            Replacements::Positional(values) => {
                let index = consumed;
                consumed += 1;
                values
                    .get(index)
                    .ok_or(WeaveError::MissingPositionalReplacement { index })?
            }
        };
        out.push_str(&sql[copied..p.start]);
        out.push_str(&escaper.escape(value, EscapeOptions::default())?);
        copied = p.end;
    }
    out.push_str(&sql[copied..]);

    tracing::debug!(
        target: "sqlweave.sql",
        dialect = dialect.name(),
        sql = %truncate_sql(&out),
        "injected replacements"
    );
    Ok(out)
}
