//! Bind parameter mapping.
//!
//! Application SQL writes bind parameters as `$name` or `$1` regardless of
//! dialect. [`map_bind_parameters`] rewrites them into the dialect's native
//! markers and reports the order in which values must be sent.
//!
//! ```ignore
//! use sqlweave::bind::map_bind_parameters;
//! use sqlweave::dialect::MySql;
//!
//! let m = map_bind_parameters("SELECT * FROM t WHERE a = $a OR b = $a", &MySql)?;
//! assert_eq!(m.sql, "SELECT * FROM t WHERE a = ? OR b = ?");
//! assert_eq!(m.bind_order.unwrap(), ["a", "a"]);
//! # Ok::<(), sqlweave::WeaveError>(())
//! ```

mod collector;
mod resolve;


use std::collections::BTreeSet;

use crate::dialect::Dialect;
use crate::error::WeaveResult;
use crate::scan::{Detect, Scanner};
use crate::trace::truncate_sql;

pub use collector::BindCollector;
pub use resolve::{
    BindParamGenerator, Binds, BoundValues, RESERVED_BIND_PREFIX, assert_no_reserved_bind,
    combine_binds, resolve_bind_values,
};

/// Result of [`map_bind_parameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMapping {
    /// SQL with native bind markers.
    pub sql: String,
    /// Names in the order values must be supplied, or `None` when the
    /// dialect resolves named parameters itself.
    pub bind_order: Option<Vec<String>>,
    /// Every distinct name referenced, including malformed numbers such as `01`.
    pub parameter_set: BTreeSet<String>,
}

/// Rewrite `$name` / `$N` bind parameters found in plain SQL into `dialect`'s native syntax.
///
/// `$0` and zero-padded numbers are left in the SQL untouched; they are
/// recorded in the parameter set so that [`resolve_bind_values`] rejects them.
pub fn map_bind_parameters(sql: &str, dialect: &dyn Dialect) -> WeaveResult<BindMapping> {
    let mut collector = BindCollector::for_style(dialect.bind_style());
    let mut parameter_set = BTreeSet::new();
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;

    let mut scanner = Scanner::new(sql, dialect).detect(Detect::BINDS);
    while let Some(p) = scanner.next_placeholder()? {
        parameter_set.insert(p.name.to_string());
        if p.is_malformed_number() {
            continue;
        }
        out.push_str(&sql[copied..p.start]);
        collector.collect(p.name, &mut out);
        copied = p.end;
    }
    out.push_str(&sql[copied..]);

    let mapping = BindMapping {
        sql: out,
        bind_order: collector.finish(),
        parameter_set,
    };
    tracing::debug!(
        target: "sqlweave.sql",
        dialect = dialect.name(),
        parameters = mapping.parameter_set.len(),
        sql = %truncate_sql(&mapping.sql),
        "mapped bind parameters"
    );
    Ok(mapping)
}
