//! The [`Weaver`] facade: one dialect, one configuration, every operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bind::{
    BindMapping, BindParamGenerator, Binds, BoundValues, assert_no_reserved_bind, combine_binds,
    map_bind_parameters, resolve_bind_values,
};
use crate::dialect::{self, Dialect, DialectOptions};
use crate::error::WeaveResult;
use crate::replace::{Replacements, inject_replacements};
use crate::trace::{Operation, SqlTracer};
use crate::value::Value;
use crate::where_clause::{CompilerConfig, Where, WhereCompiler};

/// Configuration for [`Weaver`].
#[derive(Debug, Clone, Default)]
pub struct WeaverConfig {
    /// Where-clause compiler settings.
    pub compiler: CompilerConfig,
    /// How finished SQL is reported.
    pub tracer: SqlTracer,
}

impl WeaverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn tracer(mut self, tracer: SqlTracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Shortcut for `compiler.pool_capacity`.
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.compiler.pool_capacity = capacity;
        self
    }
}

/// A compiled where clause together with the values of its generated binds.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWhere {
    pub sql: String,
    /// Values keyed by generated name (`sqlweave_1`, ...).
    pub binds: BTreeMap<String, Value>,
}

/// SQL ready for a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    /// SQL with native bind markers.
    pub sql: String,
    pub values: BoundValues,
}

/// Runs every SQL rewriting step for one dialect.
///
/// Cheap to clone; the dialect is shared.
///
/// # Example
/// ```ignore
/// use sqlweave::{Binds, Weaver};
///
/// let weaver = Weaver::by_name("mysql")?;
/// let prepared = weaver.prepare("SELECT * FROM t WHERE a = $a OR b = $a", &Binds::named([("a", 1)]))?;
/// assert_eq!(prepared.sql, "SELECT * FROM t WHERE a = ? OR b = ?");
/// # Ok::<(), sqlweave::WeaveError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Weaver {
    dialect: Arc<dyn Dialect>,
    config: WeaverConfig,
}

impl Weaver {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self::with_config(dialect, WeaverConfig::default())
    }

    pub fn with_config(dialect: Arc<dyn Dialect>, config: WeaverConfig) -> Self {
        Self { dialect, config }
    }

    /// Build a weaver for a built-in dialect with default options.
    pub fn by_name(name: &str) -> WeaveResult<Self> {
        Self::by_name_with_options(name, DialectOptions::default())
    }

    pub fn by_name_with_options(name: &str, options: DialectOptions) -> WeaveResult<Self> {
        Ok(Self::new(dialect::by_name(name, options)?))
    }

    /// Replace the configuration.
    pub fn config(mut self, config: WeaverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn weaver_config(&self) -> &WeaverConfig {
        &self.config
    }

    /// See [`map_bind_parameters`].
    pub fn map_bind_parameters(&self, sql: &str) -> WeaveResult<BindMapping> {
        let mapping = map_bind_parameters(sql, self.dialect())?;
        self.emit(Operation::BindMapping, mapping.parameter_set.len(), &mapping.sql);
        Ok(mapping)
    }

    /// See [`inject_replacements`].
    pub fn inject_replacements(&self, sql: &str, replacements: &Replacements) -> WeaveResult<String> {
        let out = inject_replacements(sql, self.dialect(), replacements)?;
        let count = match replacements {
            Replacements::Positional(values) => values.len(),
            Replacements::Named(map) => map.len(),
        };
        self.emit(Operation::Replacement, count, &out);
        Ok(out)
    }

    /// Compile `tree` with inline literals.
    pub fn compile_where(&self, tree: &Where) -> WeaveResult<String> {
        let sql = self.compiler().compile(tree)?;
        self.emit(Operation::Where, 0, &sql);
        Ok(sql)
    }

    /// Compile `tree` with generated bind parameters.
    ///
    /// Pass the result to [`prepare_with`](Self::prepare_with) once it has
    /// been spliced into a statement.
    pub fn compile_where_with_binds(&self, tree: &Where) -> WeaveResult<CompiledWhere> {
        let mut generator = BindParamGenerator::new();
        let sql = self.compiler().compile_with_binds(tree, &mut generator)?;
        self.emit(Operation::Where, generator.len(), &sql);
        Ok(CompiledWhere {
            sql,
            binds: generator.into_binds(),
        })
    }

    /// Map bind parameters and resolve their values in one step.
    pub fn prepare(&self, sql: &str, binds: &Binds) -> WeaveResult<Prepared> {
        self.prepare_with(sql, binds, BTreeMap::new())
    }

    /// [`prepare`](Self::prepare) with values generated by
    /// [`compile_where_with_binds`](Self::compile_where_with_binds) merged in.
    ///
    /// Caller binds may not use the reserved `sqlweave_` prefix.
    pub fn prepare_with(
        &self,
        sql: &str,
        binds: &Binds,
        generated: BTreeMap<String, Value>,
    ) -> WeaveResult<Prepared> {
        assert_no_reserved_bind(binds)?;
        let mapping = map_bind_parameters(sql, self.dialect())?;
        let values = if generated.is_empty() {
            resolve_bind_values(&mapping, binds)?
        } else {
            resolve_bind_values(&mapping, &combine_binds(binds.clone(), generated))?
        };
        self.emit(Operation::BindMapping, values.len(), &mapping.sql);
        Ok(Prepared {
            sql: mapping.sql,
            values,
        })
    }

    fn compiler(&self) -> WhereCompiler<'_> {
        WhereCompiler::with_config(self.dialect(), self.config.compiler.clone())
    }

    fn emit(&self, operation: Operation, param_count: usize, sql: &str) {
        self.config
            .tracer
            .emit(operation, self.dialect.name(), param_count, sql);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeaveError;
    use serde_json::json;

    #[test]
    fn unknown_dialect() {
        let err = Weaver::by_name("oracle").unwrap_err();
        assert!(matches!(err, WeaveError::Validation(_)));
    }

    #[test]
    fn prepare_repeats_positional_values() {
        let weaver = Weaver::by_name("mysql").unwrap();
        let prepared = weaver
            .prepare(
                "SELECT * FROM t WHERE a = $a OR b = $a",
                &Binds::named([("a", 1)]),
            )
            .unwrap();
        assert_eq!(prepared.sql, "SELECT * FROM t WHERE a = ? OR b = ?");
        assert_eq!(
            prepared.values,
            BoundValues::Ordered(vec![Value::Int(1), Value::Int(1)])
        );
    }

    #[test]
    fn prepare_rejects_reserved_names() {
        let weaver = Weaver::by_name("postgres").unwrap();
        let err = weaver
            .prepare("SELECT $sqlweave_1", &Binds::named([("sqlweave_1", 1)]))
            .unwrap_err();
        assert!(matches!(err, WeaveError::ReservedBind { .. }));
    }

    #[test]
    fn where_binds_flow_into_prepare() {
        let weaver = Weaver::by_name("postgres").unwrap();
        let tree = Where::from_json(&json!({ "a": 1, "b": "x" })).unwrap();
        let compiled = weaver.compile_where_with_binds(&tree).unwrap();
        assert_eq!(compiled.sql, r#"("a" = $sqlweave_1 AND "b" = $sqlweave_2)"#);

        let sql = format!("SELECT * FROM t WHERE {} AND c = $c", compiled.sql);
        let prepared = weaver
            .prepare_with(&sql, &Binds::named([("c", true)]), compiled.binds)
            .unwrap();
        assert_eq!(
            prepared.sql,
            r#"SELECT * FROM t WHERE ("a" = $1 AND "b" = $2) AND c = $3"#
        );
        assert_eq!(
            prepared.values,
            BoundValues::Ordered(vec![Value::Int(1), Value::from("x"), Value::Bool(true)])
        );
    }

    #[test]
    fn inject_then_compile_share_dialect() {
        let weaver = Weaver::by_name("mssql").unwrap();
        let sql = weaver
            .inject_replacements("SELECT :name", &Replacements::named([("name", "it's")]))
            .unwrap();
        assert_eq!(sql, "SELECT N'it''s'");
        assert_eq!(
            weaver.compile_where(&Where::eq("a", true)).unwrap(),
            "[a] = 1"
        );
    }

    #[test]
    fn config_reaches_compiler() {
        let config = WeaverConfig::new()
            .pool_capacity(2)
            .compiler(CompilerConfig::new().pool_capacity(2).quote_identifiers(false));
        let weaver = Weaver::by_name("postgres").unwrap().config(config);
        assert_eq!(weaver.weaver_config().compiler.pool_capacity, 2);
        assert_eq!(weaver.compile_where(&Where::eq("a", 1)).unwrap(), "a = 1");
    }
}
