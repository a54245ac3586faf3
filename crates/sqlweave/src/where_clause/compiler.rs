use super::leaf::LeafFormatter;
use super::pool::ObjectPool;
use super::tree::{Combinator, Fragment, Logic, Predicate, Where};
use crate::bind::BindParamGenerator;
use crate::dialect::Dialect;
use crate::error::WeaveResult;
use crate::escape::DialectEscaper;
use crate::scan::{ModeKind, segments};
use crate::trace::truncate_sql;

/// Number of buffers a compiler's pool starts with.
pub const DEFAULT_POOL_CAPACITY: usize = 20;

/// Turns leaves and fragments into SQL.
///
/// This is the extension point of the compiler: the tree walk (joining,
/// parenthesizing, negation) stays the same, and the handler decides how a
/// single comparison is spelled.
pub trait PartHandler {
    /// Append SQL for `attribute` compared against `predicate`.
    fn leaf(&mut self, attribute: &str, predicate: &Predicate, out: &mut String) -> WeaveResult<()>;

    /// Append SQL for a pre-built fragment.
    fn fragment(&mut self, fragment: &Fragment, out: &mut String) -> WeaveResult<()>;
}

/// Configuration for [`WhereCompiler`].
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Buffers created up front for sibling results.
    pub pool_capacity: usize,
    /// Quote every attribute name (`"a" = 1`). When off, plain names stay bare (`a = 1`).
    pub quote_identifiers: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            quote_identifiers: true,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    pub fn quote_identifiers(mut self, enabled: bool) -> Self {
        self.quote_identifiers = enabled;
        self
    }
}

/// Compiles [`Where`] trees for one dialect.
///
/// A compiler owns its buffer pool, so it is not `Sync`; build one per
/// thread or per request.
#[derive(Debug)]
pub struct WhereCompiler<'d> {
    dialect: &'d dyn Dialect,
    config: CompilerConfig,
    pool: ObjectPool<String>,
}

impl<'d> WhereCompiler<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self::with_config(dialect, CompilerConfig::default())
    }

    pub fn with_config(dialect: &'d dyn Dialect, config: CompilerConfig) -> Self {
        Self {
            dialect,
            pool: ObjectPool::new(config.pool_capacity),
            config,
        }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Buffers currently idle in the pool.
    pub fn available_buffers(&self) -> usize {
        self.pool.available()
    }

    /// Compile with operands inlined as escaped literals.
    pub fn compile(&self, tree: &Where) -> WeaveResult<String> {
        let escaper = DialectEscaper::new(self.dialect);
        let mut handler = LeafFormatter::new(self.dialect, &escaper)
            .quote_identifiers(self.config.quote_identifiers);
        self.compile_with(tree, &mut handler)
    }

    /// Compile with operands emitted as `$sqlweave_N` bind parameters.
    ///
    /// The SQL still needs [`map_bind_parameters`](crate::bind::map_bind_parameters)
    /// before it reaches a driver.
    pub fn compile_with_binds(
        &self,
        tree: &Where,
        binds: &mut BindParamGenerator,
    ) -> WeaveResult<String> {
        let escaper = DialectEscaper::new(self.dialect);
        let mut handler = LeafFormatter::new(self.dialect, &escaper)
            .quote_identifiers(self.config.quote_identifiers)
            .with_binds(binds);
        self.compile_with(tree, &mut handler)
    }

    /// Compile with a custom [`PartHandler`].
    pub fn compile_with(&self, tree: &Where, handler: &mut dyn PartHandler) -> WeaveResult<String> {
        let mut out = String::new();
        self.node(tree, Logic::And, handler, &mut out)
            .map_err(|err| err.into_where_error(tree.to_json().to_string()))?;
        tracing::debug!(
            target: "sqlweave.sql",
            dialect = self.dialect.name(),
            sql = %truncate_sql(&out),
            "compiled where"
        );
        Ok(out)
    }

    fn node(
        &self,
        tree: &Where,
        logic: Logic,
        handler: &mut dyn PartHandler,
        out: &mut String,
    ) -> WeaveResult<()> {
        match tree {
            Where::Sequence(items) | Where::Group(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    let mut part = self.pool.acquire();
                    self.node(item, Logic::And, handler, &mut part)?;
                    parts.push(part);
                }
                join_parts(parts.iter().map(|p| p.as_str()), logic, self.dialect, out);
            }
            Where::Combinator(Combinator::And, inner) => {
                self.node(inner, Logic::And, handler, out)?;
            }
            Where::Combinator(Combinator::Or, inner) => {
                self.node(inner, Logic::Or, handler, out)?;
            }
            Where::Combinator(Combinator::Not, inner) => {
                let mut part = self.pool.acquire();
                self.node(inner, Logic::And, handler, &mut part)?;
                wrap_not(&part, self.dialect, out);
            }
            Where::Leaf(attribute, predicate) => handler.leaf(attribute, predicate, out)?,
            Where::Fragment(fragment) => handler.fragment(fragment, out)?,
        }
        Ok(())
    }
}

/// Compile `tree` for `dialect` with the default configuration.
pub fn compile_where(tree: &Where, dialect: &dyn Dialect) -> WeaveResult<String> {
    WhereCompiler::new(dialect).compile(tree)
}

/// Join non-empty parts with `logic`. Two or more survivors are parenthesized,
/// and so is any survivor with a bare top-level `AND` / `OR` of its own.
pub(crate) fn join_parts<'s>(
    parts: impl IntoIterator<Item = &'s str>,
    logic: Logic,
    dialect: &dyn Dialect,
    out: &mut String,
) {
    let mut kept = parts.into_iter().filter(|p| !p.is_empty());
    let Some(first) = kept.next() else {
        return;
    };
    let Some(second) = kept.next() else {
        out.push_str(first);
        return;
    };
    out.push('(');
    push_operand(first, dialect, out);
    for part in std::iter::once(second).chain(kept) {
        out.push_str(logic.separator());
        push_operand(part, dialect, out);
    }
    out.push(')');
}

fn push_operand(part: &str, dialect: &dyn Dialect, out: &mut String) {
    if has_top_level_logic(part, dialect) && !is_fully_parenthesized(part, dialect) {
        out.push('(');
        out.push_str(part);
        out.push(')');
    } else {
        out.push_str(part);
    }
}

/// `NOT (inner)`, or `NOT inner` when `inner` is already one parenthesized group.
pub(crate) fn wrap_not(inner: &str, dialect: &dyn Dialect, out: &mut String) {
    if inner.is_empty() {
        return;
    }
    if is_fully_parenthesized(inner, dialect) {
        out.push_str("NOT ");
        out.push_str(inner);
    } else {
        out.push_str("NOT (");
        out.push_str(inner);
        out.push(')');
    }
}

/// Whether the first `(` of `sql` is closed by its last char. Parentheses
/// inside strings, quoted identifiers and comments are ignored.
fn is_fully_parenthesized(sql: &str, dialect: &dyn Dialect) -> bool {
    if !sql.starts_with('(') || !sql.ends_with(')') {
        return false;
    }
    let last = sql.len() - 1;
    let mut closed_early = false;
    let balanced = walk_plain(sql, dialect, |offset, ch, depth| {
        if ch == ')' && depth == 0 && offset != last {
            closed_early = true;
        }
        closed_early
    });
    balanced == Some(0) && !closed_early
}

/// Whether `sql` has an `AND` or `OR` outside every parenthesis, string and comment.
/// Unscannable input counts as having one.
fn has_top_level_logic(sql: &str, dialect: &dyn Dialect) -> bool {
    let mut found = false;
    let walked = walk_plain(sql, dialect, |offset, ch, depth| {
        if depth == 0 && ch.is_whitespace() {
            let rest = &sql[offset + ch.len_utf8()..];
            found = starts_with_keyword(rest, "AND") || starts_with_keyword(rest, "OR");
        }
        found
    });
    found || walked.is_none()
}

fn starts_with_keyword(rest: &str, keyword: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() > keyword.len()
        && bytes[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
        && bytes[keyword.len()].is_ascii_whitespace()
}

/// Feed every plain-SQL char to `visit` with its offset and the parenthesis
/// depth after it, until `visit` returns `true`. Returns the final depth, or
/// `None` when `sql` cannot be scanned.
fn walk_plain(
    sql: &str,
    dialect: &dyn Dialect,
    mut visit: impl FnMut(usize, char, usize) -> bool,
) -> Option<usize> {
    let segments = segments(sql, dialect).ok()?;
    let mut depth = 0usize;
    for segment in segments.iter().filter(|s| s.mode == ModeKind::Plain) {
        for (offset, ch) in sql[segment.range.clone()].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
            if visit(segment.range.start + offset, ch, depth) {
                return Some(depth);
            }
        }
    }
    Some(depth)
}
