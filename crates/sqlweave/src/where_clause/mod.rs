//! Where-clause compilation.
//!
//! A [`Where`] tree is built in code or parsed from the JSON options shape
//! (`{"a": 1, "$or": [...]}`) and compiled into a boolean SQL expression for
//! one dialect. Empty branches vanish instead of producing `1 = 1` filler, so
//! `{}` compiles to an empty string.
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::dialect::Postgres;
//! use sqlweave::where_clause::{Where, WhereCompiler};
//!
//! let pg = Postgres::new();
//! let tree = Where::from_json(&serde_json::json!({ "$or": [{ "a": 1 }, { "b": null }] }))?;
//! assert_eq!(WhereCompiler::new(&pg).compile(&tree)?, r#"("a" = 1 OR "b" IS NULL)"#);
//! # Ok::<(), sqlweave::WeaveError>(())
//! ```

mod compiler;
mod leaf;
mod normalize;
mod op;
mod pool;
mod tree;

#[cfg(test)]
mod tests;

pub use compiler::{CompilerConfig, DEFAULT_POOL_CAPACITY, PartHandler, WhereCompiler, compile_where};
pub use leaf::LeafFormatter;
pub use op::{Op, Quantifier};
pub use pool::{ObjectPool, Pooled, Recycle};
pub use tree::{Combinator, Fragment, Logic, Predicate, Where};
