//! # sqlweave
//!
//! Dialect-aware SQL text rewriting.
//!
//! ## Features
//!
//! - **Scanner**: one pass over the SQL that knows which characters are inside
//!   strings, quoted identifiers, dollar quotes and comments
//! - **Bind mapping**: `$name` / `$1` in application SQL become the dialect's
//!   native markers (`?`, `$1`, `@name`), together with the order values must be sent in
//! - **Replacements**: `:name` / `?` placeholders replaced by escaped literals
//! - **Where trees**: nested `$and` / `$or` / `$not` structures compiled to a
//!   boolean SQL expression, inline or with generated bind parameters
//!
//! ## Example
//!
//! ```ignore
//! use sqlweave::{Binds, Replacements, Weaver, Where};
//!
//! let weaver = Weaver::by_name("postgres")?;
//!
//! let sql = weaver.inject_replacements(
//!     "SELECT * FROM users WHERE status = :status",
//!     &Replacements::named([("status", "active")]),
//! )?;
//! assert_eq!(sql, "SELECT * FROM users WHERE status = 'active'");
//!
//! let filter = Where::from_json(&serde_json::json!({ "age": { "$gte": 18 } }))?;
//! let compiled = weaver.compile_where_with_binds(&filter)?;
//! let prepared = weaver.prepare_with(
//!     &format!("SELECT * FROM users WHERE {}", compiled.sql),
//!     &Binds::None,
//!     compiled.binds,
//! )?;
//! assert_eq!(prepared.sql, r#"SELECT * FROM users WHERE "age" >= $1"#);
//! # Ok::<(), sqlweave::WeaveError>(())
//! ```

pub mod bind;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod ident;
pub mod replace;
pub mod scan;
pub mod trace;
pub mod value;
pub mod weaver;
pub mod where_clause;

pub use bind::{BindMapping, Binds, BoundValues, map_bind_parameters, resolve_bind_values};
pub use dialect::{Dialect, DialectOptions};
pub use error::{WeaveError, WeaveResult};
pub use escape::{DialectEscaper, Escaper};
pub use ident::Ident;
pub use replace::{Replacements, inject_replacements};
pub use trace::SqlTracer;
pub use value::Value;
pub use weaver::{CompiledWhere, Prepared, Weaver, WeaverConfig};
pub use where_clause::{Op, Predicate, Where, WhereCompiler, compile_where};
