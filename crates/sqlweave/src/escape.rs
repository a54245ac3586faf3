//! Literal escaping.
//!
//! The [`Escaper`] trait is the seam through which the replacement injector
//! and the where compiler turn a [`Value`] into SQL text. [`DialectEscaper`]
//! is the stock implementation driven entirely by a [`Dialect`].

use crate::dialect::Dialect;
use crate::error::WeaveResult;
use crate::ident::Ident;
use crate::value::Value;

/// Context in which a value is being escaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscapeOptions {
    /// The value is an element of an enclosing array literal.
    pub in_array: bool,
}

impl EscapeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_array(mut self, in_array: bool) -> Self {
        self.in_array = in_array;
        self
    }
}

/// Converts typed values into dialect-correct SQL literal text.
pub trait Escaper {
    /// Escape a single value.
    fn escape(&self, value: &Value, options: EscapeOptions) -> WeaveResult<String>;

    /// Escape values as a parenthesized expression list: `(a, b, c)`.
    fn escape_list(&self, values: &[Value]) -> WeaveResult<String> {
        let mut out = String::from("(");
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&self.escape(v, EscapeOptions::default())?);
        }
        out.push(')');
        Ok(out)
    }
}

/// The default [`Escaper`], which delegates every formatting choice to a dialect.
#[derive(Debug, Clone, Copy)]
pub struct DialectEscaper<'d> {
    dialect: &'d dyn Dialect,
}

impl<'d> DialectEscaper<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    fn escape_float(&self, v: f64) -> String {
        if v.is_nan() {
            self.dialect.escape_string("NaN")
        } else if v.is_infinite() {
            let text = if v > 0.0 { "Infinity" } else { "-Infinity" };
            self.dialect.escape_string(text)
        } else {
            v.to_string()
        }
    }
}

impl Escaper for DialectEscaper<'_> {
    fn escape(&self, value: &Value, options: EscapeOptions) -> WeaveResult<String> {
        let d = self.dialect;
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => d.escape_bool(*b).to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => self.escape_float(*f),
            Value::Text(s) => d.escape_string(s),
            Value::Bytes(b) => d.escape_buffer(b),
            Value::Timestamp(ts) => d.escape_string(&d.format_timestamp(ts)),
            Value::Date(date) => d.escape_string(&date.format("%Y-%m-%d").to_string()),
            Value::Uuid(u) => d.escape_string(&u.to_string()),
            Value::Json(j) => d.escape_string(&serde_json::to_string(j)?),
            // An array holding SQL expressions is a comma-separated sequence
            // of them, e.g. the rows of a multi-row VALUES clause.
            Value::Array(items) if items.iter().any(Value::is_expression) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    parts.push(self.escape(item, options)?);
                }
                parts.join(", ")
            }
            Value::Array(items) => {
                let nested = options.in_array(true);
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    parts.push(self.escape(item, nested)?);
                }
                d.escape_array_literal(&parts)?
            }
            Value::List(items) => self.escape_list(items)?,
            Value::Literal(sql) => sql.clone(),
            Value::Column(name) => Ident::parse(name)?.to_sql(d, true),
        })
    }
}
