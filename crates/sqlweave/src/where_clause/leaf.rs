//! Default rendering of attribute leaves and fragments.

use super::compiler::{PartHandler, join_parts, wrap_not};
use super::op::{Op, Quantifier};
use super::tree::{Fragment, Logic, Predicate};
use crate::bind::BindParamGenerator;
use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};
use crate::escape::{EscapeOptions, Escaper};
use crate::ident::Ident;
use crate::value::Value;

/// Renders leaves as `attribute OP operand`, inlining escaped literals or
/// emitting generated bind parameters.
pub struct LeafFormatter<'a> {
    dialect: &'a dyn Dialect,
    escaper: &'a dyn Escaper,
    quote_identifiers: bool,
    binds: Option<&'a mut BindParamGenerator>,
}

impl<'a> LeafFormatter<'a> {
    pub fn new(dialect: &'a dyn Dialect, escaper: &'a dyn Escaper) -> Self {
        Self {
            dialect,
            escaper,
            quote_identifiers: true,
            binds: None,
        }
    }

    /// Quote every attribute name, not only those that need it.
    pub fn quote_identifiers(mut self, enabled: bool) -> Self {
        self.quote_identifiers = enabled;
        self
    }

    /// Emit operands as `$sqlweave_N` bind parameters recorded in `binds`.
    pub fn with_binds(mut self, binds: &'a mut BindParamGenerator) -> Self {
        self.binds = Some(binds);
        self
    }

    fn attribute(&self, name: &str) -> WeaveResult<String> {
        Ok(Ident::parse(name)?.to_sql(self.dialect, self.quote_identifiers))
    }

    fn escape(&self, value: &Value) -> WeaveResult<String> {
        self.escaper.escape(value, EscapeOptions::default())
    }

    /// SQL for an operand: a bind parameter when binding, an escaped literal otherwise.
    fn operand(&mut self, value: &Value) -> WeaveResult<String> {
        if let Value::List(items) = value {
            return self.list(items);
        }
        match self.binds.as_deref_mut() {
            Some(binds) if !value.is_null() && !value.is_expression() => {
                Ok(binds.push(value.clone()))
            }
            _ => self.escape(value),
        }
    }

    fn list(&mut self, items: &[Value]) -> WeaveResult<String> {
        if self.binds.is_none() {
            return self.escaper.escape_list(items);
        }
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            parts.push(self.operand(item)?);
        }
        Ok(format!("({})", parts.join(", ")))
    }

    fn predicate(&mut self, left: &str, predicate: &Predicate, out: &mut String) -> WeaveResult<()> {
        match predicate {
            Predicate::Value(value) => {
                let op = if value.as_items().is_some() {
                    Op::In
                } else if value.is_null() {
                    Op::Is
                } else {
                    Op::Eq
                };
                self.binary(left, op, value, out)
            }
            Predicate::Op(op, value) => self.binary(left, *op, value, out),
            Predicate::Quantified(op, quantifier, value) => {
                self.quantified(left, *op, *quantifier, value, out)
            }
            Predicate::All(items) => self.nested(left, items, Logic::And, out),
            Predicate::Any(items) => self.nested(left, items, Logic::Or, out),
            Predicate::Not(inner) => {
                let mut sql = String::new();
                self.predicate(left, inner, &mut sql)?;
                wrap_not(&sql, self.dialect, out);
                Ok(())
            }
        }
    }

    fn nested(
        &mut self,
        left: &str,
        items: &[Predicate],
        logic: Logic,
        out: &mut String,
    ) -> WeaveResult<()> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            let mut sql = String::new();
            self.predicate(left, item, &mut sql)?;
            parts.push(sql);
        }
        join_parts(parts.iter().map(String::as_str), logic, self.dialect, out);
        Ok(())
    }

    fn binary(&mut self, left: &str, op: Op, value: &Value, out: &mut String) -> WeaveResult<()> {
        let op = match (op, value) {
            (Op::Eq, Value::Null) => Op::Is,
            (Op::Ne, Value::Null) => Op::IsNot,
            _ => op,
        };

        let right = match op {
            Op::In | Op::NotIn => match value {
                Value::Literal(_) => self.escape(value)?,
                _ => match value.as_items() {
                    // NOT IN () always holds, so it contributes nothing.
                    Some([]) if op == Op::NotIn => return Ok(()),
                    Some([]) => "(NULL)".to_string(),
                    Some(items) => self.list(items)?,
                    None => {
                        return Err(WeaveError::validation(
                            "Operators in and notIn must be called with an array of values, or a literal",
                        ));
                    }
                },
            },
            Op::Is | Op::IsNot => match value {
                // IS never takes a bind parameter.
                Value::Null | Value::Bool(_) | Value::Literal(_) => self.escape(value)?,
                _ => {
                    return Err(WeaveError::validation(
                        "Operators is and isNot can only be used with null, true, false or a literal.",
                    ));
                }
            },
            Op::Between | Op::NotBetween => match value {
                Value::Literal(_) | Value::Column(_) => self.escape(value)?,
                _ => match value.as_items() {
                    Some([from, to]) => {
                        let from = self.operand(from)?;
                        let to = self.operand(to)?;
                        format!("{from} AND {to}")
                    }
                    _ => {
                        return Err(WeaveError::validation(
                            "Operators between and notBetween must be used with an array of two values, or a literal.",
                        ));
                    }
                },
            },
            Op::AnyKeyExists | Op::AllKeysExist => {
                if !self.dialect.supports_arrays() {
                    return Err(WeaveError::unsupported(format!(
                        "the {} dialect does not support the {op} operator",
                        self.dialect.name()
                    )));
                }
                self.operand(value)?
            }
            _ => match (op.like_pattern(), value) {
                (Some((lead, trail)), Value::Text(text)) => {
                    let mut pattern = String::with_capacity(text.len() + 2);
                    if lead {
                        pattern.push('%');
                    }
                    pattern.push_str(text);
                    if trail {
                        pattern.push('%');
                    }
                    self.operand(&Value::Text(pattern))?
                }
                (Some((lead, trail)), _) => {
                    let percent = self.dialect.escape_string("%");
                    let mut parts = Vec::with_capacity(3);
                    if lead {
                        parts.push(percent.clone());
                    }
                    parts.push(self.operand(value)?);
                    if trail {
                        parts.push(percent);
                    }
                    format!("CONCAT({})", parts.join(", "))
                }
                (None, _) => self.operand(value)?,
            },
        };

        out.push_str(left);
        out.push(' ');
        out.push_str(op.keyword());
        out.push(' ');
        out.push_str(&right);
        Ok(())
    }

    fn quantified(
        &mut self,
        left: &str,
        op: Op,
        quantifier: Quantifier,
        value: &Value,
        out: &mut String,
    ) -> WeaveResult<()> {
        let inner = match value {
            Value::List(rows) => {
                let mut parts = Vec::with_capacity(rows.len());
                for row in rows {
                    parts.push(format!("({})", self.operand(row)?));
                }
                format!("VALUES {}", parts.join(", "))
            }
            _ => self.operand(value)?,
        };
        out.push_str(left);
        out.push(' ');
        out.push_str(op.keyword());
        out.push(' ');
        out.push_str(quantifier.keyword());
        out.push_str(" (");
        out.push_str(&inner);
        out.push(')');
        Ok(())
    }
}

impl PartHandler for LeafFormatter<'_> {
    fn leaf(&mut self, attribute: &str, predicate: &Predicate, out: &mut String) -> WeaveResult<()> {
        let left = self.attribute(attribute)?;
        self.predicate(&left, predicate, out)
    }

    fn fragment(&mut self, fragment: &Fragment, out: &mut String) -> WeaveResult<()> {
        match fragment {
            Fragment::Literal(sql) => {
                out.push_str(sql);
                Ok(())
            }
            Fragment::Compare { left, op, right } => {
                let left = self.operand(left)?;
                self.binary(&left, *op, right, out)
            }
        }
    }
}
