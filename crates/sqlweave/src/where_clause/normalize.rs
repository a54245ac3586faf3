//! Conversion between JSON documents and [`Where`] trees.
//!
//! The JSON shape mirrors the usual ORM options object:
//!
//! ```json
//! { "status": "active", "$or": [{ "age": { "$gte": 18 } }, { "role": "admin" }] }
//! ```
//!
//! Objects are groups, arrays are sequences, `$and` / `$or` / `$not` are
//! combinators and `$gt`-style keys are operators inside an attribute.
//! `{"$literal": "sql"}` is a raw fragment and `{"$col": "name"}` a column reference.

use serde_json::{Map, Value as Json, json};

use super::op::{Op, Quantifier};
use super::tree::{Combinator, Fragment, Predicate, Where};
use crate::error::{WeaveError, WeaveResult};
use crate::value::Value;

const LITERAL_KEY: &str = "$literal";
const COLUMN_KEY: &str = "$col";
const VALUES_KEY: &str = "$values";

impl Where {
    /// Build a tree from its JSON form.
    pub fn from_json(json: &Json) -> WeaveResult<Where> {
        parse_where(json).map_err(|err| err.into_where_error(json.to_string()))
    }

    /// JSON form of the tree, as accepted by [`Where::from_json`].
    pub fn to_json(&self) -> Json {
        match self {
            Where::Sequence(items) => Json::Array(items.iter().map(Where::to_json).collect()),
            Where::Group(entries) => {
                let parts: Vec<Json> = entries.iter().map(Where::to_json).collect();
                let mut map = Map::new();
                for part in &parts {
                    let Json::Object(inner) = part else {
                        return json!({ "$and": parts });
                    };
                    for (key, value) in inner {
                        if map.insert(key.clone(), value.clone()).is_some() {
                            // Repeated keys would overwrite each other.
                            return json!({ "$and": parts });
                        }
                    }
                }
                Json::Object(map)
            }
            Where::Combinator(combinator, inner) => json!({ combinator.key(): inner.to_json() }),
            Where::Leaf(attribute, predicate) => json!({ attribute.as_str(): predicate.to_json() }),
            Where::Fragment(Fragment::Literal(sql)) => json!({ LITERAL_KEY: sql }),
            Where::Fragment(Fragment::Compare { left, op, right }) => json!({
                "$compare": [value_to_json(left), format!("${}", op.name()), value_to_json(right)]
            }),
        }
    }
}

impl Predicate {
    /// JSON form of the predicate.
    pub fn to_json(&self) -> Json {
        match self {
            Predicate::Value(value) => value_to_json(value),
            Predicate::Op(op, value) => json!({ format!("${}", op.name()): value_to_json(value) }),
            Predicate::Quantified(op, quantifier, value) => json!({
                format!("${}", op.name()): { format!("${}", quantifier.name()): value_to_json(value) }
            }),
            Predicate::All(items) => json!({ "$and": items.iter().map(Predicate::to_json).collect::<Vec<_>>() }),
            Predicate::Any(items) => json!({ "$or": items.iter().map(Predicate::to_json).collect::<Vec<_>>() }),
            Predicate::Not(inner) => json!({ "$not": inner.to_json() }),
        }
    }
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Literal(sql) => json!({ LITERAL_KEY: sql }),
        Value::Column(name) => json!({ COLUMN_KEY: name }),
        Value::List(items) => json!({ VALUES_KEY: items.iter().map(value_to_json).collect::<Vec<_>>() }),
        other => serde_json::to_value(other).unwrap_or(Json::Null),
    }
}

fn parse_where(json: &Json) -> WeaveResult<Where> {
    match json {
        Json::String(_) => Err(WeaveError::validation(
            "Support for `{ where: 'raw query' }` has been removed. Use `{ \"$literal\": \"raw query\" }` instead",
        )),
        Json::Array(items) => Ok(Where::Sequence(
            items.iter().map(parse_where).collect::<WeaveResult<_>>()?,
        )),
        Json::Object(map) => {
            if let Some(sql) = single_string(map, LITERAL_KEY) {
                return Ok(Where::literal(sql));
            }
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                entries.push(parse_entry(json, key, value)?);
            }
            Ok(Where::Group(entries))
        }
        other => Err(WeaveError::validation(format!(
            "Invalid Query: expected a plain object or an array but got {other}"
        ))),
    }
}

fn parse_entry(parent: &Json, key: &str, value: &Json) -> WeaveResult<Where> {
    if let Some(combinator) = Combinator::from_key(key) {
        return Ok(Where::Combinator(combinator, Box::new(parse_where(value)?)));
    }
    if key.starts_with('$') && is_operator_key(key) {
        return Err(WeaveError::validation(format!(
            "Invalid Query: {parent} includes the operator {key} but only attributes, $and, $or, and $not are allowed."
        )));
    }
    Ok(Where::Leaf(key.to_string(), parse_predicate(value)?))
}

fn is_operator_key(key: &str) -> bool {
    let name = &key[1..];
    Op::from_name(name).is_some()
        || Quantifier::from_name(name).is_some()
        || key == LITERAL_KEY
        || key == COLUMN_KEY
        || key == VALUES_KEY
}

fn single_string<'j>(map: &'j Map<String, Json>, key: &str) -> Option<&'j str> {
    if map.len() != 1 {
        return None;
    }
    map.get(key).and_then(Json::as_str)
}

fn parse_predicate(json: &Json) -> WeaveResult<Predicate> {
    let Json::Object(map) = json else {
        return Ok(Predicate::Value(Value::from_json(json.clone())));
    };
    if let Some(value) = parse_expression(map)? {
        return Ok(Predicate::Value(value));
    }

    let mut parts = Vec::with_capacity(map.len());
    for (key, value) in map {
        parts.push(parse_operator(key, value)?);
    }
    Ok(match parts.len() {
        1 => parts.remove(0),
        _ => Predicate::All(parts),
    })
}

fn parse_operator(key: &str, value: &Json) -> WeaveResult<Predicate> {
    match key {
        "$and" | "$or" => {
            let items = match value {
                Json::Array(items) => items.iter().map(parse_predicate).collect::<WeaveResult<_>>()?,
                Json::Object(map) => map
                    .iter()
                    .map(|(k, v)| parse_operator(k, v))
                    .collect::<WeaveResult<_>>()?,
                other => vec![parse_predicate(other)?],
            };
            Ok(if key == "$and" {
                Predicate::All(items)
            } else {
                Predicate::Any(items)
            })
        }
        "$not" => Ok(Predicate::not(parse_predicate(value)?)),
        _ => {
            let name = key.strip_prefix('$').ok_or_else(|| {
                WeaveError::unsupported(format!("nested JSON path \"{key}\" in an attribute value"))
            })?;
            if let Some(quantifier) = Quantifier::from_name(name) {
                return Ok(Predicate::Quantified(Op::Eq, quantifier, parse_value(value)?));
            }
            let op = Op::from_name(name)
                .ok_or_else(|| WeaveError::validation(format!("unknown operator {key}")))?;
            if let Json::Object(inner) = value {
                if inner.len() == 1 {
                    if let Some((qkey, qvalue)) = inner.iter().next() {
                        if let Some(quantifier) =
                            qkey.strip_prefix('$').and_then(Quantifier::from_name)
                        {
                            return Ok(Predicate::Quantified(op, quantifier, parse_value(qvalue)?));
                        }
                    }
                }
            }
            Ok(Predicate::Op(op, parse_value(value)?))
        }
    }
}

/// `{"$literal": ..}`, `{"$col": ..}` or `{"$values": [..]}`, if `map` is one of those.
fn parse_expression(map: &Map<String, Json>) -> WeaveResult<Option<Value>> {
    if map.len() != 1 {
        return Ok(None);
    }
    if let Some(sql) = single_string(map, LITERAL_KEY) {
        return Ok(Some(Value::literal(sql)));
    }
    if let Some(name) = single_string(map, COLUMN_KEY) {
        return Ok(Some(Value::col(name)));
    }
    if let Some(values) = map.get(VALUES_KEY) {
        let Json::Array(items) = values else {
            return Err(WeaveError::validation("$values must be an array"));
        };
        return Ok(Some(Value::List(
            items.iter().map(parse_value).collect::<WeaveResult<_>>()?,
        )));
    }
    Ok(None)
}

fn parse_value(json: &Json) -> WeaveResult<Value> {
    match json {
        Json::Object(map) => Ok(parse_expression(map)?.unwrap_or_else(|| Value::from_json(json.clone()))),
        Json::Array(items) => Ok(Value::Array(
            items.iter().map(parse_value).collect::<WeaveResult<_>>()?,
        )),
        other => Ok(Value::from_json(other.clone())),
    }
}
