use std::collections::BTreeMap;

use super::BindMapping;
use crate::error::{WeaveError, WeaveResult};
use crate::value::Value;

/// Prefix of bind names generated by [`BindParamGenerator`].
pub const RESERVED_BIND_PREFIX: &str = "sqlweave_";

/// Bind values supplied by the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Binds {
    /// Values for `$1`, `$2`, ... (index 0 holds `$1`).
    Positional(Vec<Value>),
    /// Values for `$name`.
    Named(BTreeMap<String, Value>),
    #[default]
    None,
}

impl Binds {
    /// Build named binds from `(name, value)` pairs.
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

    /// Build positional binds.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Accept a JSON array (positional) or object (named); `null` means no binds.
    pub fn from_json(json: serde_json::Value) -> WeaveResult<Self> {
        match json {
            serde_json::Value::Null => Ok(Self::None),
            serde_json::Value::Array(items) => Ok(Self::Positional(
                items.into_iter().map(Value::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Ok(Self::Named(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            )),
            other => Err(WeaveError::InvalidBinds {
                received: other.to_string(),
            }),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Positional(values) => positional_index(name).and_then(|i| values.get(i)),
            Self::Named(map) => map.get(name),
            Self::None => None,
        }
    }

    /// Named view of these binds: positional values are keyed `"1"`, `"2"`, ...
    pub fn into_named(self) -> BTreeMap<String, Value> {
        match self {
            Self::Positional(values) => values
                .into_iter()
                .enumerate()
                .map(|(i, v)| ((i + 1).to_string(), v))
                .collect(),
            Self::Named(map) => map,
            Self::None => BTreeMap::new(),
        }
    }
}

/// Bind values ready to hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValues {
    /// One value per native positional marker.
    Ordered(Vec<Value>),
    /// Values keyed by name, for dialects with native named parameters.
    Named(BTreeMap<String, Value>),
}

impl BoundValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Ordered(v) => v.len(),
            Self::Named(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `"1"` -> `Some(0)`; `"0"`, `"01"` and non-numbers -> `None`.
fn positional_index(name: &str) -> Option<usize> {
    if name.starts_with('0') || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

/// Check that every parameter referenced by `mapping` has a value, then
/// arrange the values in the order the dialect expects.
pub fn resolve_bind_values(mapping: &BindMapping, binds: &Binds) -> WeaveResult<BoundValues> {
    for name in &mapping.parameter_set {
        let malformed = name.starts_with('0');
        if malformed || binds.get(name).is_none() {
            return Err(WeaveError::MissingBind { name: name.clone() });
        }
    }

    match &mapping.bind_order {
        Some(order) => {
            let mut values = Vec::with_capacity(order.len());
            for name in order {
                let value = binds
                    .get(name)
                    .ok_or_else(|| WeaveError::MissingBind { name: name.clone() })?;
                values.push(value.clone());
            }
            Ok(BoundValues::Ordered(values))
        }
        None => Ok(BoundValues::Named(binds.clone().into_named())),
    }
}

/// Reject caller-supplied names that collide with generated bind names.
pub fn assert_no_reserved_bind(binds: &Binds) -> WeaveResult<()> {
    if let Binds::Named(map) = binds {
        if let Some(name) = map.keys().find(|k| k.starts_with(RESERVED_BIND_PREFIX)) {
            return Err(WeaveError::ReservedBind { name: name.clone() });
        }
    }
    Ok(())
}

/// Merge two bind sets; entries of `b` win on conflict.
pub fn combine_binds(a: Binds, b: BTreeMap<String, Value>) -> Binds {
    let mut merged = a.into_named();
    merged.extend(b);
    Binds::Named(merged)
}

/// Hands out `$sqlweave_1`, `$sqlweave_2`, ... while recording their values.
#[derive(Debug, Clone, Default)]
pub struct BindParamGenerator {
    values: BTreeMap<String, Value>,
    next: usize,
}

impl BindParamGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` and return the bind parameter that refers to it.
    pub fn push(&mut self, value: Value) -> String {
        self.next += 1;
        let name = format!("{RESERVED_BIND_PREFIX}{}", self.next);
        let marker = format!("${name}");
        self.values.insert(name, value);
        marker
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_binds(self) -> BTreeMap<String, Value> {
        self.values
    }
}
