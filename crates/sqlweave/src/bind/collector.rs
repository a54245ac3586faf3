use std::collections::HashMap;

use crate::dialect::BindStyle;

/// Turns bind names into native markers while recording the order values must follow.
#[derive(Debug, Clone)]
pub enum BindCollector {
    /// `?`-style: one marker and one order entry per occurrence.
    Unspecified {
        token: &'static str,
        order: Vec<String>,
    },
    /// `$1`-style: a repeated name reuses its index and appears once in the order.
    Specified {
        prefix: &'static str,
        order: Vec<String>,
        index: HashMap<String, usize>,
    },
    /// Native named markers; the driver resolves names, so there is no order.
    Named { prefix: &'static str },
}

impl BindCollector {
    pub fn for_style(style: BindStyle) -> Self {
        match style {
            BindStyle::Positional { token } => Self::Unspecified {
                token,
                order: Vec::new(),
            },
            BindStyle::Numbered { prefix } => Self::Specified {
                prefix,
                order: Vec::new(),
                index: HashMap::new(),
            },
            BindStyle::Named { prefix } => Self::Named { prefix },
        }
    }

    /// Append the native marker for `name` to `out`.
    pub fn collect(&mut self, name: &str, out: &mut String) {
        match self {
            Self::Unspecified { token, order } => {
                order.push(name.to_string());
                out.push_str(token);
            }
            Self::Specified {
                prefix,
                order,
                index,
            } => {
                let position = match index.get(name) {
                    Some(&i) => i,
                    None => {
                        order.push(name.to_string());
                        index.insert(name.to_string(), order.len());
                        order.len()
                    }
                };
                out.push_str(prefix);
                out.push_str(&position.to_string());
            }
            Self::Named { prefix } => {
                out.push_str(prefix);
                out.push_str(name);
            }
        }
    }

    /// The bind order, or `None` for named dialects.
    pub fn finish(self) -> Option<Vec<String>> {
        match self {
            Self::Unspecified { order, .. } | Self::Specified { order, .. } => Some(order),
            Self::Named { .. } => None,
        }
    }
}
