//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Errors raised while scanning, mapping, injecting or compiling SQL.
///
/// Every variant is a deterministic function of the input: nothing here is
/// worth retrying, and no partially rewritten SQL is ever returned alongside it.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// The scan reached the end of input inside a quoted or dollar-quoted string.
    #[error("The following SQL query includes an unterminated string literal:\n{sql}")]
    UnterminatedString { sql: String },

    /// A `:name` placeholder has no entry in the replacement map.
    #[error("Named replacement \":{name}\" has no entry in the replacement map.")]
    MissingNamedReplacement { name: String },

    /// A `?` placeholder has no corresponding slot in the replacement list.
    #[error(
        "Positional replacement (?) {index} has no entry in the replacement map (replacements[{index}] is undefined)."
    )]
    MissingPositionalReplacement { index: usize },

    /// The replacements argument is neither a list nor a map.
    #[error(
        "\"replacements\" must be an array or a plain object, but received {received} instead."
    )]
    InvalidReplacements { received: String },

    /// A bind parameter is referenced by the SQL but no value was supplied for it.
    #[error(
        "Query includes bind parameter \"${name}\", but no value has been provided for that bind parameter."
    )]
    MissingBind { name: String },

    /// The bind values argument is neither a list nor a map.
    #[error(
        "bind parameters must be either a plain object (for named parameters) or an array (for numeric parameters), but received {received} instead."
    )]
    InvalidBinds { received: String },

    /// A caller-supplied bind name collides with the prefix used for generated binds.
    #[error(
        "Bind parameters cannot start with \"sqlweave_\", these bind parameters are reserved by sqlweave. (got \"{name}\")"
    )]
    ReservedBind { name: String },

    /// A where tree could not be compiled.
    #[error(
        "Invalid value received for the \"where\" option. Refer to the documentation to learn which values the \"where\" option accepts.\nValue: {value}\nCaused by: {message}"
    )]
    InvalidWhere {
        message: String,
        value: String,
        #[source]
        source: Option<Box<WeaveError>>,
    },

    /// The dialect cannot express the requested construct.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Validation error (identifiers, operator operands)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WeaveError {
    /// Create an unterminated string error carrying the full SQL text.
    pub fn unterminated(sql: impl Into<String>) -> Self {
        Self::UnterminatedString { sql: sql.into() }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unsupported-construct error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Create a where-tree error without a nested cause.
    pub fn invalid_where(message: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidWhere {
            message: message.into(),
            value: value.into(),
            source: None,
        }
    }

    /// Wrap `self` as the cause of a where-tree error for `value`.
    ///
    /// Errors that already describe an invalid where tree are returned as-is so
    /// nested compilation does not stack identical envelopes.
    pub fn into_where_error(self, value: impl Into<String>) -> Self {
        match self {
            err @ Self::InvalidWhere { .. } => err,
            other => Self::InvalidWhere {
                message: other.to_string(),
                value: value.into(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Check if this is an unterminated string error
    pub fn is_unterminated_string(&self) -> bool {
        matches!(self, Self::UnterminatedString { .. })
    }

    /// Check if this error reports a replacement without a value
    pub fn is_missing_replacement(&self) -> bool {
        matches!(
            self,
            Self::MissingNamedReplacement { .. } | Self::MissingPositionalReplacement { .. }
        )
    }

    /// Check if this error reports a bind parameter without a value
    pub fn is_missing_bind(&self) -> bool {
        matches!(self, Self::MissingBind { .. })
    }

    /// Check if this is a where-tree error
    pub fn is_invalid_where(&self) -> bool {
        matches!(self, Self::InvalidWhere { .. })
    }
}

impl From<serde_json::Error> for WeaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
