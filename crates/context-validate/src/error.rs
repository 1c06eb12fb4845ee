//! Error types for context-aware validation.
//!
//! These are configuration and usage errors. A field that simply fails its
//! rules is never reported here; it shows up through `passes() == Ok(false)`
//! and the [`MessageBag`](crate::MessageBag) returned by `errors()`.

use thiserror::Error;

/// Result type alias for context validation operations
pub type Result<T, E = ContextError> = std::result::Result<T, E>;

/// Precondition violations raised while resolving or running validators.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A context was requested that has no fragment in the rule definitions.
    #[error("validator `{validator}` does not define the context `{context}`")]
    ContextNotFound {
        /// Name of the validator whose definitions were searched
        validator: String,
        /// The missing context name
        context: String,
    },

    /// A rule references `@token` placeholders that were never bound.
    #[error(
        "rule `{rule}` for field `{field}` expects {expected} replacement(s) but {} placeholder(s) are unbound: {}",
        .unbound.len(),
        .unbound.join(", ")
    )]
    ReplacementBinding {
        /// The offending rule string
        rule: String,
        /// Field the rule belongs to
        field: String,
        /// Number of placeholders the rule contains
        expected: usize,
        /// Placeholder names without a bound value
        unbound: Vec<String>,
    },

    /// `passes()` was called on an aggregator with nothing to run.
    #[error("no validators have been added to the aggregator")]
    NoValidators,

    /// Rule definitions or resolver configuration could not be parsed.
    #[error("invalid validator definitions: {0}")]
    Definitions(#[from] serde_json::Error),
}

impl ContextError {
    /// Create a context-not-found error.
    pub fn context_not_found(validator: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ContextNotFound {
            validator: validator.into(),
            context: context.into(),
        }
    }

    /// Whether this error was raised by the aggregator rather than a resolver.
    pub fn is_no_validators(&self) -> bool {
        matches!(self, Self::NoValidators)
    }
}
