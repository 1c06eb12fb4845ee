//! Resolver configuration loaded from data.
//!
//! Lets rule tables live in JSON (or any serde format) instead of code:
//!
//! ```json
//! {
//!   "name": "UserValidator",
//!   "rules": {
//!     "default": { "email": "required|email" },
//!     "edit": { "email": "required|email|unique:users,email,@id" }
//!   },
//!   "messages": { "email.unique": "That email is already taken." },
//!   "contexts": ["edit"]
//! }
//! ```

use crate::error::Result;
use crate::resolver::{ContextResolver, ContextResolverBuilder};
use crate::rules::{Attributes, CustomMessages, RuleDefinitions};
use crate::traits::ValidationEngine;
use serde::{Deserialize, Serialize};

/// Serializable description of a [`ContextResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Name reported in errors and logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rule definitions, flat or contextual
    #[serde(default)]
    pub rules: RuleDefinitions,
    /// Custom messages forwarded to the engine
    #[serde(default, skip_serializing_if = "CustomMessages::is_empty")]
    pub messages: CustomMessages,
    /// Contexts selected when the resolver is built
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,
}

impl ResolverConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a configuration from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Turn the configuration into a resolver builder for `engine`.
    pub fn into_builder<E: ValidationEngine>(self, engine: E) -> ContextResolverBuilder<E> {
        let mut builder = ContextResolver::builder(engine)
            .definitions(self.rules)
            .messages(self.messages)
            .context(self.contexts);
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        builder
    }

    /// Build a resolver directly.
    pub fn build<E: ValidationEngine>(
        self,
        engine: E,
        attributes: Attributes,
    ) -> ContextResolver<E> {
        self.into_builder(engine).build(attributes)
    }
}
