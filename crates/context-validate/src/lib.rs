//! # Context Validate
//!
//! Context-aware validation rule sets for RustAPI applications.
//!
//! A single entity often needs slightly different rules depending on what is
//! happening to it: creating a user requires a password, editing one does
//! not; an email must be unique except for the record being edited. This
//! crate keeps those variants in one rule table and resolves the right set at
//! request time. The rules themselves are interpreted by an external
//! [`ValidationEngine`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use context_validate::prelude::*;
//!
//! let definitions = RuleDefinitions::from_json(r#"{
//!     "default": { "first_name": "required", "last_name": "required" },
//!     "create":  { "first_name": "required|max:255" },
//!     "edit":    { "email": "required|email|unique:users,email,@id" }
//! }"#)?;
//!
//! let mut person = ContextResolver::builder(engine)
//!     .name("PersonValidator")
//!     .definitions(definitions)
//!     .build(attributes);
//!
//! person.add_context("edit").bind_replacement("email", [("id", user_id)]);
//!
//! let mut all = ValidatorAggregator::new();
//! all.add_validator(person)
//!     .add_validator(NativeValidator::new(address));
//!
//! if all.fails()? {
//!     return Err(all.errors()?.to_api_error());
//! }
//! ```
//!
//! ## Resolution order
//!
//! 1. The `default` fragment.
//! 2. Each added context, in the order it was added. A field defined by a
//!    later fragment replaces the earlier rule for that field.
//! 3. `@token` placeholders are replaced with the values bound for the field.
//!
//! Requesting a context that is not defined, or leaving a placeholder
//! unbound, is a [`ContextError`] rather than a validation failure.

mod aggregate;
mod config;
mod error;
mod messages;
mod native;
mod replacement;
mod resolver;
mod rules;
mod traits;

#[cfg(test)]
mod test_support;

pub use aggregate::ValidatorAggregator;
pub use config::ResolverConfig;
pub use error::{ContextError, Result};
pub use messages::{ApiValidationError, ErrorBody, FieldMessage, MessageBag};
pub use native::{messages_from_validator, NativeValidator};
pub use replacement::{bind_replacements, bind_rule, placeholders, Replacement, Replacements};
pub use resolver::{ConditionalRules, ContextResolver, ContextResolverBuilder, IntoContexts};
pub use rules::{
    rule_set, Attributes, ContextualBuilder, CustomMessages, RuleDefinitions, RuleExpr, RuleSet,
    DEFAULT_CONTEXT,
};
pub use traits::{EngineSession, Validatable, ValidationEngine};

/// Prelude module for context validation
pub mod prelude {
    pub use crate::aggregate::ValidatorAggregator;
    pub use crate::config::ResolverConfig;
    pub use crate::error::{ContextError, Result};
    pub use crate::messages::MessageBag;
    pub use crate::native::NativeValidator;
    pub use crate::resolver::{ContextResolver, ContextResolverBuilder};
    pub use crate::rules::{
        rule_set, Attributes, CustomMessages, RuleDefinitions, RuleExpr, RuleSet,
    };
    pub use crate::traits::{EngineSession, Validatable, ValidationEngine};
}
