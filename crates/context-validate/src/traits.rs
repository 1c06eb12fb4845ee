//! Core traits: the external validation engine boundary and the common
//! pass/fail contract shared by every validator.

use crate::error::Result;
use crate::messages::MessageBag;
use crate::rules::{Attributes, CustomMessages, RuleSet};

/// The field-level validation engine that interprets rule strings.
///
/// This crate never evaluates rules itself. A resolver hands the engine the
/// attributes, the resolved rules and any custom messages, and receives a
/// session it can extend before asking for the outcome.
///
/// ## Example
///
/// ```rust,ignore
/// struct MyEngine;
///
/// impl ValidationEngine for MyEngine {
///     type Session = MySession;
///
///     fn evaluate(
///         &self,
///         attributes: &Attributes,
///         rules: &RuleSet,
///         messages: &CustomMessages,
///     ) -> MySession {
///         MySession::new(attributes.clone(), rules.clone(), messages.clone())
///     }
/// }
/// ```
pub trait ValidationEngine {
    /// Live validation session produced by [`evaluate`](Self::evaluate).
    type Session: EngineSession;

    /// Attach rules and messages to a new session for these attributes.
    fn evaluate(
        &self,
        attributes: &Attributes,
        rules: &RuleSet,
        messages: &CustomMessages,
    ) -> Self::Session;
}

/// A validation run prepared by a [`ValidationEngine`].
///
/// Engine-specific methods (for example attaching conditional rules) live on
/// the concrete session type and are reached through the resolver's
/// conditional-rules callback.
pub trait EngineSession {
    /// Run the attached rules and report whether all of them passed.
    fn passes(&mut self) -> bool;

    /// Messages for the rules that failed during [`passes`](Self::passes).
    fn messages(&self) -> MessageBag;
}

/// Anything with a pass/fail outcome and a field -> messages accessor.
///
/// Implemented by [`ContextResolver`](crate::ContextResolver),
/// [`ValidatorAggregator`](crate::ValidatorAggregator) and
/// [`NativeValidator`](crate::NativeValidator), so all three can be
/// aggregated together.
pub trait Validatable {
    /// Run validation and report whether it passed.
    ///
    /// `Err` is reserved for configuration mistakes such as an undefined
    /// context; failed rules are reported as `Ok(false)`.
    fn passes(&mut self) -> Result<bool>;

    /// Inverse of [`passes`](Self::passes).
    fn fails(&mut self) -> Result<bool> {
        self.passes().map(|passed| !passed)
    }

    /// Error messages from the last run, running validation first if needed.
    fn errors(&mut self) -> Result<&MessageBag>;

    /// Name used in errors and logs.
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<V: Validatable + ?Sized> Validatable for Box<V> {
    fn passes(&mut self) -> Result<bool> {
        (**self).passes()
    }

    fn fails(&mut self) -> Result<bool> {
        (**self).fails()
    }

    fn errors(&mut self) -> Result<&MessageBag> {
        (**self).errors()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}
