//! Context-aware rule resolution in front of a validation engine.

use crate::error::Result;
use crate::messages::MessageBag;
use crate::replacement::{bind_replacements, Replacement, Replacements};
use crate::rules::{Attributes, CustomMessages, RuleDefinitions, RuleSet};
use crate::traits::{EngineSession, Validatable, ValidationEngine};
use std::fmt;

/// Callback that attaches engine-native conditional rules to a live session.
///
/// Runs after the static rules are attached and before the session is
/// evaluated.
pub type ConditionalRules<S> = Box<dyn Fn(&mut S, &Attributes) + Send + Sync>;

const DEFAULT_NAME: &str = "ContextResolver";

/// Conversion into an ordered list of context names.
pub trait IntoContexts {
    fn into_contexts(self) -> Vec<String>;
}

impl IntoContexts for &str {
    fn into_contexts(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoContexts for String {
    fn into_contexts(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoContexts for &String {
    fn into_contexts(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoContexts for Vec<String> {
    fn into_contexts(self) -> Vec<String> {
        self
    }
}

impl IntoContexts for Vec<&str> {
    fn into_contexts(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoContexts for &[&str] {
    fn into_contexts(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }
}

impl IntoContexts for &[String] {
    fn into_contexts(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoContexts for [&str; N] {
    fn into_contexts(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }
}

/// Validator for one entity whose rules depend on the selected contexts.
///
/// Rules come from [`RuleDefinitions`]: the `default` fragment first, then
/// every added context in order, with later fragments replacing same-named
/// fields. `@token` placeholders are then filled from the bound replacements
/// and the result is handed to the [`ValidationEngine`].
///
/// Any mutation (attributes, contexts or replacements) discards the cached
/// outcome, so [`errors`](Validatable::errors) never reports a stale run.
///
/// ## Example
///
/// ```rust,ignore
/// use context_validate::prelude::*;
///
/// let mut validator = ContextResolver::builder(engine)
///     .name("UserValidator")
///     .definitions(definitions)
///     .build(attributes);
///
/// validator
///     .add_context("edit")
///     .bind_replacement("email", [("id", 42)]);
///
/// if validator.fails()? {
///     return Err(validator.errors()?.to_api_error());
/// }
/// ```
pub struct ContextResolver<E: ValidationEngine> {
    name: String,
    engine: E,
    definitions: RuleDefinitions,
    messages: CustomMessages,
    conditional_rules: Option<ConditionalRules<E::Session>>,
    attributes: Attributes,
    contexts: Vec<String>,
    replacements: Replacements,
    passed: Option<bool>,
    errors: MessageBag,
}

impl<E: ValidationEngine> ContextResolver<E> {
    /// Create a resolver over the given definitions and attributes.
    pub fn new(engine: E, definitions: RuleDefinitions, attributes: Attributes) -> Self {
        Self::builder(engine).definitions(definitions).build(attributes)
    }

    /// Create a builder for constructing a resolver.
    pub fn builder(engine: E) -> ContextResolverBuilder<E> {
        ContextResolverBuilder::new(engine)
    }

    /// Append one or more contexts.
    pub fn add_context(&mut self, context: impl IntoContexts) -> &mut Self {
        self.contexts.extend(context.into_contexts());
        self.invalidate();
        self
    }

    /// Replace every previously added context.
    pub fn set_context(&mut self, context: impl IntoContexts) -> &mut Self {
        self.contexts = context.into_contexts();
        self.invalidate();
        self
    }

    /// Contexts in the order they were added.
    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    /// Bind placeholder values for a field, replacing any earlier binding.
    pub fn bind_replacement<I, K, V>(
        &mut self,
        field: impl Into<String>,
        replacement: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        let replacement: Replacement = replacement
            .into_iter()
            .map(|(token, value)| (token.into(), value.into()))
            .collect();
        self.replacements.insert(field.into(), replacement);
        self.invalidate();
        self
    }

    /// Placeholder values bound for a field, empty if none.
    pub fn replacement(&self, field: &str) -> Replacement {
        self.replacements.get(field).cloned().unwrap_or_default()
    }

    /// Replace the attributes under validation.
    pub fn set_attributes(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes = attributes;
        self.invalidate();
        self
    }

    /// Attributes under validation.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Static rule definitions.
    pub fn definitions(&self) -> &RuleDefinitions {
        &self.definitions
    }

    /// Custom messages forwarded to the engine.
    pub fn messages(&self) -> &CustomMessages {
        &self.messages
    }

    /// Outcome of the last run, if it is still current.
    pub fn passed(&self) -> Option<bool> {
        self.passed
    }

    /// Rules for the selected contexts, before placeholder substitution.
    pub fn rules_in_context(&self) -> Result<RuleSet> {
        self.definitions.resolve(&self.contexts, &self.name)
    }

    /// Rules for the selected contexts with placeholders substituted.
    pub fn resolved_rules(&self) -> Result<RuleSet> {
        let rules = self.rules_in_context()?;
        bind_replacements(&rules, &self.replacements)
    }

    fn invalidate(&mut self) {
        self.passed = None;
        self.errors.clear();
    }
}

impl<E: ValidationEngine> Validatable for ContextResolver<E> {
    fn passes(&mut self) -> Result<bool> {
        self.invalidate();
        let rules = self.resolved_rules()?;

        let mut session = self
            .engine
            .evaluate(&self.attributes, &rules, &self.messages);
        if let Some(conditional_rules) = &self.conditional_rules {
            conditional_rules(&mut session, &self.attributes);
        }

        let passed = session.passes();
        if !passed {
            self.errors = session.messages();
        }
        self.passed = Some(passed);

        tracing::debug!(
            validator = %self.name,
            contexts = ?self.contexts,
            passed,
            errors = self.errors.len(),
            "validation finished"
        );

        Ok(passed)
    }

    fn errors(&mut self) -> Result<&MessageBag> {
        if self.passed.is_none() {
            self.passes()?;
        }
        Ok(&self.errors)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

impl<E: ValidationEngine> fmt::Debug for ContextResolver<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextResolver")
            .field("name", &self.name)
            .field("definitions", &self.definitions)
            .field("contexts", &self.contexts)
            .field("replacements", &self.replacements)
            .field("has_conditional_rules", &self.conditional_rules.is_some())
            .field("passed", &self.passed)
            .finish()
    }
}

/// Builder for constructing a [`ContextResolver`].
pub struct ContextResolverBuilder<E: ValidationEngine> {
    engine: E,
    name: Option<String>,
    definitions: RuleDefinitions,
    messages: CustomMessages,
    contexts: Vec<String>,
    conditional_rules: Option<ConditionalRules<E::Session>>,
}

impl<E: ValidationEngine> ContextResolverBuilder<E> {
    /// Create a new builder around an engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            name: None,
            definitions: RuleDefinitions::default(),
            messages: CustomMessages::new(),
            contexts: Vec::new(),
            conditional_rules: None,
        }
    }

    /// Name reported in errors and logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the rule definitions.
    pub fn definitions(mut self, definitions: impl Into<RuleDefinitions>) -> Self {
        self.definitions = definitions.into();
        self
    }

    /// Set all custom messages.
    pub fn messages(mut self, messages: CustomMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Add a single custom message.
    pub fn message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }

    /// Select initial contexts.
    pub fn context(mut self, context: impl IntoContexts) -> Self {
        self.contexts.extend(context.into_contexts());
        self
    }

    /// Attach engine-native conditional rules before each evaluation.
    pub fn conditional_rules<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut E::Session, &Attributes) + Send + Sync + 'static,
    {
        self.conditional_rules = Some(Box::new(callback));
        self
    }

    /// Build the resolver for the given attributes.
    pub fn build(self, attributes: Attributes) -> ContextResolver<E> {
        ContextResolver {
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            engine: self.engine,
            definitions: self.definitions,
            messages: self.messages,
            conditional_rules: self.conditional_rules,
            attributes,
            contexts: self.contexts,
            replacements: Replacements::new(),
            passed: None,
            errors: MessageBag::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use crate::rules::{rule_set, RuleExpr};
    use crate::test_support::{attributes, RecordingEngine, StubEngine, StubSession};
    use serde_json::json;

    fn person_definitions() -> RuleDefinitions {
        RuleDefinitions::contextual()
            .default_rules(rule_set([
                ("first_name", "required"),
                ("last_name", "required"),
            ]))
            .context("create", rule_set([("first_name", "required|max:255")]))
            .context("edit", rule_set([("email", "unique:users,email,@id")]))
            .build()
    }

    fn person(attrs: Attributes) -> ContextResolver<StubEngine> {
        ContextResolver::builder(StubEngine)
            .name("PersonValidator")
            .definitions(person_definitions())
            .build(attrs)
    }

    #[test]
    fn resolves_create_context() {
        let mut validator = person(attributes([("first_name", json!("Chris"))]));
        validator.add_context("create");

        assert_eq!(
            validator.rules_in_context().unwrap(),
            rule_set([
                ("first_name", "required|max:255"),
                ("last_name", "required"),
            ])
        );
    }

    #[test]
    fn add_context_is_cumulative() {
        let mut validator = person(Attributes::new());
        validator.add_context("create").add_context(["edit", "admin"]);
        validator.add_context(vec!["audit".to_string()]);

        assert_eq!(validator.contexts(), ["create", "edit", "admin", "audit"]);
    }

    #[test]
    fn set_context_discards_previous() {
        let mut validator = person(Attributes::new());
        validator.add_context(["create", "edit"]);
        validator.set_context("edit");

        assert_eq!(validator.contexts(), ["edit"]);
    }

    #[test]
    fn initial_context_from_builder() {
        let validator = ContextResolver::builder(StubEngine)
            .definitions(person_definitions())
            .context("create")
            .build(Attributes::new());

        assert_eq!(validator.contexts(), ["create"]);
    }

    #[test]
    fn replacement_defaults_to_empty() {
        let mut validator = person(Attributes::new());
        assert!(validator.replacement("email").is_empty());

        validator.bind_replacement("email", [("id", 42)]);
        assert_eq!(validator.replacement("email")["id"], json!(42));

        validator.bind_replacement("email", [("id", "abc")]);
        assert_eq!(validator.replacement("email")["id"], json!("abc"));
    }

    #[test]
    fn resolved_rules_substitute_placeholders() {
        let mut validator = person(Attributes::new());
        validator
            .add_context("edit")
            .bind_replacement("email", [("id", 42)]);

        let rules = validator.resolved_rules().unwrap();
        assert_eq!(rules["email"], RuleExpr::from("unique:users,email,42"));
    }

    #[test]
    fn unbound_placeholder_fails_passes() {
        let mut validator = person(attributes([("first_name", json!("Chris"))]));
        validator.add_context("edit");

        assert!(matches!(
            validator.passes(),
            Err(ContextError::ReplacementBinding { .. })
        ));
    }

    #[test]
    fn unknown_context_fails_passes() {
        let mut validator = person(Attributes::new());
        validator.add_context(["create", "archive"]);

        match validator.passes() {
            Err(ContextError::ContextNotFound { validator, context }) => {
                assert_eq!(validator, "PersonValidator");
                assert_eq!(context, "archive");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn passes_with_required_fields_present() {
        let mut validator = person(attributes([
            ("first_name", json!("Chris")),
            ("last_name", json!("Doe")),
        ]));
        validator.add_context("create");

        assert!(validator.passes().unwrap());
        assert!(!validator.fails().unwrap());
        assert!(validator.errors().unwrap().is_empty());
    }

    #[test]
    fn failure_captures_engine_messages() {
        let mut validator = person(attributes([("first_name", json!("Chris"))]));
        validator.add_context("create");

        assert!(validator.fails().unwrap());
        let errors = validator.errors().unwrap();
        assert_eq!(errors.fields(), vec!["last_name"]);
        assert_eq!(errors.first("last_name"), Some("The last_name field is required."));
    }

    #[test]
    fn errors_runs_validation_when_needed() {
        let mut validator = person(Attributes::new());
        assert_eq!(validator.passed(), None);

        let errors = validator.errors().unwrap().clone();
        assert_eq!(errors.len(), 2);
        assert_eq!(validator.passed(), Some(false));
    }

    #[test]
    fn mutation_invalidates_cached_errors() {
        let mut validator = person(attributes([("first_name", json!("Chris"))]));
        assert!(validator.errors().unwrap().has("last_name"));

        validator.set_attributes(attributes([
            ("first_name", json!("Chris")),
            ("last_name", json!("Doe")),
        ]));
        assert_eq!(validator.passed(), None);
        assert!(validator.errors().unwrap().is_empty());
    }

    #[test]
    fn custom_messages_reach_the_engine() {
        let mut validator = ContextResolver::builder(StubEngine)
            .definitions(rule_set([("email", "required")]))
            .message("email.required", "We need your email.")
            .build(Attributes::new());

        assert!(validator.fails().unwrap());
        assert_eq!(
            validator.errors().unwrap().first("email"),
            Some("We need your email.")
        );
    }

    #[test]
    fn conditional_rules_run_before_evaluation() {
        let mut validator = ContextResolver::builder(StubEngine)
            .definitions(rule_set([("kind", "required")]))
            .conditional_rules(|session: &mut StubSession, attrs: &Attributes| {
                if attrs.get("kind") == Some(&json!("company")) {
                    session.add_rule("vat_number", "required");
                }
            })
            .build(attributes([("kind", json!("company"))]));

        assert!(validator.fails().unwrap());
        assert!(validator.errors().unwrap().has("vat_number"));

        validator.set_attributes(attributes([("kind", json!("person"))]));
        assert!(validator.passes().unwrap());
    }

    #[test]
    fn engine_receives_resolved_rules() {
        let engine = RecordingEngine::default();
        let seen = engine.seen();
        let mut validator = ContextResolver::builder(engine)
            .definitions(person_definitions())
            .context("edit")
            .build(Attributes::new());
        validator.bind_replacement("email", [("id", 9)]);

        validator.passes().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["email"], RuleExpr::from("unique:users,email,9"));
        assert_eq!(seen[0]["first_name"], RuleExpr::from("required"));
    }

    #[test]
    fn flat_definitions_without_context() {
        let rules = rule_set([("email", "required|email")]);
        let validator = ContextResolver::new(
            StubEngine,
            RuleDefinitions::flat(rules.clone()),
            Attributes::new(),
        );

        assert_eq!(validator.rules_in_context().unwrap(), rules);
        assert_eq!(Validatable::name(&validator), "ContextResolver");
    }
}
