//! Rule definitions and context resolution.

use crate::error::{ContextError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the fragment that is always applied before any named context.
pub const DEFAULT_CONTEXT: &str = "default";

/// Field values under validation.
pub type Attributes = IndexMap<String, serde_json::Value>;

/// Message overrides forwarded to the validation engine, e.g. `"email.required"`.
pub type CustomMessages = IndexMap<String, String>;

/// Resolved mapping of field name to rule expression.
pub type RuleSet = IndexMap<String, RuleExpr>;

/// Rule expression for a single field.
///
/// Either a pipe-delimited string such as `"required|max:255"` or an ordered
/// list of rules such as `["required", "max:255"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleExpr {
    /// A single rule string
    Single(String),
    /// An ordered sequence of rule strings
    Sequence(Vec<String>),
}

impl RuleExpr {
    /// Iterate over the rule strings in this expression.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        let parts: &[String] = match self {
            RuleExpr::Single(rule) => std::slice::from_ref(rule),
            RuleExpr::Sequence(rules) => rules,
        };
        parts.iter().map(String::as_str)
    }

    /// Apply `f` to every rule string, keeping the expression's shape.
    pub fn try_map<F>(&self, mut f: F) -> Result<RuleExpr>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(match self {
            RuleExpr::Single(rule) => RuleExpr::Single(f(rule)?),
            RuleExpr::Sequence(rules) => RuleExpr::Sequence(
                rules
                    .iter()
                    .map(|rule| f(rule))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }
}

impl fmt::Display for RuleExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleExpr::Single(rule) => f.write_str(rule),
            RuleExpr::Sequence(rules) => f.write_str(&rules.join("|")),
        }
    }
}

impl From<&str> for RuleExpr {
    fn from(rule: &str) -> Self {
        RuleExpr::Single(rule.to_string())
    }
}

impl From<String> for RuleExpr {
    fn from(rule: String) -> Self {
        RuleExpr::Single(rule)
    }
}

impl From<Vec<String>> for RuleExpr {
    fn from(rules: Vec<String>) -> Self {
        RuleExpr::Sequence(rules)
    }
}

impl From<Vec<&str>> for RuleExpr {
    fn from(rules: Vec<&str>) -> Self {
        RuleExpr::Sequence(rules.into_iter().map(str::to_string).collect())
    }
}

/// Build a [`RuleSet`] from `(field, rule)` pairs.
pub fn rule_set<K, R, I>(entries: I) -> RuleSet
where
    I: IntoIterator<Item = (K, R)>,
    K: Into<String>,
    R: Into<RuleExpr>,
{
    entries
        .into_iter()
        .map(|(field, rule)| (field.into(), rule.into()))
        .collect()
}

/// Static rule definitions for one entity.
///
/// Contextual definitions map a context name to a fragment of rules, with
/// [`DEFAULT_CONTEXT`] as the base layer. Flat definitions are a single rule
/// set with no contexts.
///
/// ```rust,ignore
/// let definitions: RuleDefinitions = serde_json::from_str(r#"{
///     "default": { "first_name": "required", "last_name": "required" },
///     "create":  { "first_name": "required|max:255" }
/// }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleDefinitions {
    /// Fragments keyed by context name
    Contextual(IndexMap<String, RuleSet>),
    /// A single context-free rule set
    Flat(RuleSet),
}

impl Default for RuleDefinitions {
    fn default() -> Self {
        RuleDefinitions::Flat(RuleSet::new())
    }
}

impl RuleDefinitions {
    /// Create flat definitions.
    pub fn flat(rules: RuleSet) -> Self {
        RuleDefinitions::Flat(rules)
    }

    /// Start building contextual definitions.
    pub fn contextual() -> ContextualBuilder {
        ContextualBuilder::default()
    }

    /// Parse definitions from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check whether a `default` fragment exists.
    pub fn has_default(&self) -> bool {
        match self {
            RuleDefinitions::Contextual(fragments) => fragments.contains_key(DEFAULT_CONTEXT),
            RuleDefinitions::Flat(_) => false,
        }
    }

    /// Get the fragment for a context name.
    pub fn fragment(&self, context: &str) -> Option<&RuleSet> {
        match self {
            RuleDefinitions::Contextual(fragments) => fragments.get(context),
            RuleDefinitions::Flat(_) => None,
        }
    }

    /// Resolve the rules that apply for the given contexts.
    ///
    /// `default` is applied first, then each context in order. A field defined
    /// by a later fragment replaces the whole rule expression from earlier ones.
    /// Flat definitions with no contexts are returned unchanged.
    pub fn resolve<S: AsRef<str>>(&self, contexts: &[S], validator: &str) -> Result<RuleSet> {
        if contexts.is_empty() && !self.has_default() {
            return Ok(match self {
                RuleDefinitions::Flat(rules) => rules.clone(),
                RuleDefinitions::Contextual(_) => RuleSet::new(),
            });
        }

        let mut resolved = self.fragment(DEFAULT_CONTEXT).cloned().unwrap_or_default();

        for context in contexts {
            let context = context.as_ref();
            let fragment = self.fragment(context).ok_or_else(|| {
                tracing::warn!(validator = %validator, context = %context, "context not defined");
                ContextError::context_not_found(validator, context)
            })?;

            for (field, rule) in fragment {
                resolved.insert(field.clone(), rule.clone());
            }
        }

        tracing::debug!(
            validator = %validator,
            contexts = contexts.len(),
            fields = resolved.len(),
            "resolved rules in context"
        );

        Ok(resolved)
    }
}

impl From<RuleSet> for RuleDefinitions {
    fn from(rules: RuleSet) -> Self {
        RuleDefinitions::Flat(rules)
    }
}

/// Builder for contextual [`RuleDefinitions`].
#[derive(Debug, Default)]
pub struct ContextualBuilder {
    fragments: IndexMap<String, RuleSet>,
}

impl ContextualBuilder {
    /// Set the `default` fragment.
    pub fn default_rules(self, rules: RuleSet) -> Self {
        self.context(DEFAULT_CONTEXT, rules)
    }

    /// Set the fragment for a named context.
    pub fn context(mut self, name: impl Into<String>, rules: RuleSet) -> Self {
        self.fragments.insert(name.into(), rules);
        self
    }

    /// Build the definitions.
    pub fn build(self) -> RuleDefinitions {
        RuleDefinitions::Contextual(self.fragments)
    }
}
