//! `@token` placeholder substitution for resolved rules.
//!
//! Rules like `unique:users,email,@id` carry placeholders that are only known
//! at request time. Values are bound per field with
//! [`ContextResolver::bind_replacement`](crate::ContextResolver::bind_replacement)
//! and substituted after contexts are resolved.

use crate::error::{ContextError, Result};
use crate::rules::{RuleExpr, RuleSet};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Placeholder token to value for a single field.
pub type Replacement = IndexMap<String, serde_json::Value>;

/// Replacement mappings keyed by field name.
pub type Replacements = IndexMap<String, Replacement>;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| Regex::new(r"@([A-Za-z0-9_]+)").unwrap())
}

/// Placeholder names in a rule string, in order of appearance.
pub fn placeholders(rule: &str) -> Vec<&str> {
    token_regex()
        .captures_iter(rule)
        .filter_map(|caps| caps.get(1))
        .map(|token| token.as_str())
        .collect()
}

/// String form of a bound value as it appears inside a rule.
fn replacement_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Substitute the placeholders of one rule string.
pub fn bind_rule(rule: &str, field: &str, replacement: Option<&Replacement>) -> Result<String> {
    let tokens = placeholders(rule);
    if tokens.is_empty() {
        return Ok(rule.to_string());
    }

    let mut unbound: Vec<String> = Vec::new();
    for token in &tokens {
        let bound = replacement.is_some_and(|r| r.contains_key(*token));
        if !bound && !unbound.iter().any(|u| u == token) {
            unbound.push(token.to_string());
        }
    }

    let Some(replacement) = replacement.filter(|_| unbound.is_empty()) else {
        tracing::warn!(field = %field, rule = %rule, unbound = ?unbound, "unbound rule placeholders");
        return Err(ContextError::ReplacementBinding {
            rule: rule.to_string(),
            field: field.to_string(),
            expected: tokens.len(),
            unbound,
        });
    };

    let bound = token_regex().replace_all(rule, |caps: &Captures<'_>| {
        let token = &caps[1];
        tracing::trace!(field = %field, token = %token, "bound placeholder");
        replacement
            .get(token)
            .map(replacement_text)
            .unwrap_or_default()
    });

    Ok(bound.into_owned())
}

/// Substitute placeholders across a resolved rule set.
///
/// Fields without placeholders pass through unchanged whether or not a
/// replacement is bound for them.
pub fn bind_replacements(rules: &RuleSet, replacements: &Replacements) -> Result<RuleSet> {
    rules
        .iter()
        .map(|(field, expr)| -> Result<(String, RuleExpr)> {
            let replacement = replacements.get(field);
            let bound = expr.try_map(|rule| bind_rule(rule, field, replacement))?;
            Ok((field.clone(), bound))
        })
        .collect()
}
