//! Minimal engines used by unit tests.
//!
//! `StubEngine` understands just enough rules to produce failures:
//! `required` and `max:N` (string length). Every other rule passes.

use crate::messages::MessageBag;
use crate::rules::{Attributes, CustomMessages, RuleExpr, RuleSet};
use crate::traits::{EngineSession, ValidationEngine};
use std::sync::{Arc, Mutex};

pub(crate) fn attributes<const N: usize>(entries: [(&str, serde_json::Value); N]) -> Attributes {
    entries
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StubEngine;

impl ValidationEngine for StubEngine {
    type Session = StubSession;

    fn evaluate(
        &self,
        attributes: &Attributes,
        rules: &RuleSet,
        messages: &CustomMessages,
    ) -> StubSession {
        StubSession {
            attributes: attributes.clone(),
            rules: rules.clone(),
            custom: messages.clone(),
            failures: MessageBag::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct StubSession {
    attributes: Attributes,
    rules: RuleSet,
    custom: CustomMessages,
    failures: MessageBag,
}

impl StubSession {
    pub(crate) fn add_rule(&mut self, field: &str, rule: &str) {
        self.rules.insert(field.to_string(), RuleExpr::from(rule));
    }

    fn message(&self, field: &str, rule: &str, fallback: String) -> String {
        self.custom
            .get(&format!("{field}.{rule}"))
            .cloned()
            .unwrap_or(fallback)
    }

    fn check(&self, field: &str, rule: &str) -> Option<String> {
        let value = self.attributes.get(field);
        let text = value.and_then(|v| v.as_str());
        let (name, arg) = rule.split_once(':').unwrap_or((rule, ""));

        match name {
            "required" => {
                let present = match value {
                    None | Some(serde_json::Value::Null) => false,
                    Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
                    Some(_) => true,
                };
                (!present).then(|| {
                    self.message(field, name, format!("The {field} field is required."))
                })
            }
            "max" => {
                let max: usize = arg.parse().ok()?;
                let len = text?.chars().count();
                (len > max).then(|| {
                    self.message(
                        field,
                        name,
                        format!("The {field} may not be greater than {max} characters."),
                    )
                })
            }
            _ => None,
        }
    }
}

impl EngineSession for StubSession {
    fn passes(&mut self) -> bool {
        let mut failures = MessageBag::new();
        for (field, expr) in &self.rules {
            for part in expr.parts() {
                for rule in part.split('|') {
                    if let Some(message) = self.check(field, rule) {
                        failures.add(field.clone(), message);
                    }
                }
            }
        }
        self.failures = failures;
        self.failures.is_empty()
    }

    fn messages(&self) -> MessageBag {
        self.failures.clone()
    }
}

/// Engine that records every rule set it is asked to evaluate and passes.
#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    seen: Arc<Mutex<Vec<RuleSet>>>,
}

impl RecordingEngine {
    pub(crate) fn seen(&self) -> Arc<Mutex<Vec<RuleSet>>> {
        Arc::clone(&self.seen)
    }
}

pub(crate) struct PassingSession;

impl EngineSession for PassingSession {
    fn passes(&mut self) -> bool {
        true
    }

    fn messages(&self) -> MessageBag {
        MessageBag::new()
    }
}

impl ValidationEngine for RecordingEngine {
    type Session = PassingSession;

    fn evaluate(&self, _: &Attributes, rules: &RuleSet, _: &CustomMessages) -> PassingSession {
        self.seen.lock().unwrap().push(rules.clone());
        PassingSession
    }
}

/// A fixed-outcome validator for aggregation tests.
#[derive(Debug, Default)]
pub(crate) struct FixedValidator {
    pub(crate) label: &'static str,
    pub(crate) errors: MessageBag,
}

impl FixedValidator {
    pub(crate) fn passing(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub(crate) fn failing(label: &'static str, errors: MessageBag) -> Self {
        Self { label, errors }
    }
}

impl crate::traits::Validatable for FixedValidator {
    fn passes(&mut self) -> crate::Result<bool> {
        Ok(self.errors.is_empty())
    }

    fn errors(&mut self) -> crate::Result<&MessageBag> {
        Ok(&self.errors)
    }

    fn name(&self) -> String {
        self.label.to_string()
    }
}
