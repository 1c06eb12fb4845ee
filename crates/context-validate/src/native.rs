//! Adapter for types validated with the `validator` derive macro.

use crate::error::Result;
use crate::messages::MessageBag;
use crate::traits::Validatable;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Wraps a `validator::Validate` value so it can be aggregated next to
/// context resolvers.
///
/// ## Example
///
/// ```rust,ignore
/// use context_validate::prelude::*;
/// use validator::Validate;
///
/// #[derive(Validate)]
/// struct Address {
///     #[validate(length(min = 1, message = "The city is required."))]
///     city: String,
/// }
///
/// let mut aggregator = ValidatorAggregator::new();
/// aggregator.add_validator(NativeValidator::new(address));
/// ```
#[derive(Debug)]
pub struct NativeValidator<T> {
    value: T,
    passed: Option<bool>,
    errors: MessageBag,
}

impl<T: validator::Validate> NativeValidator<T> {
    /// Wrap a value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            passed: None,
            errors: MessageBag::new(),
        }
    }

    /// Borrow the wrapped value.
    pub fn get_ref(&self) -> &T {
        &self.value
    }

    /// Replace the wrapped value, discarding any cached outcome.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
        self.passed = None;
        self.errors.clear();
    }

    /// Unwrap the value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: validator::Validate> Validatable for NativeValidator<T> {
    fn passes(&mut self) -> Result<bool> {
        self.errors = match validator::Validate::validate(&self.value) {
            Ok(()) => MessageBag::new(),
            Err(errors) => messages_from_validator(&errors),
        };
        let passed = self.errors.is_empty();
        self.passed = Some(passed);
        Ok(passed)
    }

    fn errors(&mut self) -> Result<&MessageBag> {
        if self.passed.is_none() {
            self.passes()?;
        }
        Ok(&self.errors)
    }

    fn name(&self) -> String {
        std::any::type_name::<T>().to_string()
    }
}

/// Convert `validator` errors into a message bag.
///
/// Nested structs use dotted paths (`address.city`) and lists use indexes
/// (`items[0].name`). Fields are ordered by path since `validator` keeps
/// them in a hash map.
pub fn messages_from_validator(errors: &ValidationErrors) -> MessageBag {
    let mut entries = Vec::new();
    collect(errors, None, &mut entries);
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut bag = MessageBag::new();
    for (field, messages) in entries {
        bag.add_all(field, messages);
    }
    bag
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<(String, Vec<String>)>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|error| {
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Validation failed for field '{}'", path))
                    })
                    .collect();
                out.push((path, messages));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}
