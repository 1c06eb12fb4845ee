//! Combining several validators into one outcome.

use crate::error::{ContextError, Result};
use crate::messages::MessageBag;
use crate::traits::Validatable;
use std::fmt;

/// Runs a collection of validators and merges their error messages.
///
/// Every validator runs on each call to [`passes`](Validatable::passes), even
/// after an earlier one has failed, so the combined bag holds every failure.
/// When two validators report the same field, the later validator's messages
/// replace the earlier ones.
///
/// ## Example
///
/// ```rust,ignore
/// use context_validate::prelude::*;
///
/// let mut all = ValidatorAggregator::new();
/// all.add_validator(user_validator)
///     .add_validator(NativeValidator::new(address));
///
/// if all.fails()? {
///     println!("{:?}", all.errors()?);
/// }
/// ```
#[derive(Default)]
pub struct ValidatorAggregator {
    validators: Vec<Box<dyn Validatable + Send>>,
    errors: MessageBag,
}

impl ValidatorAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator over an existing collection.
    pub fn with_validators<I>(validators: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Validatable + Send>>,
    {
        Self {
            validators: validators.into_iter().collect(),
            errors: MessageBag::new(),
        }
    }

    /// Add a validator.
    pub fn add_validator<V>(&mut self, validator: V) -> &mut Self
    where
        V: Validatable + Send + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Add several validators at once.
    pub fn add_validators<I>(&mut self, validators: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn Validatable + Send>>,
    {
        self.validators.extend(validators);
        self
    }

    /// Number of validators added.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check whether no validators were added.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl From<Vec<Box<dyn Validatable + Send>>> for ValidatorAggregator {
    fn from(validators: Vec<Box<dyn Validatable + Send>>) -> Self {
        Self::with_validators(validators)
    }
}

impl Validatable for ValidatorAggregator {
    fn passes(&mut self) -> Result<bool> {
        if self.validators.is_empty() {
            tracing::warn!("aggregator has no validators");
            return Err(ContextError::NoValidators);
        }

        let mut combined = MessageBag::new();
        let mut failed = 0usize;

        for validator in &mut self.validators {
            if validator.passes()? {
                continue;
            }
            failed += 1;
            combined.merge(validator.errors()?.clone());
        }

        tracing::debug!(
            validators = self.validators.len(),
            failed,
            errors = combined.len(),
            "aggregated validation finished"
        );

        self.errors = combined;
        Ok(failed == 0)
    }

    fn errors(&mut self) -> Result<&MessageBag> {
        Ok(&self.errors)
    }

    fn name(&self) -> String {
        let names: Vec<String> = self.validators.iter().map(|v| v.name()).collect();
        format!("ValidatorAggregator[{}]", names.join(", "))
    }
}

impl fmt::Debug for ValidatorAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.validators.iter().map(|v| v.name()).collect();
        f.debug_struct("ValidatorAggregator")
            .field("validators", &names)
            .field("errors", &self.errors)
            .finish()
    }
}
