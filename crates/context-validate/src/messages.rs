//! Field error messages collected from a validation run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered collection of error messages keyed by field name.
///
/// Fields keep the order in which they first received a message, and each
/// field keeps its messages in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBag {
    fields: IndexMap<String, Vec<String>>,
}

impl MessageBag {
    /// Create an empty message bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Add multiple messages for a field.
    pub fn add_all<I, S>(&mut self, field: impl Into<String>, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.fields.entry(field.into()).or_default();
        entry.extend(messages.into_iter().map(Into::into));
    }

    /// Merge another bag into this one.
    ///
    /// A field present in both bags takes the messages of `other`; the
    /// earlier messages for that field are dropped.
    pub fn merge(&mut self, other: MessageBag) {
        for (field, messages) in other.fields {
            self.fields.insert(field, messages);
        }
    }

    /// Get all messages for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Get the first message for a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Check whether a field has any messages.
    pub fn has(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .is_some_and(|messages| !messages.is_empty())
    }

    /// All messages, flattened in field order.
    pub fn all(&self) -> Vec<&str> {
        self.fields
            .values()
            .flat_map(|messages| messages.iter().map(String::as_str))
            .collect()
    }

    /// Field names that carry messages.
    pub fn fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Check if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Remove every message.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Convert to Result - Ok if empty, Err otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Consume the bag and return the underlying map.
    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.fields
    }

    /// Iterate over fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Convert to the standard RustAPI error body.
    pub fn to_api_error(&self) -> ApiValidationError {
        let fields = self
            .fields
            .iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |message| FieldMessage {
                    field: field.clone(),
                    message: message.clone(),
                })
            })
            .collect();

        ApiValidationError {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: "Validation failed".to_string(),
                fields,
            },
        }
    }
}

impl From<IndexMap<String, Vec<String>>> for MessageBag {
    fn from(fields: IndexMap<String, Vec<String>>) -> Self {
        Self { fields }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for MessageBag
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from(entries: [(K, V); N]) -> Self {
        let mut bag = Self::new();
        for (field, messages) in entries {
            bag.add_all(field, messages);
        }
        bag
    }
}

impl fmt::Display for MessageBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation message(s) on {} field(s)",
            self.len(),
            self.fields.len()
        )
    }
}

/// API response format for validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiValidationError {
    pub error: ErrorBody,
}

/// Error body in API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub fields: Vec<FieldMessage>,
}

/// Single field message in API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMessage {
    pub field: String,
    pub message: String,
}
