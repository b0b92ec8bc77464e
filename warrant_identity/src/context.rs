use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Attributes;

/// Context of the authentication attempt a user is being resolved for
///
/// Carries request-scoped attributes, such as the client the user is signing
/// in to, that mappers may take into account.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationContext {
    #[serde(default)]
    attributes: Attributes,
}

impl AuthenticationContext {
    /// Constructs a context carrying the given attributes
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    /// Adds an attribute to the context
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Looks up a context attribute
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// All context attributes
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
