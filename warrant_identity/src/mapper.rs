use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{claims, AuthenticationContext, Attributes, Claims};

const FIELD_ID: &str = "_id";
const FIELD_USERNAME: &str = "username";
const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_UPDATED_AT: &str = "updatedAt";

/// Translates the raw attributes of an identity-store user into claims
///
/// Implementations must not fail: attributes they cannot map are dropped.
pub trait ClaimMapper {
    /// Produces the claims for a user from its raw attributes
    fn apply(&self, context: &AuthenticationContext, raw: &Attributes) -> Claims;
}

impl<T> ClaimMapper for &'_ T
where
    T: ClaimMapper + ?Sized,
{
    #[inline]
    fn apply(&self, context: &AuthenticationContext, raw: &Attributes) -> Claims {
        T::apply(self, context, raw)
    }
}

impl<T> ClaimMapper for Box<T>
where
    T: ClaimMapper + ?Sized,
{
    #[inline]
    fn apply(&self, context: &AuthenticationContext, raw: &Attributes) -> Claims {
        T::apply(self, context, raw)
    }
}

/// Exposes every raw attribute as a claim, except the reserved ones
///
/// The identifier, username, creation time and password attributes never
/// become claims. The update time is exposed as the standard `updated_at`
/// claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedAttributeMapper {
    #[serde(default = "default_password_field")]
    password_field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_salt_attribute: Option<String>,
}

fn default_password_field() -> String {
    "password".to_owned()
}

impl Default for ReservedAttributeMapper {
    fn default() -> Self {
        Self {
            password_field: default_password_field(),
            password_salt_attribute: None,
        }
    }
}

impl ReservedAttributeMapper {
    /// Uses a custom attribute holding the password hash
    pub fn with_password_field(self, field: impl Into<String>) -> Self {
        Self {
            password_field: field.into(),
            ..self
        }
    }

    /// Declares a dedicated attribute holding the password salt
    pub fn with_password_salt_attribute(self, attribute: impl Into<String>) -> Self {
        Self {
            password_salt_attribute: Some(attribute.into()),
            ..self
        }
    }

    fn is_reserved(&self, attribute: &str) -> bool {
        attribute == FIELD_ID
            || attribute == FIELD_USERNAME
            || attribute == FIELD_CREATED_AT
            || attribute == self.password_field
            || self.password_salt_attribute.as_deref() == Some(attribute)
    }
}

impl ClaimMapper for ReservedAttributeMapper {
    fn apply(&self, _: &AuthenticationContext, raw: &Attributes) -> Claims {
        raw.iter()
            .filter(|(attribute, _)| !self.is_reserved(attribute))
            .map(|(attribute, value)| {
                let claim = if attribute == FIELD_UPDATED_AT {
                    claims::UPDATED_AT.to_owned()
                } else {
                    attribute.clone()
                };
                (claim, value.clone())
            })
            .collect()
    }
}

/// Exposes only explicitly mapped attributes, each under its claim name
///
/// Mapped attributes absent from the user are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMapper {
    /// Claim name to source attribute name
    #[serde(default)]
    mappings: BTreeMap<String, String>,
}

impl AttributeMapper {
    /// Constructs a mapper with no mappings
    pub fn new() -> Self {
        Self::default()
    }

    /// Exposes `attribute` as `claim`
    pub fn map(mut self, claim: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.mappings.insert(claim.into(), attribute.into());
        self
    }
}

impl ClaimMapper for AttributeMapper {
    fn apply(&self, _: &AuthenticationContext, raw: &Attributes) -> Claims {
        let mut claims = Claims::new();
        for (claim, attribute) in &self.mappings {
            match raw.get(attribute) {
                Some(value) => {
                    claims.insert(claim.clone(), value.clone());
                }
                None => tracing::trace!(%claim, %attribute, "mapped attribute is absent"),
            }
        }
        claims
    }
}

/// Configuration selecting how claims are derived for an identity store
///
/// ```
/// use warrant_identity::ClaimMapperConfig;
///
/// # fn main() -> Result<(), serde_json::Error> {
/// let config: ClaimMapperConfig = serde_json::from_str(r#"{
///     "type": "attributes",
///     "mappings": { "email": "mail", "name": "displayName" }
/// }"#)?;
/// assert!(matches!(config, ClaimMapperConfig::Attributes(_)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimMapperConfig {
    /// Expose all attributes except the reserved ones
    Reserved(ReservedAttributeMapper),
    /// Expose only the mapped attributes
    Attributes(AttributeMapper),
}

impl Default for ClaimMapperConfig {
    fn default() -> Self {
        Self::Reserved(ReservedAttributeMapper::default())
    }
}

impl ClaimMapperConfig {
    /// Builds the configured claim mapper
    pub fn build(self) -> ConfiguredClaimMapper {
        match self {
            Self::Reserved(mapper) => ConfiguredClaimMapper::Reserved(mapper),
            Self::Attributes(mapper) => ConfiguredClaimMapper::Attributes(mapper),
        }
    }
}

/// The claim mapper selected by a [`ClaimMapperConfig`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfiguredClaimMapper {
    /// See [`ReservedAttributeMapper`]
    Reserved(ReservedAttributeMapper),
    /// See [`AttributeMapper`]
    Attributes(AttributeMapper),
}

impl ClaimMapper for ConfiguredClaimMapper {
    fn apply(&self, context: &AuthenticationContext, raw: &Attributes) -> Claims {
        match self {
            Self::Reserved(mapper) => mapper.apply(context, raw),
            Self::Attributes(mapper) => mapper.apply(context, raw),
        }
    }
}
