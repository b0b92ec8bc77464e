use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    claims::{PREFERRED_USERNAME, SUB},
    AuthenticationContext, Attributes, ClaimMapper, Claims, RoleMapper,
};

const FIELD_ID: &str = "_id";
const FIELD_USERNAME: &str = "username";

/// Indicates that a profile could not be built from the raw attributes
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The identity store returned a user without a usable username
    #[error("user attributes carry no username")]
    MissingUsername,
}

/// An identity resolved from an identity store
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Profile {
    id: String,
    username: String,
    claims: Claims,
    roles: Vec<String>,
}

impl Profile {
    /// Builds a profile from the raw attributes of an identity-store user
    ///
    /// The identifier is taken from the `_id` attribute, falling back to the
    /// username. The `sub` and `preferred_username` claims are always set
    /// first; the claim mapper may add to them.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes carry no string `username`.
    pub fn from_attributes<M>(
        context: &AuthenticationContext,
        raw: Attributes,
        claim_mapper: &M,
        role_mapper: Option<&RoleMapper>,
    ) -> Result<Self, ProfileError>
    where
        M: ClaimMapper + ?Sized,
    {
        let username = match raw.get(FIELD_USERNAME) {
            Some(Value::String(username)) if !username.is_empty() => username.clone(),
            _ => return Err(ProfileError::MissingUsername),
        };

        let id = match raw.get(FIELD_ID) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => username.clone(),
        };

        let mut claims = Claims::new();
        claims.insert(SUB.to_owned(), Value::String(id.clone()));
        claims.insert(
            PREFERRED_USERNAME.to_owned(),
            Value::String(username.clone()),
        );
        claims.extend(claim_mapper.apply(context, &raw));

        let roles = role_mapper
            .map(|mapper| mapper.apply(&raw))
            .unwrap_or_default();

        tracing::trace!(
            user.id = %id,
            claims = claims.len(),
            roles = roles.len(),
            "profile resolved from identity store"
        );

        Ok(Self {
            id,
            username,
            claims,
            roles,
        })
    }

    /// The technical identifier of the user
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The username the user signed in with
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The claims exposed for the user
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The identifiers of the roles granted to the user
    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{AttributeMapper, ReservedAttributeMapper, RoleRule};

    fn raw(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn builds_profile_with_standard_claims() {
        let profile = Profile::from_attributes(
            &AuthenticationContext::default(),
            raw(json!({
                "_id": "5f2b",
                "username": "jdoe",
                "password": "hash",
                "given_name": "John",
            })),
            &ReservedAttributeMapper::default(),
            None,
        )
        .unwrap();

        assert_eq!(profile.id(), "5f2b");
        assert_eq!(profile.username(), "jdoe");
        assert_eq!(
            Value::Object(profile.claims().clone()),
            json!({
                "sub": "5f2b",
                "preferred_username": "jdoe",
                "given_name": "John",
            })
        );
        assert!(profile.roles().is_empty());
    }

    #[test]
    fn falls_back_to_username_as_identifier() {
        let profile = Profile::from_attributes(
            &AuthenticationContext::default(),
            raw(json!({ "username": "jdoe" })),
            &AttributeMapper::new(),
            None,
        )
        .unwrap();

        assert_eq!(profile.id(), "jdoe");
        assert_eq!(profile.claims()["sub"], "jdoe");
    }

    #[test]
    fn numeric_identifier_is_stringified() {
        let profile = Profile::from_attributes(
            &AuthenticationContext::default(),
            raw(json!({ "_id": 42, "username": "jdoe" })),
            &AttributeMapper::new(),
            None,
        )
        .unwrap();

        assert_eq!(profile.id(), "42");
    }

    #[test]
    fn missing_username_is_an_error() {
        let result = Profile::from_attributes(
            &AuthenticationContext::default(),
            raw(json!({ "_id": "5f2b", "username": 7 })),
            &ReservedAttributeMapper::default(),
            None,
        );

        assert!(matches!(result, Err(ProfileError::MissingUsername)));
    }

    #[test]
    fn assigns_mapped_roles() {
        let roles = RoleMapper::new().grant("admin", RoleRule::new("groups", "wheel"));
        let profile = Profile::from_attributes(
            &AuthenticationContext::default(),
            raw(json!({ "username": "root", "groups": ["wheel"] })),
            &AttributeMapper::new().map("groups", "groups"),
            Some(&roles),
        )
        .unwrap();

        assert_eq!(profile.roles(), vec!["admin".to_owned()]);
        assert_eq!(profile.claims()["groups"], json!(["wheel"]));
    }
}
