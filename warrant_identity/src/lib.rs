//! Claim and role mapping for identities resolved from identity stores
//!
//! An identity store hands back a user as a bag of raw attributes. This
//! crate turns those attributes into a [`Profile`]: the subject identifier,
//! the OpenID Connect claims to expose, and the roles to assign. How claims
//! are derived is a [`ClaimMapper`] capability chosen by configuration.
//!
//! ```
//! use warrant_identity::{AuthenticationContext, ClaimMapperConfig, Profile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mapper = ClaimMapperConfig::default().build();
//! let raw = serde_json::json!({
//!     "_id": "5f2b",
//!     "username": "jdoe",
//!     "password": "$2a$10$...",
//!     "email": "jdoe@example.com",
//! });
//!
//! let profile = Profile::from_attributes(
//!     &AuthenticationContext::default(),
//!     raw.as_object().cloned().unwrap_or_default(),
//!     &mapper,
//!     None,
//! )?;
//!
//! assert_eq!(profile.id(), "5f2b");
//! assert_eq!(profile.claims()["email"], "jdoe@example.com");
//! assert!(profile.claims().get("password").is_none());
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_must_use
)]
#![forbid(unsafe_code)]

mod context;
mod mapper;
mod profile;
mod role;

pub use context::AuthenticationContext;
pub use mapper::{
    AttributeMapper, ClaimMapper, ClaimMapperConfig, ConfiguredClaimMapper,
    ReservedAttributeMapper,
};
pub use profile::{Profile, ProfileError};
pub use role::{InvalidRoleRule, RoleMapper, RoleRule};

/// Raw attributes of a user, as returned by an identity store
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Claims exposed for a user
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Standard OpenID Connect claim names
pub mod claims {
    /// Subject identifier
    pub const SUB: &str = "sub";
    /// Shorthand name the user wishes to be referred to as
    pub const PREFERRED_USERNAME: &str = "preferred_username";
    /// Time the user's information was last updated
    pub const UPDATED_AT: &str = "updated_at";
}
