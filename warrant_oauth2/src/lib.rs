//! Negotiation of the OAuth2 scopes granted to a client
//!
//! This crate decides, for every authorization or token request, which scopes
//! a client is granted. The decision combines the client's own scope catalog
//! with the permissions a resource owner holds through their roles, and
//! rejects any request that asks for more than that. Scope tokens follow
//! [RFC 6749](https://datatracker.ietf.org/doc/html/rfc6749) and are compared
//! as opaque, case-sensitive strings.
//!
//! The central type is [`ScopeNegotiator`]. It is a pure decision over
//! already-resolved inputs: no I/O, no locking and no shared state. The
//! surrounding collaborators, such as a client registry or session lookup,
//! plug in through the traits in `warrant_traits`; [`ScopeEndpoint`] wires
//! them together.
//!
//! ```
//! use warrant_oauth2::{scope, AuthorizationRequest, Client, ClientId, Role, RoleId, ScopeNegotiator, User, UserId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientId::from_static("portal"))
//!     .with_scopes(scope!["read"])
//!     .with_user_permission_enhancement(true);
//! let user = User::new(UserId::from_static("jdoe"))
//!     .with_role(Role::new(RoleId::from_static("editor")).with_oauth_scopes(scope!["write"]));
//!
//! let request = AuthorizationRequest::new(scope!["read", "write"]);
//! let granted = ScopeNegotiator::new().negotiate(request, &client, Some(&user))?;
//! assert_eq!(granted.scopes, scope!["read", "write"]);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
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
#![deny(unsafe_code)]

#[macro_use]
pub mod scope;

mod endpoint;
mod error;
mod model;
mod negotiator;
mod permitted;
mod registry;

pub use endpoint::{EndpointError, ScopeEndpoint};
pub use error::{ErrorResponse, InvalidScope, INVALID_SCOPE};
pub use model::{
    AuthorizationRequest, Client, ClientId, ClientIdRef, Role, RoleId, RoleIdRef, User, UserId,
    UserIdRef,
};
pub use negotiator::ScopeNegotiator;
pub use permitted::PermittedScopes;
pub use registry::ClientMap;
pub use scope::{InvalidScopeToken, Scope, ScopeToken, ScopeTokenRef};
