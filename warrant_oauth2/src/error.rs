use serde::Serialize;
use thiserror::Error;

use crate::scope::{ScopeToken, ScopeTokenRef};

/// The OAuth2 error code for a request asking for scopes it may not hold
pub const INVALID_SCOPE: &str = "invalid_scope";

/// Indicates that a requested scope lies outside of the scopes the client
/// is permitted to request
///
/// Negotiation is deterministic, so retrying a request that failed with this
/// error will fail the same way. Callers should reject the request with the
/// OAuth2 `invalid_scope` error, see [`InvalidScope::error_response`].
#[derive(Clone, Debug, Hash, Eq, PartialEq, Error)]
#[error("invalid scope: {scope}")]
pub struct InvalidScope {
    scope: ScopeToken,
}

impl InvalidScope {
    /// Constructs an error for the offending scope token
    #[inline]
    pub fn new(scope: ScopeToken) -> Self {
        Self { scope }
    }

    /// The requested scope token that is not permitted
    #[inline]
    pub fn scope(&self) -> &ScopeTokenRef {
        &self.scope
    }

    /// The OAuth2 error code this error maps to
    #[inline]
    pub const fn error_code(&self) -> &'static str {
        INVALID_SCOPE
    }

    /// A human-readable description naming the offending scope
    pub fn description(&self) -> String {
        format!("Invalid scope(s): {}", self.scope)
    }

    /// The body of the OAuth2 error response for this rejection
    pub fn error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code(),
            error_description: Some(self.description()),
        }
    }
}

impl From<InvalidScope> for ScopeToken {
    #[inline]
    fn from(err: InvalidScope) -> Self {
        err.scope
    }
}

/// The body of an OAuth2 error response
///
/// See [RFC 6749, Section 4.1.2.1](https://datatracker.ietf.org/doc/html/rfc6749#section-4.1.2.1).
/// Rendering the body onto a redirect or an HTTP response is left to the
/// caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// The error code
    pub error: &'static str,

    /// A human-readable explanation of the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}
