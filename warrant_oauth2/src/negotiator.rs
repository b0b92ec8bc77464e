use warrant_traits::Policy;

use crate::{
    error::InvalidScope,
    model::{AuthorizationRequest, Client, User},
    permitted::PermittedScopes,
    scope::Scope,
};

/// Negotiates the scopes granted to a client for an authorization request
///
/// The negotiator holds no state. It can be shared freely between threads
/// and evaluated concurrently for any number of requests.
///
/// * A request without scopes is granted the client's own catalog. Scopes
///   derived from the user's roles are never added to it.
/// * A request with scopes is granted exactly the requested scopes, provided
///   each of them is in the client's catalog or, when the client enables
///   enhancement and a user is present, in one of the user's roles.
///
/// # Examples
///
/// ```
/// use warrant_oauth2::{scope, AuthorizationRequest, Client, ClientId, ScopeNegotiator};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let negotiator = ScopeNegotiator::new();
/// let client = Client::new(ClientId::from_static("portal"))
///     .with_scopes(scope!["openid", "profile"]);
///
/// let granted = negotiator.negotiate(AuthorizationRequest::default(), &client, None)?;
/// assert_eq!(granted.scopes, scope!["openid", "profile"]);
///
/// let rejected = negotiator.negotiate(AuthorizationRequest::new(scope!["admin"]), &client, None);
/// assert_eq!(rejected.unwrap_err().scope().as_str(), "admin");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct ScopeNegotiator {
    _priv: (),
}

impl ScopeNegotiator {
    /// Constructs a new scope negotiator
    #[inline]
    pub const fn new() -> Self {
        Self { _priv: () }
    }

    /// Decides the scope granted for the request without modifying it
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScope`] naming the first requested scope, in
    /// lexicographic order, that the client may not request.
    pub fn resolve(
        &self,
        request: &AuthorizationRequest,
        client: &Client,
        user: Option<&User>,
    ) -> Result<Scope, InvalidScope> {
        tracing::trace!(
            client.id = %client.id(),
            user.id = user.map(|u| u.id().as_str()),
            requested = %request.scopes,
            enhance = client.enhances_scopes_with_user_permissions(),
            "evaluating scope negotiation"
        );

        if request.scopes.is_empty() {
            let granted = client.scope();
            tracing::trace!(granted = %granted, "no scope requested; granting client catalog");
            return Ok(granted);
        }

        let permitted = PermittedScopes::for_request(client, user);
        if let Err(err) = permitted.evaluate(&request.scopes) {
            tracing::debug!(
                client.id = %client.id(),
                scope = %err.scope(),
                "requested scope is not permitted"
            );
            return Err(err);
        }

        Ok(request.scopes.clone())
    }

    /// Negotiates the request, returning it with its scopes replaced by the
    /// granted scope
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScope`] if any requested scope is not permitted.
    pub fn negotiate(
        &self,
        mut request: AuthorizationRequest,
        client: &Client,
        user: Option<&User>,
    ) -> Result<AuthorizationRequest, InvalidScope> {
        self.negotiate_in_place(&mut request, client, user)?;
        Ok(request)
    }

    /// Negotiates the request in place
    ///
    /// The request is only modified when negotiation succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScope`] if any requested scope is not permitted.
    pub fn negotiate_in_place(
        &self,
        request: &mut AuthorizationRequest,
        client: &Client,
        user: Option<&User>,
    ) -> Result<(), InvalidScope> {
        let granted = self.resolve(request, client, user)?;
        request.scopes = granted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientId, Role, RoleId, UserId};

    const REDIRECT_URI: &str = "http://localhost:8080/callback";

    fn request(scopes: Scope) -> AuthorizationRequest {
        AuthorizationRequest::new(scopes).with_redirect_uri(REDIRECT_URI)
    }

    fn client(scopes: Scope) -> Client {
        Client::new(ClientId::from_static("test-client")).with_scopes(scopes)
    }

    fn user_with_role(scopes: Scope) -> User {
        User::new(UserId::from_static("test-user"))
            .with_role(Role::new(RoleId::from_static("test-role")).with_oauth_scopes(scopes))
    }

    fn enhanced_client_and_user() -> (Client, User) {
        let client = client(scope!["read"]).with_user_permission_enhancement(true);
        let user = user_with_role(scope!["user1", "user2", "user3"]);
        (client, user)
    }

    #[test]
    fn rejects_unknown_scope_for_empty_catalog() {
        let err = ScopeNegotiator::new()
            .negotiate(request(scope!["read"]), &client(scope![]), None)
            .unwrap_err();
        assert_eq!(err.scope().as_str(), "read");
    }

    #[test]
    fn empty_request_on_empty_catalog_grants_nothing() {
        let granted = ScopeNegotiator::new()
            .negotiate(request(scope![]), &client(scope![]), None)
            .unwrap();
        assert!(granted.scopes.is_empty());
        assert_eq!(granted.redirect_uri.as_deref(), Some(REDIRECT_URI));
    }

    #[test]
    fn empty_request_grants_client_catalog() {
        let granted = ScopeNegotiator::new()
            .negotiate(request(scope![]), &client(scope!["read"]), None)
            .unwrap();
        assert_eq!(granted.scopes, scope!["read"]);
    }

    #[test]
    fn rejects_scope_outside_catalog() {
        let err = ScopeNegotiator::new()
            .negotiate(request(scope!["read"]), &client(scope!["write"]), None)
            .unwrap_err();
        assert_eq!(err.scope().as_str(), "read");
    }

    #[test]
    fn rejects_scope_outside_catalog_and_roles() {
        let client = client(scope!["write"]).with_user_permission_enhancement(true);
        let user = user_with_role(scope!["user"]);

        let err = ScopeNegotiator::new()
            .negotiate(request(scope!["read"]), &client, Some(&user))
            .unwrap_err();
        assert_eq!(err.scope().as_str(), "read");
    }

    #[test]
    fn grants_every_requested_user_permission() {
        let (client, user) = enhanced_client_and_user();

        let granted = ScopeNegotiator::new()
            .negotiate(
                request(scope!["read", "user1", "user2", "user3"]),
                &client,
                Some(&user),
            )
            .unwrap();
        assert_eq!(granted.scopes.len(), 4);
        assert_eq!(granted.scopes, scope!["read", "user1", "user2", "user3"]);
    }

    #[test]
    fn grants_only_the_requested_user_permission() {
        let (client, user) = enhanced_client_and_user();

        let granted = ScopeNegotiator::new()
            .negotiate(request(scope!["read", "user2"]), &client, Some(&user))
            .unwrap();
        assert_eq!(granted.scopes.len(), 2);
        assert_eq!(granted.scopes, scope!["read", "user2"]);
    }

    #[test]
    fn does_not_inject_unrequested_user_permissions() {
        let (client, user) = enhanced_client_and_user();

        let granted = ScopeNegotiator::new()
            .negotiate(request(scope!["read"]), &client, Some(&user))
            .unwrap();
        assert_eq!(granted.scopes.len(), 1);
        assert_eq!(granted.scopes, scope!["read"]);
    }

    #[test]
    fn empty_request_ignores_user_permissions() {
        let (client, user) = enhanced_client_and_user();

        let granted = ScopeNegotiator::new()
            .negotiate(request(scope![]), &client, Some(&user))
            .unwrap();
        assert_eq!(granted.scopes, scope!["read"]);
    }

    #[test]
    fn user_permissions_require_enhancement() {
        let client = client(scope!["read"]);
        let user = user_with_role(scope!["user1"]);

        let err = ScopeNegotiator::new()
            .negotiate(request(scope!["user1"]), &client, Some(&user))
            .unwrap_err();
        assert_eq!(err.scope().as_str(), "user1");
    }

    #[test]
    fn failed_negotiation_leaves_request_untouched() {
        let mut request = request(scope!["read", "write"]);
        let before = request.clone();

        let result =
            ScopeNegotiator::new().negotiate_in_place(&mut request, &client(scope!["read"]), None);
        assert_eq!(result.unwrap_err().scope().as_str(), "write");
        assert_eq!(request, before);
    }

    #[test]
    fn resolve_does_not_modify_request() {
        let (client, user) = enhanced_client_and_user();
        let request = request(scope![]);

        let granted = ScopeNegotiator::new()
            .resolve(&request, &client, Some(&user))
            .unwrap();
        assert_eq!(granted, scope!["read"]);
        assert!(request.scopes.is_empty());
    }

    #[test]
    fn negotiation_is_idempotent() {
        let (client, user) = enhanced_client_and_user();
        let negotiator = ScopeNegotiator::new();
        let cases = vec![
            scope![],
            scope!["read"],
            scope!["read", "user3"],
            scope!["user1", "admin"],
        ];

        for scopes in cases {
            let first = negotiator.resolve(&request(scopes.clone()), &client, Some(&user));
            let second = negotiator.resolve(&request(scopes), &client, Some(&user));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn granted_scope_is_never_a_superset_of_a_non_empty_request() {
        let (client, user) = enhanced_client_and_user();
        let negotiator = ScopeNegotiator::new();
        let cases = vec![
            scope!["read"],
            scope!["user1"],
            scope!["read", "user2", "user3"],
        ];

        for scopes in cases {
            let granted = negotiator
                .resolve(&request(scopes.clone()), &client, Some(&user))
                .unwrap();
            assert_eq!(granted, scopes);
        }
    }

    #[test]
    fn success_iff_requested_is_subset_of_permitted() {
        let (client, user) = enhanced_client_and_user();
        let permitted = PermittedScopes::for_request(&client, Some(&user));
        let negotiator = ScopeNegotiator::new();
        let cases = vec![
            scope!["read"],
            scope!["write"],
            scope!["user1", "user3"],
            scope!["user1", "user4"],
            scope!["READ"],
        ];

        for scopes in cases {
            let expected = permitted.scope().contains_all(&scopes);
            let outcome = negotiator.resolve(&request(scopes), &client, Some(&user));
            assert_eq!(outcome.is_ok(), expected);
        }
    }

    #[test]
    fn negotiator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScopeNegotiator>();
        assert_send_sync::<AuthorizationRequest>();
        assert_send_sync::<Client>();
        assert_send_sync::<User>();
    }
}
