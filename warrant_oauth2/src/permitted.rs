use warrant_traits::Policy;

use crate::{
    error::InvalidScope,
    model::{Client, User},
    scope::Scope,
};

/// The scopes a client may request on behalf of a user for a single request
///
/// This is the client's own catalog, widened by every scope granted through
/// the user's roles when the client enables enhancement with user permissions
/// and a user has been authenticated. Without both, the user's roles have no
/// effect.
///
/// # Examples
///
/// ```
/// use warrant_oauth2::{scope, Client, ClientId, PermittedScopes, Role, RoleId, User, UserId};
/// use warrant_traits::Policy;
///
/// let client = Client::new(ClientId::from_static("portal"))
///     .with_scopes(scope!["read"])
///     .with_user_permission_enhancement(true);
/// let user = User::new(UserId::from_static("jdoe"))
///     .with_role(Role::new(RoleId::from_static("editor")).with_oauth_scopes(scope!["write"]));
///
/// let permitted = PermittedScopes::for_request(&client, Some(&user));
/// assert!(permitted.evaluate(&scope!["read", "write"]).is_ok());
/// assert!(permitted.evaluate(&scope!["admin"]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct PermittedScopes {
    scope: Scope,
}

impl PermittedScopes {
    /// Aggregates the permitted scopes for a client and an optional user
    pub fn for_request(client: &Client, user: Option<&User>) -> Self {
        let mut scope = client.scope();

        match user {
            Some(user) if client.enhances_scopes_with_user_permissions() => {
                for role in user.roles_permissions() {
                    scope.extend(role.oauth_scopes().iter().cloned());
                }
            }
            _ => {}
        }

        Self { scope }
    }

    /// The aggregated scope
    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Unwraps the aggregated scope
    #[inline]
    pub fn into_scope(self) -> Scope {
        self.scope
    }
}

impl Policy for PermittedScopes {
    type Request = Scope;
    type Denial = InvalidScope;

    /// Accepts the requested scope only if every token is permitted
    ///
    /// The denial names the first token, in lexicographic order, that is not
    /// permitted.
    fn evaluate(&self, requested: &Scope) -> Result<(), InvalidScope> {
        match requested.first_missing_from(&self.scope) {
            Some(token) => Err(InvalidScope::new(token.to_owned())),
            None => Ok(()),
        }
    }
}
