//! Records an authorization decision is made over
//!
//! Clients, users and roles are owned by external directories and are
//! read-only here. They deserialize from the camel-cased records the gateway
//! stores, so a registry can be populated directly from configuration.

use aliri_braid::braid;
use serde::{Deserialize, Serialize};

use crate::scope::{Scope, ScopeToken};

/// The identifier of a registered OAuth2 client
#[braid(serde, ref_doc = "A borrowed reference to a [`ClientId`]")]
pub struct ClientId;

/// The identifier of an authenticated resource owner
#[braid(serde, ref_doc = "A borrowed reference to a [`UserId`]")]
pub struct UserId;

/// The identifier of a role
#[braid(serde, ref_doc = "A borrowed reference to a [`RoleId`]")]
pub struct RoleId;

/// An in-flight request to authorize a client
///
/// The redirect URI is carried along untouched; only the scopes take part in
/// negotiation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct AuthorizationRequest {
    /// The scopes requested by the client
    #[serde(default)]
    pub scopes: Scope,

    /// The redirect URI presented with the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl AuthorizationRequest {
    /// Constructs a request for the given scopes
    #[inline]
    pub fn new(scopes: Scope) -> Self {
        Self {
            scopes,
            redirect_uri: None,
        }
    }

    /// Attaches the redirect URI presented with the request
    #[inline]
    pub fn with_redirect_uri(self, redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: Some(redirect_uri.into()),
            ..self
        }
    }
}

/// A registered OAuth2 client application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct Client {
    id: ClientId,

    #[serde(default)]
    scopes: Vec<ScopeToken>,

    #[serde(default)]
    enhance_scopes_with_user_permissions: bool,
}

impl Client {
    /// Constructs a client with an empty scope catalog and no enhancement
    #[inline]
    pub fn new(id: ClientId) -> Self {
        Self {
            id,
            scopes: Vec::new(),
            enhance_scopes_with_user_permissions: false,
        }
    }

    /// Sets the catalog of scopes the client may request
    #[inline]
    pub fn with_scopes<I>(self, scopes: I) -> Self
    where
        I: IntoIterator<Item = ScopeToken>,
    {
        Self {
            scopes: scopes.into_iter().collect(),
            ..self
        }
    }

    /// Enables or disables widening the permitted scopes with the
    /// permissions held by the authenticated user
    #[inline]
    pub fn with_user_permission_enhancement(self, enabled: bool) -> Self {
        Self {
            enhance_scopes_with_user_permissions: enabled,
            ..self
        }
    }

    /// The client identifier
    #[inline]
    pub fn id(&self) -> &ClientIdRef {
        &self.id
    }

    /// The catalog of scopes the client may request, as registered
    #[inline]
    pub fn scopes(&self) -> &[ScopeToken] {
        &self.scopes
    }

    /// The catalog of scopes as a scope set
    #[inline]
    pub fn scope(&self) -> Scope {
        self.scopes.iter().cloned().collect()
    }

    /// Whether role-derived user permissions widen what this client may request
    #[inline]
    pub fn enhances_scopes_with_user_permissions(&self) -> bool {
        self.enhance_scopes_with_user_permissions
    }
}

/// A role assigned to a user, granting a set of OAuth2 scopes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct Role {
    id: RoleId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default)]
    oauth_scopes: Vec<ScopeToken>,
}

impl Role {
    /// Constructs a role granting no scopes
    #[inline]
    pub fn new(id: RoleId) -> Self {
        Self {
            id,
            name: None,
            oauth_scopes: Vec::new(),
        }
    }

    /// Sets a display name for the role
    #[inline]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the scopes granted by holding the role
    #[inline]
    pub fn with_oauth_scopes<I>(self, scopes: I) -> Self
    where
        I: IntoIterator<Item = ScopeToken>,
    {
        Self {
            oauth_scopes: scopes.into_iter().collect(),
            ..self
        }
    }

    /// The role identifier
    #[inline]
    pub fn id(&self) -> &RoleIdRef {
        &self.id
    }

    /// The display name of the role, if any
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The scopes granted by holding the role
    #[inline]
    pub fn oauth_scopes(&self) -> &[ScopeToken] {
        &self.oauth_scopes
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: UserId,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    roles_permissions: Vec<Role>,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        let mut user = User::new(dto.id);
        user.username = dto.username;
        for role in dto.roles_permissions {
            user.add_role(role);
        }
        user
    }
}

/// An authenticated resource owner
///
/// A user holds each role at most once; roles are identified by their
/// [`RoleId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UserDto")]
#[must_use]
pub struct User {
    id: UserId,

    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,

    roles_permissions: Vec<Role>,
}

impl User {
    /// Constructs a user holding no roles
    #[inline]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            username: None,
            roles_permissions: Vec::new(),
        }
    }

    /// Sets the username of the resource owner
    #[inline]
    pub fn with_username(self, username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..self
        }
    }

    /// Assigns an additional role
    #[inline]
    pub fn with_role(mut self, role: Role) -> Self {
        self.add_role(role);
        self
    }

    /// Assigns an additional role
    ///
    /// Returns `false` and leaves the user untouched if a role with the same
    /// identifier is already held.
    pub fn add_role(&mut self, role: Role) -> bool {
        if self.roles_permissions.iter().any(|r| r.id == role.id) {
            false
        } else {
            self.roles_permissions.push(role);
            true
        }
    }

    /// The user identifier
    #[inline]
    pub fn id(&self) -> &UserIdRef {
        &self.id
    }

    /// The username of the resource owner, if known
    #[inline]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The roles held by the user
    #[inline]
    pub fn roles_permissions(&self) -> &[Role] {
        &self.roles_permissions
    }

    /// Every scope granted through the roles the user holds
    pub fn role_scope(&self) -> Scope {
        self.roles_permissions
            .iter()
            .flat_map(|role| role.oauth_scopes.iter().cloned())
            .collect()
    }
}
