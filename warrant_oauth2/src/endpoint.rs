use std::error::Error as StdError;

use thiserror::Error;
use warrant_traits::{Directory, Resolver};

use crate::{
    error::{ErrorResponse, InvalidScope},
    model::{AuthorizationRequest, Client, ClientId, ClientIdRef, User},
    negotiator::ScopeNegotiator,
};

/// Indicates that scope negotiation could not be carried out for a request
#[derive(Debug, Error)]
pub enum EndpointError<C, U> {
    /// No client is registered under the presented identifier
    #[error("unknown client: {0}")]
    UnknownClient(ClientId),
    /// The client directory could not be consulted
    #[error("client lookup failed")]
    ClientLookup(#[source] C),
    /// The authenticated user could not be resolved
    #[error("user resolution failed")]
    UserResolution(#[source] U),
    /// A requested scope is not permitted
    #[error(transparent)]
    InvalidScope(#[from] InvalidScope),
}

impl<C, U> EndpointError<C, U> {
    /// The OAuth2 error code the caller should respond with
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownClient(_) => "unauthorized_client",
            Self::ClientLookup(_) | Self::UserResolution(_) => "server_error",
            Self::InvalidScope(err) => err.error_code(),
        }
    }

    /// The body of the OAuth2 error response for this failure
    ///
    /// Collaborator failures are not described to the client.
    pub fn error_response(&self) -> ErrorResponse {
        match self {
            Self::InvalidScope(err) => err.error_response(),
            Self::UnknownClient(_) => ErrorResponse {
                error: self.error_code(),
                error_description: Some("Unknown client".to_owned()),
            },
            Self::ClientLookup(_) | Self::UserResolution(_) => ErrorResponse {
                error: self.error_code(),
                error_description: None,
            },
        }
    }
}

/// Drives scope negotiation for requests addressed by client identifier
///
/// The endpoint looks the client up in a [`Directory`], resolves the
/// authenticated user, if any, through a [`Resolver`], and then negotiates the
/// requested scopes. It renders nothing itself: every failure is returned
/// as an [`EndpointError`] for the caller to map onto its protocol response,
/// and the flow must not continue to consent or token issuance after one.
///
/// # Examples
///
/// ```
/// use std::convert::Infallible;
/// use warrant_oauth2::{scope, AuthorizationRequest, Client, ClientId, ClientIdRef, ClientMap, ScopeEndpoint, User};
/// use warrant_traits::Resolver;
///
/// struct NoSession;
///
/// impl Resolver for NoSession {
///     type Input = ();
///     type Subject = User;
///     type Error = Infallible;
///
///     fn resolve(&self, _: &()) -> Result<Option<User>, Infallible> {
///         Ok(None)
///     }
/// }
///
/// let clients = ClientMap::new();
/// clients.register(Client::new(ClientId::from_static("batch")).with_scopes(scope!["jobs:run"]));
///
/// let endpoint = ScopeEndpoint::new(clients, NoSession);
/// let mut request = AuthorizationRequest::default();
/// endpoint
///     .authorize(ClientIdRef::from_static("batch"), &mut request, &())
///     .unwrap();
/// assert_eq!(request.scopes, scope!["jobs:run"]);
/// ```
#[derive(Clone, Debug)]
pub struct ScopeEndpoint<C, U> {
    clients: C,
    users: U,
    negotiator: ScopeNegotiator,
}

impl<C, U> ScopeEndpoint<C, U>
where
    C: Directory<Key = ClientIdRef, Record = Client>,
    U: Resolver<Subject = User>,
{
    /// Constructs an endpoint from its collaborators
    pub fn new(clients: C, users: U) -> Self {
        Self {
            clients,
            users,
            negotiator: ScopeNegotiator::new(),
        }
    }

    /// Negotiates the scopes for a request presented by `client_id`
    ///
    /// On success the request carries the granted scope. On failure it is
    /// left as presented, so the caller can still reach its redirect URI to
    /// report the error.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is unknown, a collaborator fails, or a
    /// requested scope is not permitted.
    #[tracing::instrument(skip_all, fields(client.id = %client_id))]
    pub fn authorize(
        &self,
        client_id: &ClientIdRef,
        request: &mut AuthorizationRequest,
        input: &U::Input,
    ) -> Result<(), EndpointError<C::Error, U::Error>>
    where
        C::Error: StdError + 'static,
        U::Error: StdError + 'static,
    {
        let client = match self.clients.find(client_id) {
            Ok(Some(client)) => client,
            Ok(None) => {
                tracing::debug!("client is not registered");
                return Err(EndpointError::UnknownClient(client_id.to_owned()));
            }
            Err(err) => {
                let error: &(dyn StdError + 'static) = &err;
                tracing::warn!(error, "client lookup failed");
                return Err(EndpointError::ClientLookup(err));
            }
        };

        let user = match self.users.resolve(input) {
            Ok(user) => user,
            Err(err) => {
                let error: &(dyn StdError + 'static) = &err;
                tracing::warn!(error, "user resolution failed");
                return Err(EndpointError::UserResolution(err));
            }
        };

        self.negotiator
            .negotiate_in_place(request, &client, user.as_ref())?;

        tracing::trace!(granted = %request.scopes, "scope negotiated");
        Ok(())
    }
}
