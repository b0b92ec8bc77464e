use std::{collections::HashMap, convert::Infallible, iter::FromIterator, sync::Arc};

use arc_swap::ArcSwap;
use warrant_traits::Directory;

use crate::model::{Client, ClientId, ClientIdRef};

/// An in-memory registry of OAuth2 clients
///
/// Lookups read a consistent snapshot of the registry without blocking. The
/// registry can be replaced wholesale, for example after reloading client
/// configuration, while requests are being served.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ClientMap {
    clients: Arc<ArcSwap<HashMap<ClientId, Client>>>,
}

impl ClientMap {
    /// Constructs an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client, replacing any client registered under the same id
    ///
    /// Returns the previously registered client, if any.
    pub fn register(&self, client: Client) -> Option<Client> {
        let mut previous = None;
        self.clients.rcu(|current| {
            let mut next = HashMap::clone(current);
            previous = next.insert(client.id().to_owned(), client.clone());
            next
        });
        tracing::debug!(client.id = %client.id(), replaced = previous.is_some(), "client registered");
        previous
    }

    /// Removes the client registered under `id`
    pub fn unregister(&self, id: &ClientIdRef) -> Option<Client> {
        let mut removed = None;
        self.clients.rcu(|current| {
            let mut next = HashMap::clone(current);
            removed = next.remove(id);
            next
        });
        if removed.is_some() {
            tracing::debug!(client.id = %id, "client unregistered");
        }
        removed
    }

    /// Replaces every registered client at once
    pub fn replace_all<I>(&self, clients: I)
    where
        I: IntoIterator<Item = Client>,
    {
        let next: HashMap<ClientId, Client> = clients
            .into_iter()
            .map(|client| (client.id().to_owned(), client))
            .collect();
        let count = next.len();
        self.clients.store(Arc::new(next));
        tracing::info!(clients = count, "client registry replaced");
    }

    /// Looks up a client by its identifier
    pub fn get(&self, id: &ClientIdRef) -> Option<Client> {
        self.clients.load().get(id).cloned()
    }

    /// The number of registered clients
    pub fn len(&self) -> usize {
        self.clients.load().len()
    }

    /// Whether no client is registered
    pub fn is_empty(&self) -> bool {
        self.clients.load().is_empty()
    }
}

impl Directory for ClientMap {
    type Key = ClientIdRef;
    type Record = Client;
    type Error = Infallible;

    #[inline]
    fn find(&self, key: &ClientIdRef) -> Result<Option<Client>, Infallible> {
        Ok(self.get(key))
    }
}

impl FromIterator<Client> for ClientMap {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Client>,
    {
        let map = Self::new();
        map.replace_all(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &'static str, scopes: crate::Scope) -> Client {
        Client::new(ClientId::from_static(id)).with_scopes(scopes)
    }

    #[test]
    fn unknown_client_is_not_an_error() {
        let clients = ClientMap::new();
        let found = clients.find(ClientIdRef::from_static("nobody"));
        assert!(matches!(found, Ok(None)));
    }

    #[test]
    fn register_replaces_existing_client() {
        let clients = ClientMap::new();
        assert!(clients.register(client("app", scope!["read"])).is_none());

        let previous = clients.register(client("app", scope!["write"])).unwrap();
        assert_eq!(previous.scope(), scope!["read"]);

        let current = clients.get(ClientIdRef::from_static("app")).unwrap();
        assert_eq!(current.scope(), scope!["write"]);
        assert_eq!(clients.len(), 1);
    }

    #[test]
    fn unregister_removes_client() {
        let clients: ClientMap = vec![client("a", scope![]), client("b", scope![])]
            .into_iter()
            .collect();

        assert!(clients.unregister(ClientIdRef::from_static("a")).is_some());
        assert!(clients.unregister(ClientIdRef::from_static("a")).is_none());
        assert_eq!(clients.len(), 1);
    }

    #[test]
    fn clones_share_the_registry() {
        let clients = ClientMap::new();
        let reader = clients.clone();

        clients.replace_all(vec![client("app", scope!["read"])]);
        assert!(reader.get(ClientIdRef::from_static("app")).is_some());

        clients.replace_all(Vec::new());
        assert!(reader.is_empty());
    }

    #[test]
    fn loads_clients_from_configuration() -> Result<(), serde_json::Error> {
        let records: Vec<Client> = serde_json::from_str(
            r#"[
                { "id": "portal", "scopes": ["openid"] },
                { "id": "batch", "scopes": ["jobs:run"], "enhanceScopesWithUserPermissions": false }
            ]"#,
        )?;
        let clients: ClientMap = records.into_iter().collect();

        let batch = clients.find(ClientIdRef::from_static("batch")).unwrap().unwrap();
        assert_eq!(batch.scope(), scope!["jobs:run"]);
        Ok(())
    }

    #[test]
    fn non_rfc_scope_in_a_record_rejects_the_whole_load() {
        let records = serde_json::from_str::<Vec<Client>>(
            r#"[
                { "id": "portal", "scopes": ["openid"] },
                { "id": "legacy", "scopes": ["profil:écrire"] }
            ]"#,
        );
        assert!(records.is_err());
    }
}
