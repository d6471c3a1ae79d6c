use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::client_repository::ClientRepository;
use crate::core::{AppError, Result};
use crate::modules::clients::models::{Client, ClientFilter, ClientPage};

/// Process-local client store
#[derive(Debug, Default)]
pub struct InMemoryClientRepository {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_search(client: &Client, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || client.name.to_lowercase().contains(&needle)
        || client
            .email
            .as_deref()
            .map_or(false, |e| e.to_lowercase().contains(&needle))
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn create(&self, client: &Client) -> Result<Client> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.id) {
            return Err(AppError::conflict("Client already exists"));
        }
        clients.insert(client.id.clone(), client.clone());
        Ok(client.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>> {
        Ok(self.clients.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, user_id: &str, name: &str) -> Result<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients
            .values()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }

    async fn list(&self, user_id: &str, filter: &ClientFilter) -> Result<ClientPage> {
        let clients = self.clients.read().await;

        let mut matching: Vec<&Client> = clients
            .values()
            .filter(|c| c.user_id == user_id)
            .filter(|c| {
                filter
                    .search
                    .as_deref()
                    .map_or(true, |search| matches_search(c, search))
            })
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let clients = matching
            .into_iter()
            .skip(filter.effective_offset() as usize)
            .take(filter.effective_limit() as usize)
            .cloned()
            .collect();

        Ok(ClientPage { clients, total })
    }

    async fn update(&self, client: &Client) -> Result<Client> {
        let mut clients = self.clients.write().await;
        match clients.get_mut(&client.id) {
            Some(stored) => {
                *stored = client.clone();
                Ok(client.clone())
            }
            None => Err(AppError::not_found("Client")),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.clients.write().await.remove(id).is_some())
    }
}
