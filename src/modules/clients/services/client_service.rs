use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::core::validation::{normalize_optional, normalize_patch};
use crate::core::{AppError, Clock, Result};
use crate::modules::clients::models::{Client, ClientFilter, ClientForm, ClientPage, ClientPatch};
use crate::modules::clients::repositories::ClientRepository;

/// Default and ceiling for typeahead search results
pub const SEARCH_DEFAULT_LIMIT: i64 = 10;
pub const SEARCH_MAX_LIMIT: i64 = 50;

pub struct ClientService {
    repository: Arc<dyn ClientRepository>,
    clock: Arc<dyn Clock>,
}

impl ClientService {
    pub fn new(repository: Arc<dyn ClientRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn create(&self, user_id: &str, form: ClientForm) -> Result<Client> {
        form.validate()?;

        let now = self.clock.now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: form.name.trim().to_string(),
            email: normalize_optional(form.email),
            phone: normalize_optional(form.phone),
            address: normalize_optional(form.address),
            city: normalize_optional(form.city),
            country: normalize_optional(form.country),
            postal_code: normalize_optional(form.postal_code),
            tax_id: normalize_optional(form.tax_id),
            notes: normalize_optional(form.notes),
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(&client).await?;
        info!(client_id = %created.id, user_id = %user_id, "Client created");

        Ok(created)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Client> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Client"))
    }

    pub async fn list(&self, user_id: &str, filter: &ClientFilter) -> Result<ClientPage> {
        self.repository.list(user_id, filter).await
    }

    /// Typeahead lookup by name or email
    pub async fn search(&self, user_id: &str, query: &str, limit: Option<i64>) -> Result<Vec<Client>> {
        let filter = ClientFilter {
            search: Some(query.to_string()),
            limit: Some(
                limit
                    .unwrap_or(SEARCH_DEFAULT_LIMIT)
                    .clamp(1, SEARCH_MAX_LIMIT),
            ),
            offset: None,
        };

        Ok(self.repository.list(user_id, &filter).await?.clients)
    }

    pub async fn update(&self, id: &str, patch: ClientPatch) -> Result<Client> {
        patch.validate()?;

        let mut client = self.get_by_id(id).await?;

        if let Some(name) = patch.name {
            client.name = name.trim().to_string();
        }
        if let Some(email) = normalize_patch(patch.email) {
            client.email = email;
        }
        if let Some(phone) = normalize_patch(patch.phone) {
            client.phone = phone;
        }
        if let Some(address) = normalize_patch(patch.address) {
            client.address = address;
        }
        if let Some(city) = normalize_patch(patch.city) {
            client.city = city;
        }
        if let Some(country) = normalize_patch(patch.country) {
            client.country = country;
        }
        if let Some(postal_code) = normalize_patch(patch.postal_code) {
            client.postal_code = postal_code;
        }
        if let Some(tax_id) = normalize_patch(patch.tax_id) {
            client.tax_id = tax_id;
        }
        if let Some(notes) = normalize_patch(patch.notes) {
            client.notes = notes;
        }

        client.updated_at = self.clock.now();
        self.repository.update(&client).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found("Client"));
        }

        info!(client_id = %id, "Client deleted");
        Ok(())
    }

    /// Reuse the user's client with exactly this name, or save a new one
    pub async fn get_or_create(&self, user_id: &str, form: ClientForm) -> Result<Client> {
        form.validate()?;

        if let Some(existing) = self
            .repository
            .find_by_name(user_id, form.name.trim())
            .await?
        {
            return Ok(existing);
        }

        self.create(user_id, form).await
    }
}
