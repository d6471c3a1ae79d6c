use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Result};
use crate::modules::clients::models::{Client, ClientFilter, ClientPage};
use crate::modules::invoices::repositories::invoice_repository::map_insert_error;
use crate::modules::invoices::repositories::sanitize_search_query;

/// Storage collaborator for saved clients
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, client: &Client) -> Result<Client>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>>;

    /// Exact name match within one user's clients
    async fn find_by_name(&self, user_id: &str, name: &str) -> Result<Option<Client>>;

    /// Alphabetical by name
    async fn list(&self, user_id: &str, filter: &ClientFilter) -> Result<ClientPage>;

    async fn update(&self, client: &Client) -> Result<Client>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

const CLIENT_COLUMNS: &str = r#"
    id, user_id, name, email, phone, address, city, country,
    postal_code, tax_id, notes, created_at, updated_at
"#;

/// MySQL-backed client repository
pub struct MySqlClientRepository {
    pool: MySqlPool,
}

impl MySqlClientRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, MySql>, user_id: &str, filter: &ClientFilter) {
    builder.push(" WHERE user_id = ");
    builder.push_bind(user_id.to_string());

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", sanitize_search_query(search));
        builder.push(" AND (name LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl ClientRepository for MySqlClientRepository {
    async fn create(&self, client: &Client) -> Result<Client> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                id, user_id, name, email, phone, address, city, country,
                postal_code, tax_id, notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.id)
        .bind(&client.user_id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.city)
        .bind(&client.country)
        .bind(&client.postal_code)
        .bind(&client.tax_id)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "Client"))?;

        Ok(client.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>> {
        let sql = format!("SELECT {} FROM clients WHERE id = ?", CLIENT_COLUMNS);
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn find_by_name(&self, user_id: &str, name: &str) -> Result<Option<Client>> {
        let sql = format!(
            "SELECT {} FROM clients WHERE user_id = ? AND name = ? LIMIT 1",
            CLIENT_COLUMNS
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn list(&self, user_id: &str, filter: &ClientFilter) -> Result<ClientPage> {
        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM clients");
        push_filter(&mut count_query, user_id, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<MySql>::new(format!("SELECT {} FROM clients", CLIENT_COLUMNS));
        push_filter(&mut select, user_id, filter);
        select.push(" ORDER BY name ASC LIMIT ");
        select.push_bind(filter.effective_limit());
        select.push(" OFFSET ");
        select.push_bind(filter.effective_offset());

        let clients = select
            .build_query_as::<Client>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ClientPage { clients, total })
    }

    async fn update(&self, client: &Client) -> Result<Client> {
        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?, email = ?, phone = ?, address = ?, city = ?,
                country = ?, postal_code = ?, tax_id = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.city)
        .bind(&client.country)
        .bind(&client.postal_code)
        .bind(&client.tax_id)
        .bind(&client.notes)
        .bind(client.updated_at)
        .bind(&client.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Client"));
        }

        Ok(client.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
