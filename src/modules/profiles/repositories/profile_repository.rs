use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::MySqlPool;
use tokio::sync::RwLock;

use crate::core::Result;
use crate::modules::profiles::models::Profile;

/// Storage collaborator for profiles, keyed by user id
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Insert or replace the whole row
    async fn upsert(&self, profile: &Profile) -> Result<Profile>;
}

/// MySQL-backed profile repository
pub struct MySqlProfileRepository {
    pool: MySqlPool,
}

impl MySqlProfileRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for MySqlProfileRepository {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, business_name, business_email, business_phone, business_address,
                   business_city, business_country, business_postal_code, tax_id,
                   tax_id_label, logo_url, default_currency, default_payment_terms,
                   default_tax_rate, default_notes, default_payment_instructions,
                   locale, date_format, created_at, updated_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert(&self, profile: &Profile) -> Result<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, business_name, business_email, business_phone, business_address,
                business_city, business_country, business_postal_code, tax_id,
                tax_id_label, logo_url, default_currency, default_payment_terms,
                default_tax_rate, default_notes, default_payment_instructions,
                locale, date_format, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                business_name = VALUES(business_name),
                business_email = VALUES(business_email),
                business_phone = VALUES(business_phone),
                business_address = VALUES(business_address),
                business_city = VALUES(business_city),
                business_country = VALUES(business_country),
                business_postal_code = VALUES(business_postal_code),
                tax_id = VALUES(tax_id),
                tax_id_label = VALUES(tax_id_label),
                logo_url = VALUES(logo_url),
                default_currency = VALUES(default_currency),
                default_payment_terms = VALUES(default_payment_terms),
                default_tax_rate = VALUES(default_tax_rate),
                default_notes = VALUES(default_notes),
                default_payment_instructions = VALUES(default_payment_instructions),
                locale = VALUES(locale),
                date_format = VALUES(date_format),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.business_name)
        .bind(&profile.business_email)
        .bind(&profile.business_phone)
        .bind(&profile.business_address)
        .bind(&profile.business_city)
        .bind(&profile.business_country)
        .bind(&profile.business_postal_code)
        .bind(&profile.tax_id)
        .bind(&profile.tax_id_label)
        .bind(&profile.logo_url)
        .bind(&profile.default_currency)
        .bind(profile.default_payment_terms)
        .bind(profile.default_tax_rate)
        .bind(&profile.default_notes)
        .bind(&profile.default_payment_instructions)
        .bind(&profile.locale)
        .bind(&profile.date_format)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(profile.clone())
    }
}

/// Process-local profile store
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, profile: &Profile) -> Result<Profile> {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(profile.clone())
    }
}
