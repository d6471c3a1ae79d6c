// Saved billing contacts. Clients carry no money logic; they exist to
// pre-fill the client block of new invoices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::validation::{is_valid_email, Issues};
use crate::core::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Street, city, postal code and country on one line, skipping blanks
    pub fn full_address(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.address,
            &self.city,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientForm {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut issues = Issues::new();
        validate_name(&self.name, &mut issues);
        validate_email(self.email.as_deref(), &mut issues);
        issues.finish()
    }
}

/// Partial client update; an empty string clears an optional field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

impl ClientPatch {
    pub fn validate(&self) -> Result<()> {
        let mut issues = Issues::new();
        if let Some(name) = &self.name {
            validate_name(name, &mut issues);
        }
        validate_email(self.email.as_deref(), &mut issues);
        issues.finish()
    }
}

fn validate_name(name: &str, issues: &mut Issues) {
    issues.check(!name.trim().is_empty(), "name", "Client name is required");
}

fn validate_email(email: Option<&str>, issues: &mut Issues) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        issues.check(is_valid_email(email), "email", "Invalid email");
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientFilter {
    /// Substring of name or email
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ClientFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPage {
    pub clients: Vec<Client>,
    pub total: i64,
}
