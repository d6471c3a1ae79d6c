use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::{DatabaseConfig, Storage};
pub use server::ServerConfig;

use crate::modules::invoices::models::InvoiceDefaults;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub invoicing: InvoicingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// `json` switches the tracing formatter to JSON lines
    pub log_format: String,
    /// Base URL used to build public invoice links
    pub public_url: String,
    /// `mysql` (default) or `memory`
    pub storage: String,
}

/// Fallback defaults for composing invoices, before a profile overrides them
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingConfig {
    pub default_currency: String,
    pub default_payment_terms_days: u32,
    pub default_tax_rate: Decimal,
    pub duplicate_due_days: u32,
    pub guest_draft_ttl_days: u32,
}

impl InvoicingConfig {
    pub fn invoice_defaults(&self, public_url: &str) -> InvoiceDefaults {
        InvoiceDefaults {
            currency: self.default_currency.clone(),
            payment_terms_days: self.default_payment_terms_days,
            tax_rate: self.default_tax_rate,
            duplicate_due_days: self.duplicate_due_days,
            public_base_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                public_url: env::var("APP_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                storage: env::var("STORAGE").unwrap_or_else(|_| "mysql".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            invoicing: InvoicingConfig {
                default_currency: env::var("DEFAULT_CURRENCY")
                    .unwrap_or_else(|_| "USD".to_string()),
                default_payment_terms_days: parse_var("DEFAULT_PAYMENT_TERMS_DAYS", "30")?,
                default_tax_rate: env::var("DEFAULT_TAX_RATE")
                    .ok()
                    .map(|raw| {
                        Decimal::from_str(&raw).map_err(|_| {
                            AppError::Configuration("Invalid DEFAULT_TAX_RATE".to_string())
                        })
                    })
                    .transpose()?
                    .unwrap_or(Decimal::ZERO),
                duplicate_due_days: parse_var("DUPLICATE_DUE_DAYS", "30")?,
                guest_draft_ttl_days: parse_var("GUEST_DRAFT_TTL_DAYS", "7")?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.public_url.trim().is_empty() {
            return Err(AppError::Configuration("APP_URL cannot be empty".to_string()));
        }

        if self.app.storage != "mysql" && self.app.storage != "memory" {
            return Err(AppError::Configuration(format!(
                "Unknown STORAGE backend: {}",
                self.app.storage
            )));
        }

        if self.invoicing.default_currency.chars().count() != 3 {
            return Err(AppError::Configuration(
                "DEFAULT_CURRENCY must be 3 characters".to_string(),
            ));
        }

        if self.invoicing.default_tax_rate < Decimal::ZERO
            || self.invoicing.default_tax_rate > Decimal::ONE_HUNDRED
        {
            return Err(AppError::Configuration(
                "DEFAULT_TAX_RATE must be between 0 and 100".to_string(),
            ));
        }

        if self.invoicing.default_payment_terms_days > 365 {
            return Err(AppError::Configuration(
                "DEFAULT_PAYMENT_TERMS_DAYS cannot exceed 365".to_string(),
            ));
        }

        if self.invoicing.guest_draft_ttl_days == 0 {
            return Err(AppError::Configuration(
                "Guest draft TTL must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn invoice_defaults(&self) -> InvoiceDefaults {
        self.invoicing.invoice_defaults(&self.app.public_url)
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}
