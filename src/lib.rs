//! QuickBill invoicing library
//!
//! Invoice money math, lifecycle and numbering, plus the client, profile and
//! guest-mode services and the HTTP surface that exposes them.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

use std::sync::Arc;

use actix_web::web;

use crate::config::{Config, Storage};
use crate::core::Clock;
use crate::middleware::auth::{Authenticator, MySqlTokenAuthenticator};
use crate::modules::clients::repositories::{InMemoryClientRepository, MySqlClientRepository};
use crate::modules::invoices::models::InvoiceDefaults;
use crate::modules::invoices::repositories::{InMemoryInvoiceRepository, MySqlInvoiceRepository};
use crate::modules::profiles::repositories::{InMemoryProfileRepository, MySqlProfileRepository};

// Re-export commonly used types
pub use modules::clients::ClientService;
pub use modules::guest::GuestService;
pub use modules::invoices::InvoiceService;
pub use modules::profiles::ProfileService;

/// Shared services for one server process
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub invoices: Arc<InvoiceService>,
    pub clients: Arc<ClientService>,
    pub profiles: Arc<ProfileService>,
    pub guest: Arc<GuestService>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// MySQL-backed services with token lookup in `api_tokens`
    pub fn mysql(pool: sqlx::MySqlPool, clock: Arc<dyn Clock>, config: &Config) -> Self {
        let defaults = config.invoice_defaults();

        Self {
            invoices: Arc::new(InvoiceService::new(
                Arc::new(MySqlInvoiceRepository::new(pool.clone())),
                clock.clone(),
                defaults.clone(),
            )),
            clients: Arc::new(ClientService::new(
                Arc::new(MySqlClientRepository::new(pool.clone())),
                clock.clone(),
            )),
            profiles: Arc::new(ProfileService::new(
                Arc::new(MySqlProfileRepository::new(pool.clone())),
                clock.clone(),
                defaults,
            )),
            guest: Arc::new(GuestService::new(clock, config.invoicing.guest_draft_ttl_days)),
            authenticator: Arc::new(MySqlTokenAuthenticator::new(pool.clone())),
            storage: Storage::MySql(pool),
        }
    }

    /// Process-local services; used for local runs and tests
    pub fn in_memory(
        clock: Arc<dyn Clock>,
        defaults: InvoiceDefaults,
        guest_draft_ttl_days: u32,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            storage: Storage::Memory,
            invoices: Arc::new(InvoiceService::new(
                Arc::new(InMemoryInvoiceRepository::new()),
                clock.clone(),
                defaults.clone(),
            )),
            clients: Arc::new(ClientService::new(
                Arc::new(InMemoryClientRepository::new()),
                clock.clone(),
            )),
            profiles: Arc::new(ProfileService::new(
                Arc::new(InMemoryProfileRepository::new()),
                clock.clone(),
                defaults,
            )),
            guest: Arc::new(GuestService::new(clock, guest_draft_ttl_days)),
            authenticator,
        }
    }

    /// Register shared data and every route. Authentication is applied by
    /// wrapping the `App` in [`middleware::BearerAuth`].
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.storage.clone()))
            .app_data(web::Data::new(self.invoices.clone()))
            .app_data(web::Data::new(self.clients.clone()))
            .app_data(web::Data::new(self.profiles.clone()))
            .app_data(web::Data::new(self.guest.clone()))
            .configure(middleware::error_handler::configure)
            .configure(modules::health::controllers::configure)
            .configure(modules::invoices::controllers::configure)
            .configure(modules::clients::controllers::configure)
            .configure(modules::profiles::controllers::configure)
            .configure(modules::guest::controllers::configure);
    }
}
