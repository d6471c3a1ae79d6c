// Profiles module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{NewInvoiceDefaults, Profile};
pub use repositories::ProfileRepository;
pub use services::ProfileService;
