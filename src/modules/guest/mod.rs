// Guest mode: anonymous single-invoice drafts priced like signed-in invoices

pub mod controllers;
pub mod models;
pub mod services;

pub use services::GuestService;
