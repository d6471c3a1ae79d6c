pub mod clients;
pub mod guest;
pub mod health;
pub mod invoices;
pub mod profiles;
