pub mod client_repository;
pub mod in_memory;

pub use client_repository::{ClientRepository, MySqlClientRepository};
pub use in_memory::InMemoryClientRepository;
