mod client;

pub use client::{Client, ClientFilter, ClientForm, ClientPage, ClientPatch};
