mod profile;

pub use profile::{NewInvoiceDefaults, Profile, ProfileForm};
