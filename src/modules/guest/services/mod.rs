pub mod draft_store;
pub mod guest_service;

pub use draft_store::{DraftStorage, GuestDraftStore, MemoryDraftStorage, GUEST_DRAFT_KEY};
pub use guest_service::{fingerprint, generate_invoice_id, guest_totals, GuestPreview, GuestService};
