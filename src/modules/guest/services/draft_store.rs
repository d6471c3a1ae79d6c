use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use crate::core::Clock;
use crate::modules::guest::models::{GuestDraftState, GuestDraftStatus, GuestInvoice};

/// Storage key the browser keeps the draft under
pub const GUEST_DRAFT_KEY: &str = "guest_invoice_v1";

/// String key/value slot with browser local-storage semantics
pub trait DraftStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: String);

    fn remove_item(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStorage {
    items: HashMap<String, String>,
}

impl MemoryDraftStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStorage for MemoryDraftStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// The single guest draft held by one device.
///
/// Unreadable or expired entries behave as if nothing was stored; expired
/// entries are removed on read.
pub struct GuestDraftStore<S: DraftStorage> {
    storage: S,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<S: DraftStorage> GuestDraftStore<S> {
    pub fn new(storage: S, clock: Arc<dyn Clock>, ttl_days: u32) -> Self {
        Self {
            storage,
            clock,
            ttl: Duration::days(i64::from(ttl_days)),
        }
    }

    pub fn load(&mut self) -> Option<GuestDraftState> {
        let raw = self.storage.get_item(GUEST_DRAFT_KEY)?;

        let state: GuestDraftState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable guest draft");
                return None;
            }
        };

        if self.clock.now() - state.created_at > self.ttl {
            debug!(invoice_id = %state.invoice_id, "Guest draft expired");
            self.clear();
            return None;
        }

        Some(state)
    }

    /// Store the latest invoice content. The first save pins the creation
    /// time, invoice id, fingerprint and PDF flags; later saves only replace
    /// the invoice and status.
    pub fn save(
        &mut self,
        invoice: GuestInvoice,
        invoice_id: &str,
        fingerprint: &str,
        status: GuestDraftStatus,
    ) -> GuestDraftState {
        let existing = self.load();

        let state = match existing {
            Some(existing) => GuestDraftState {
                status,
                invoice,
                ..existing
            },
            None => GuestDraftState {
                version: GuestDraftState::VERSION,
                created_at: self.clock.now(),
                invoice_id: invoice_id.to_string(),
                status,
                attempt_fingerprint: fingerprint.to_string(),
                invoice,
                pdf_generated: false,
                pdf_generated_at: None,
            },
        };

        self.write(&state);
        state
    }

    /// Completes the draft. No-op when nothing is stored.
    pub fn mark_pdf_generated(&mut self) -> Option<GuestDraftState> {
        let mut state = self.load()?;

        state.status = GuestDraftStatus::Completed;
        state.pdf_generated = true;
        state.pdf_generated_at = Some(self.clock.now());

        self.write(&state);
        Some(state)
    }

    pub fn clear(&mut self) {
        self.storage.remove_item(GUEST_DRAFT_KEY);
    }

    /// True once this device has generated its one guest PDF
    pub fn has_used_guest_invoice(&mut self) -> bool {
        self.load().is_some_and(|state| state.pdf_generated)
    }

    pub fn invoice_id(&mut self) -> Option<String> {
        self.load().map(|state| state.invoice_id)
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn write(&mut self, state: &GuestDraftState) {
        match serde_json::to_string(state) {
            Ok(raw) => self.storage.set_item(GUEST_DRAFT_KEY, raw),
            Err(e) => warn!(error = %e, "Failed to serialize guest draft"),
        }
    }
}
