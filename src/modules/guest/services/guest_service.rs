use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::core::currency::format_cents;
use crate::core::{Clock, Result};
use crate::modules::guest::models::{GuestInvoice, GuestInvoiceForm, GuestLineItem};
use crate::modules::guest::services::draft_store::{DraftStorage, GuestDraftStore};
use crate::modules::invoices::models::DiscountType;
use crate::modules::invoices::services::{InvoiceCalculator, InvoiceTotals};

/// Anonymous device identifier: SHA-256 hex of the `|`-joined components
pub fn fingerprint<S: AsRef<str>>(components: &[S]) -> String {
    let joined = components
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|");
    hex::encode(Sha256::digest(joined.as_bytes()))
}

pub fn generate_invoice_id() -> String {
    Uuid::new_v4().to_string()
}

/// Guest totals use the signed-in formula with no discount
pub fn guest_totals(items: &[GuestLineItem], tax_rate: Decimal) -> InvoiceTotals {
    InvoiceCalculator::invoice_totals(items, tax_rate, DiscountType::Fixed, Decimal::ZERO)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestPreview {
    pub invoice_id: String,
    pub invoice: GuestInvoice,
    pub totals: InvoiceTotals,
    pub formatted_total: String,
}

pub struct GuestService {
    clock: Arc<dyn Clock>,
    draft_ttl_days: u32,
}

impl GuestService {
    pub fn new(clock: Arc<dyn Clock>, draft_ttl_days: u32) -> Self {
        Self {
            clock,
            draft_ttl_days,
        }
    }

    /// Validate a guest form and price it. Keeps a client-supplied invoice id
    /// so repeated previews of one draft share a number.
    pub fn preview(&self, form: GuestInvoiceForm, invoice_id: Option<String>) -> Result<GuestPreview> {
        form.validate()?;

        let invoice_id = invoice_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_invoice_id);
        let invoice = GuestInvoice::from_form(form, &invoice_id, self.clock.today());
        let totals = guest_totals(&invoice.items, invoice.tax_rate);

        debug!(
            invoice_id = %invoice_id,
            total_cents = totals.total_cents,
            "Guest invoice priced"
        );

        Ok(GuestPreview {
            formatted_total: format_cents(totals.total_cents, &invoice.currency),
            invoice_id,
            invoice,
            totals,
        })
    }

    pub fn draft_store<S: DraftStorage>(&self, storage: S) -> GuestDraftStore<S> {
        GuestDraftStore::new(storage, self.clock.clone(), self.draft_ttl_days)
    }
}
