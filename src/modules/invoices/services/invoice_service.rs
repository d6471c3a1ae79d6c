use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::calculator::InvoiceCalculator;
use super::numbering;
use super::status;
use crate::core::validation::{normalize_optional, normalize_patch};
use crate::core::{AppError, Clock, Result};
use crate::modules::invoices::models::{
    check_discount, parse_date, Invoice, InvoiceDefaults, InvoiceFilter, InvoiceForm,
    InvoicePage, InvoicePatch, InvoiceStatus, InvoiceView, LineItem,
};
use crate::modules::invoices::repositories::InvoiceRepository;

/// Invoice aggregate operations
///
/// Ownership is not checked here; controllers compare `invoice.user_id`
/// with the caller before calling in.
pub struct InvoiceService {
    repository: Arc<dyn InvoiceRepository>,
    clock: Arc<dyn Clock>,
    defaults: InvoiceDefaults,
}

impl InvoiceService {
    pub fn new(
        repository: Arc<dyn InvoiceRepository>,
        clock: Arc<dyn Clock>,
        defaults: InvoiceDefaults,
    ) -> Self {
        Self {
            repository,
            clock,
            defaults,
        }
    }

    pub fn defaults(&self) -> &InvoiceDefaults {
        &self.defaults
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Next `INV-{year}-{seq}` for the user
    pub async fn next_invoice_number(&self, user_id: &str) -> Result<String> {
        numbering::next_invoice_number(self.repository.as_ref(), self.clock.as_ref(), user_id)
            .await
    }

    /// Create a draft invoice from form input
    pub async fn create(
        &self,
        user_id: &str,
        invoice_number: &str,
        form: InvoiceForm,
    ) -> Result<Invoice> {
        form.validate()?;

        let due_date = form
            .parsed_due_date()
            .ok_or_else(|| AppError::validation("Invalid due date"))?;
        let items = LineItem::from_forms(&form.items);
        let totals = InvoiceCalculator::invoice_totals(
            &form.items,
            form.tax_rate,
            form.discount_type,
            form.discount_value,
        );

        let now = self.clock.now();
        let public_id = Uuid::new_v4().simple().to_string();

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            client_id: normalize_optional(form.client_id),
            invoice_number: invoice_number.to_string(),
            status: InvoiceStatus::Draft,
            client_name: form.client_name,
            client_email: normalize_optional(form.client_email),
            client_phone: normalize_optional(form.client_phone),
            client_address: normalize_optional(form.client_address),
            client_tax_id: normalize_optional(form.client_tax_id),
            items,
            subtotal_cents: totals.subtotal_cents,
            discount_cents: totals.discount_cents,
            discount_type: form.discount_type,
            discount_value: form.discount_value,
            tax_rate: form.tax_rate,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
            currency: form.currency.to_uppercase(),
            issue_date: self.clock.today(),
            due_date: Some(due_date),
            sent_date: None,
            viewed_date: None,
            paid_date: None,
            notes: normalize_optional(form.notes),
            payment_instructions: normalize_optional(form.payment_instructions),
            terms: None,
            footer: None,
            public_url: self.defaults.public_url_for(&public_id),
            public_id,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(&invoice).await?;

        info!(
            invoice_id = %created.id,
            user_id = %created.user_id,
            invoice_number = %created.invoice_number,
            total_cents = created.total_cents,
            "Invoice created"
        );

        Ok(created)
    }

    /// Create with the next number in the user's yearly sequence
    pub async fn create_next(&self, user_id: &str, form: InvoiceForm) -> Result<Invoice> {
        form.validate()?;
        let invoice_number = self.next_invoice_number(user_id).await?;
        self.create(user_id, &invoice_number, form).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Invoice> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice"))
    }

    pub async fn get_by_public_id(&self, public_id: &str) -> Result<Invoice> {
        self.repository
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice"))
    }

    pub async fn list(&self, user_id: &str, filter: &InvoiceFilter) -> Result<InvoicePage> {
        self.repository.list(user_id, filter).await
    }

    /// Apply a partial update. Totals are recomputed only when items, tax or
    /// discount fields are present; missing ones keep their stored values.
    pub async fn update(&self, id: &str, patch: InvoicePatch) -> Result<Invoice> {
        patch.validate()?;

        let mut invoice = self.get_by_id(id).await?;
        let recompute = patch.touches_totals();

        if let Some(client_id) = normalize_patch(patch.client_id) {
            invoice.client_id = client_id;
        }
        if let Some(name) = patch.client_name {
            invoice.client_name = name;
        }
        if let Some(email) = normalize_patch(patch.client_email) {
            invoice.client_email = email;
        }
        if let Some(phone) = normalize_patch(patch.client_phone) {
            invoice.client_phone = phone;
        }
        if let Some(address) = normalize_patch(patch.client_address) {
            invoice.client_address = address;
        }
        if let Some(tax_id) = normalize_patch(patch.client_tax_id) {
            invoice.client_tax_id = tax_id;
        }
        if let Some(notes) = normalize_patch(patch.notes) {
            invoice.notes = notes;
        }
        if let Some(instructions) = normalize_patch(patch.payment_instructions) {
            invoice.payment_instructions = instructions;
        }
        if let Some(due_date) = patch.due_date.as_deref().and_then(parse_date) {
            invoice.due_date = Some(due_date);
        }
        if let Some(currency) = patch.currency {
            invoice.currency = currency.to_uppercase();
        }

        if let Some(items) = patch.items {
            invoice.items = LineItem::from_forms(&items);
        }
        if let Some(tax_rate) = patch.tax_rate {
            invoice.tax_rate = tax_rate;
        }
        if let Some(discount_type) = patch.discount_type {
            invoice.discount_type = discount_type;
        }
        if let Some(discount_value) = patch.discount_value {
            invoice.discount_value = discount_value;
        }

        if recompute {
            check_discount(invoice.discount_type, invoice.discount_value)?;
            let subtotal_cents = invoice.items.iter().map(|i| i.amount_cents).sum();
            let totals = InvoiceCalculator::totals_for_subtotal(
                subtotal_cents,
                invoice.tax_rate,
                invoice.discount_type,
                invoice.discount_value,
            );
            invoice.subtotal_cents = totals.subtotal_cents;
            invoice.discount_cents = totals.discount_cents;
            invoice.tax_cents = totals.tax_cents;
            invoice.total_cents = totals.total_cents;
        }

        invoice.updated_at = self.clock.now();
        let updated = self.repository.update(&invoice).await?;

        debug!(invoice_id = %updated.id, recomputed = recompute, "Invoice updated");

        Ok(updated)
    }

    /// Set any status, stamping the matching lifecycle date
    pub async fn update_status(&self, id: &str, new_status: InvoiceStatus) -> Result<Invoice> {
        let mut invoice = self.get_by_id(id).await?;
        let previous = invoice.status;

        status::apply_status(&mut invoice, new_status, self.clock.now());
        let updated = self.repository.update(&invoice).await?;

        info!(
            invoice_id = %updated.id,
            from = %previous,
            to = %new_status,
            "Invoice status changed"
        );

        Ok(updated)
    }

    /// Record the first view of a sent invoice. Any other state is returned
    /// unchanged.
    pub async fn mark_as_viewed(&self, id: &str) -> Result<Invoice> {
        let invoice = self.get_by_id(id).await?;

        if !status::should_mark_viewed(&invoice) {
            return Ok(invoice);
        }

        self.update_status(id, InvoiceStatus::Viewed).await
    }

    /// Copy an invoice into a new draft under `invoice_number`.
    ///
    /// Totals are copied, not recomputed. The due date is always
    /// `duplicate_due_days` from today, whatever the source's terms were.
    pub async fn duplicate(
        &self,
        id: &str,
        user_id: &str,
        invoice_number: &str,
    ) -> Result<Invoice> {
        let source = self.get_by_id(id).await?;

        let now = self.clock.now();
        let today = self.clock.today();
        let public_id = Uuid::new_v4().simple().to_string();

        let items = source
            .items
            .iter()
            .map(|item| LineItem {
                id: Uuid::new_v4().to_string(),
                ..item.clone()
            })
            .collect();

        let copy = Invoice {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            invoice_number: invoice_number.to_string(),
            status: InvoiceStatus::Draft,
            items,
            issue_date: today,
            due_date: Some(today + Duration::days(i64::from(self.defaults.duplicate_due_days))),
            sent_date: None,
            viewed_date: None,
            paid_date: None,
            public_url: self.defaults.public_url_for(&public_id),
            public_id,
            created_at: now,
            updated_at: now,
            ..source
        };

        let created = self.repository.create(&copy).await?;

        info!(
            invoice_id = %created.id,
            source_id = %id,
            invoice_number = %created.invoice_number,
            "Invoice duplicated"
        );

        Ok(created)
    }

    /// Duplicate using the next number in the user's sequence
    pub async fn duplicate_next(&self, id: &str, user_id: &str) -> Result<Invoice> {
        let invoice_number = self.next_invoice_number(user_id).await?;
        self.duplicate(id, user_id, &invoice_number).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found("Invoice"));
        }

        info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Invoice with its read-time display status
    pub fn view(&self, invoice: Invoice) -> InvoiceView {
        status::view(invoice, self.clock.today())
    }

    /// Unauthenticated read by public id; counts as the client's view
    pub async fn view_public(&self, public_id: &str) -> Result<InvoiceView> {
        let invoice = self.get_by_public_id(public_id).await?;
        let invoice = if status::should_mark_viewed(&invoice) {
            self.mark_as_viewed(&invoice.id).await?
        } else {
            invoice
        };

        Ok(self.view(invoice))
    }
}
