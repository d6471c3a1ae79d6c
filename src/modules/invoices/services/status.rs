// Status resolution.
//
// Persisted status changes only through explicit transitions. `overdue` is
// computed here at read time and never written back.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::modules::invoices::models::{DisplayStatus, Invoice, InvoiceStatus, InvoiceView};

/// Past due and still awaiting payment
pub fn is_overdue(due_date: Option<NaiveDate>, status: InvoiceStatus, today: NaiveDate) -> bool {
    match due_date {
        None => false,
        Some(_) if matches!(status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) => false,
        Some(due) => due < today,
    }
}

/// Only `sent` invoices are promoted to `overdue`; a viewed invoice past its
/// due date still shows as viewed.
pub fn display_status(
    status: InvoiceStatus,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DisplayStatus {
    if status == InvoiceStatus::Sent && is_overdue(due_date, status, today) {
        DisplayStatus::Overdue
    } else {
        status.into()
    }
}

pub fn view(invoice: Invoice, today: NaiveDate) -> InvoiceView {
    let display_status = display_status(invoice.status, invoice.due_date, today);
    let is_overdue = is_overdue(invoice.due_date, invoice.status, today);

    InvoiceView {
        invoice,
        display_status,
        is_overdue,
    }
}

pub fn calculate_due_date(issue_date: NaiveDate, payment_terms_days: u32) -> NaiveDate {
    issue_date + Duration::days(i64::from(payment_terms_days))
}

/// Set `status` and stamp the matching lifecycle date.
///
/// Any status may follow any other. Dates are overwritten on a repeated
/// transition and never cleared.
pub fn apply_status(invoice: &mut Invoice, status: InvoiceStatus, now: DateTime<Utc>) {
    invoice.status = status;

    match status {
        InvoiceStatus::Sent => invoice.sent_date = Some(now),
        InvoiceStatus::Viewed => invoice.viewed_date = Some(now),
        InvoiceStatus::Paid => invoice.paid_date = Some(now),
        InvoiceStatus::Draft | InvoiceStatus::Cancelled => {}
    }

    invoice.updated_at = now;
}

/// Whether opening the public link should record a first view
pub fn should_mark_viewed(invoice: &Invoice) -> bool {
    invoice.status == InvoiceStatus::Sent && invoice.viewed_date.is_none()
}
