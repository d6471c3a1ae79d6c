//! Read-time status resolution and lifecycle stamping

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use quickbill::modules::invoices::models::{DisplayStatus, InvoiceStatus};
use quickbill::modules::invoices::services::status::{
    apply_status, calculate_due_date, display_status, is_overdue, should_mark_viewed, view,
};
use quickbill::modules::invoices::services::InvoiceService;

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_only_sent_invoices_show_overdue() {
    let due = Some(date(2024, 6, 1));
    let today = date(2024, 6, 2);

    assert_eq!(display_status(InvoiceStatus::Sent, due, today), DisplayStatus::Overdue);
    assert_eq!(display_status(InvoiceStatus::Viewed, due, today), DisplayStatus::Viewed);
    assert_eq!(display_status(InvoiceStatus::Draft, due, today), DisplayStatus::Draft);
    assert_eq!(display_status(InvoiceStatus::Paid, due, today), DisplayStatus::Paid);
    assert_eq!(
        display_status(InvoiceStatus::Cancelled, due, today),
        DisplayStatus::Cancelled
    );
}

#[test]
fn test_due_today_is_not_overdue() {
    let today = date(2024, 6, 1);

    assert!(!is_overdue(Some(today), InvoiceStatus::Sent, today));
    assert_eq!(
        display_status(InvoiceStatus::Sent, Some(today), today),
        DisplayStatus::Sent
    );
}

#[test]
fn test_overdue_flag_ignores_settled_invoices() {
    let due = Some(date(2024, 1, 1));
    let today = date(2024, 6, 1);

    assert!(is_overdue(due, InvoiceStatus::Viewed, today));
    assert!(is_overdue(due, InvoiceStatus::Draft, today));
    assert!(!is_overdue(due, InvoiceStatus::Paid, today));
    assert!(!is_overdue(due, InvoiceStatus::Cancelled, today));
    assert!(!is_overdue(None, InvoiceStatus::Sent, today));
}

#[test]
fn test_due_date_from_terms() {
    assert_eq!(calculate_due_date(date(2024, 1, 31), 30), date(2024, 3, 1));
    assert_eq!(calculate_due_date(date(2024, 6, 1), 0), date(2024, 6, 1));
    assert_eq!(calculate_due_date(date(2024, 12, 20), 14), date(2025, 1, 3));
}

#[tokio::test]
async fn test_lifecycle_stamps_and_view() {
    let state = test_state(2024, 6, 1);
    let invoice = state
        .invoices
        .create(TEST_USER, "INV-2024-0001", invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]))
        .await
        .unwrap();

    let mut invoice = invoice;
    assert!(!should_mark_viewed(&invoice));

    let sent_at = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
    apply_status(&mut invoice, InvoiceStatus::Sent, sent_at);
    assert_eq!(invoice.sent_date, Some(sent_at));
    assert!(should_mark_viewed(&invoice));

    // Due 2024-07-15; a month later it reads as overdue without being stored so
    let later = view(invoice.clone(), date(2024, 8, 1));
    assert_eq!(later.display_status, DisplayStatus::Overdue);
    assert!(later.is_overdue);
    assert_eq!(later.invoice.status, InvoiceStatus::Sent);

    let paid_at = Utc.with_ymd_and_hms(2024, 8, 2, 9, 0, 0).unwrap();
    apply_status(&mut invoice, InvoiceStatus::Paid, paid_at);
    assert_eq!(invoice.paid_date, Some(paid_at));
    assert_eq!(invoice.sent_date, Some(sent_at));

    let settled = view(invoice, date(2024, 8, 3));
    assert_eq!(settled.display_status, DisplayStatus::Paid);
    assert!(!settled.is_overdue);
}

#[tokio::test]
async fn test_service_view_uses_clock_date() {
    let state = test_state(2024, 8, 1);
    let service: &InvoiceService = &state.invoices;

    let created = service
        .create(TEST_USER, "INV-2024-0001", invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]))
        .await
        .unwrap();
    let sent = service.update_status(&created.id, InvoiceStatus::Sent).await.unwrap();

    let view = service.view(sent);
    assert_eq!(view.display_status, DisplayStatus::Overdue);
}
