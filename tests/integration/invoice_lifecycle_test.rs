//! Invoice lifecycle against the in-memory store: create, number, update,
//! send, view, pay, duplicate and delete.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use quickbill::core::{AppError, ErrorCode, FixedClock};
use quickbill::modules::invoices::models::{
    DiscountType, InvoiceFilter, InvoicePatch, InvoiceStatus,
};
use quickbill::modules::invoices::repositories::InMemoryInvoiceRepository;
use quickbill::InvoiceService;

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_create_computes_totals_and_public_link() {
    let state = test_state(2024, 6, 1);

    let mut form = invoice_form(
        "Acme Corp",
        vec![line("Design", dec!(2), dec!(100)), line("Hosting", dec!(1), dec!(48.39))],
    );
    form.client_email = Some(String::new());
    form.currency = "usd".to_string();

    let invoice = state.invoices.create_next(TEST_USER, form).await.unwrap();

    assert_eq!(invoice.invoice_number, "INV-2024-0001");
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.subtotal_cents, 24839);
    assert_eq!(invoice.total_cents, 24839);
    assert_eq!(invoice.items[0].amount_cents, 20000);
    assert_eq!(invoice.items[1].amount_cents, 4839);
    assert_eq!(invoice.currency, "USD");
    assert_eq!(invoice.client_email, None);
    assert_eq!(invoice.issue_date, date(2024, 6, 1));
    assert_eq!(invoice.due_date, Some(date(2024, 7, 15)));
    assert_eq!(
        invoice.public_url,
        format!("https://bills.test/i/{}", invoice.public_id)
    );
}

#[tokio::test]
async fn test_invalid_form_creates_nothing() {
    let state = test_state(2024, 6, 1);

    let mut form = invoice_form("", vec![line("Work", dec!(0), dec!(10))]);
    form.tax_rate = dec!(120);

    let err = state.invoices.create_next(TEST_USER, form).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
    let paths: Vec<_> = err.issues().unwrap_or_default().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["client_name", "items.0.quantity", "tax_rate"]);

    let page = state.invoices.list(TEST_USER, &InvoiceFilter::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_oversized_line_is_rejected_not_priced() {
    let state = test_state(2024, 6, 1);

    let quantity: Decimal = "1000000000000000000000".parse().unwrap();
    let form = invoice_form("Acme", vec![line("Everything", quantity, dec!(1000000000))]);
    let err = state.invoices.create_next(TEST_USER, form).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
    let paths: Vec<_> = err.issues().unwrap_or_default().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, vec!["items.0.quantity", "items.0.unit_price"]);

    let page = state.invoices.list(TEST_USER, &InvoiceFilter::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_discount_type_change_is_checked_against_stored_value() {
    let state = test_state(2024, 6, 1);

    let mut form = invoice_form("Acme", vec![line("Work", dec!(1), dec!(1000))]);
    form.discount_value = dec!(250);
    let invoice = state.invoices.create_next(TEST_USER, form).await.unwrap();
    assert_eq!(invoice.discount_cents, 25000);

    // A fixed 250 read as a percentage would exceed 100%
    let patch = InvoicePatch {
        discount_type: Some(DiscountType::Percentage),
        ..Default::default()
    };
    let err = state.invoices.update(&invoice.id, patch).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    let stored = state.invoices.get_by_id(&invoice.id).await.unwrap();
    assert_eq!(stored.discount_type, DiscountType::Fixed);
    assert_eq!(stored.total_cents, 75000);
}

#[tokio::test]
async fn test_numbering_is_per_user_and_survives_deletes() {
    let state = test_state(2024, 6, 1);
    let form = || invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]);

    let first = state.invoices.create_next(TEST_USER, form()).await.unwrap();
    let second = state.invoices.create_next(TEST_USER, form()).await.unwrap();
    let other = state.invoices.create_next(OTHER_USER, form()).await.unwrap();

    assert_eq!(first.invoice_number, "INV-2024-0001");
    assert_eq!(second.invoice_number, "INV-2024-0002");
    assert_eq!(other.invoice_number, "INV-2024-0001");

    state.invoices.delete(&second.id).await.unwrap();
    let third = state.invoices.create_next(TEST_USER, form()).await.unwrap();
    assert_eq!(third.invoice_number, "INV-2024-0003");
}

#[tokio::test]
async fn test_numbering_restarts_each_year() {
    let last_year = test_state(2024, 12, 31);
    let number = last_year.invoices.next_invoice_number(TEST_USER).await.unwrap();
    assert_eq!(number, "INV-2024-0001");

    let next_year = test_state(2025, 1, 1);
    assert_eq!(
        next_year.invoices.next_invoice_number(TEST_USER).await.unwrap(),
        "INV-2025-0001"
    );
}

#[tokio::test]
async fn test_numbering_follows_local_year_near_midnight() {
    // 21:00 on Dec 31 in UTC-5 is already Jan 1 in UTC
    let now = DateTime::parse_from_rfc3339("2025-01-01T02:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let clock = FixedClock::with_offset(now, FixedOffset::west_opt(5 * 3600).unwrap());
    let service = InvoiceService::new(
        Arc::new(InMemoryInvoiceRepository::new()),
        Arc::new(clock),
        test_defaults(),
    );
    let form = || invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]);

    let first = service.create_next(TEST_USER, form()).await.unwrap();
    let second = service.create_next(TEST_USER, form()).await.unwrap();

    assert_eq!(first.invoice_number, "INV-2024-0001");
    assert_eq!(second.invoice_number, "INV-2024-0002");
    assert_eq!(first.issue_date, date(2024, 12, 31));
}

#[tokio::test]
async fn test_duplicate_number_is_conflict() {
    let state = test_state(2024, 6, 1);
    let form = || invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]);

    state.invoices.create(TEST_USER, "INV-2024-0007", form()).await.unwrap();
    let err = state
        .invoices
        .create(TEST_USER, "INV-2024-0007", form())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_update_recomputes_totals_only_when_needed() {
    let state = test_state(2024, 6, 1);
    let invoice = state
        .invoices
        .create_next(TEST_USER, invoice_form("Acme", vec![line("Work", dec!(1), dec!(250))]))
        .await
        .unwrap();

    // Tax and discount alone recompute from the stored line amounts
    let updated = state
        .invoices
        .update(
            &invoice.id,
            InvoicePatch {
                tax_rate: Some(dec!(10)),
                discount_type: Some(DiscountType::Percentage),
                discount_value: Some(dec!(20)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.subtotal_cents, 25000);
    assert_eq!(updated.discount_cents, 5000);
    assert_eq!(updated.tax_cents, 2000);
    assert_eq!(updated.total_cents, 22000);

    // Notes do not touch money
    let noted = state
        .invoices
        .update(
            &invoice.id,
            InvoicePatch {
                notes: Some("Thanks!".to_string()),
                client_email: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(noted.total_cents, 22000);
    assert_eq!(noted.notes.as_deref(), Some("Thanks!"));
    assert_eq!(noted.client_email, None);

    // New items replace the old ones
    let replaced = state
        .invoices
        .update(
            &invoice.id,
            InvoicePatch {
                items: Some(vec![line("A", dec!(3), dec!(33.33))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(replaced.items.len(), 1);
    assert_eq!(replaced.subtotal_cents, 9999);
    // 20% of 9999 = 1999.8 -> 2000; tax 10% of 7999
    assert_eq!(replaced.discount_cents, 2000);
    assert_eq!(replaced.tax_cents, 800);
    assert_eq!(replaced.total_cents, 8799);
}

#[tokio::test]
async fn test_status_transitions_stamp_dates() {
    let state = test_state(2024, 6, 1);
    let invoice = state
        .invoices
        .create_next(TEST_USER, invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]))
        .await
        .unwrap();

    let sent = state.invoices.update_status(&invoice.id, InvoiceStatus::Sent).await.unwrap();
    assert_eq!(sent.status, InvoiceStatus::Sent);
    assert!(sent.sent_date.is_some());
    assert!(sent.paid_date.is_none());

    let paid = state.invoices.update_status(&invoice.id, InvoiceStatus::Paid).await.unwrap();
    assert!(paid.paid_date.is_some());
    assert_eq!(paid.sent_date, sent.sent_date);

    // Any status may follow any other
    let draft = state.invoices.update_status(&invoice.id, InvoiceStatus::Draft).await.unwrap();
    assert_eq!(draft.status, InvoiceStatus::Draft);
    assert!(draft.paid_date.is_some());
}

#[tokio::test]
async fn test_public_view_marks_viewed_once() {
    let state = test_state(2024, 6, 1);
    let invoice = state
        .invoices
        .create_next(TEST_USER, invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]))
        .await
        .unwrap();

    // Drafts are not marked
    let draft_view = state.invoices.view_public(&invoice.public_id).await.unwrap();
    assert_eq!(draft_view.invoice.status, InvoiceStatus::Draft);

    state.invoices.update_status(&invoice.id, InvoiceStatus::Sent).await.unwrap();

    let first = state.invoices.view_public(&invoice.public_id).await.unwrap();
    assert_eq!(first.invoice.status, InvoiceStatus::Viewed);
    let viewed_at = first.invoice.viewed_date;
    assert!(viewed_at.is_some());

    let second = state.invoices.view_public(&invoice.public_id).await.unwrap();
    assert_eq!(second.invoice.status, InvoiceStatus::Viewed);
    assert_eq!(second.invoice.viewed_date, viewed_at);
    assert_eq!(second.invoice.updated_at, first.invoice.updated_at);
}

#[tokio::test]
async fn test_duplicate_resets_lifecycle() {
    let state = test_state(2024, 6, 1);
    let source = state
        .invoices
        .create_next(
            TEST_USER,
            invoice_form("Acme", vec![line("Work", dec!(2), dec!(75)), line("Extra", dec!(1), dec!(5))]),
        )
        .await
        .unwrap();
    state.invoices.update_status(&source.id, InvoiceStatus::Paid).await.unwrap();

    let copy = state.invoices.duplicate_next(&source.id, TEST_USER).await.unwrap();

    assert_ne!(copy.id, source.id);
    assert_ne!(copy.public_id, source.public_id);
    assert_eq!(copy.invoice_number, "INV-2024-0002");
    assert_eq!(copy.status, InvoiceStatus::Draft);
    assert!(copy.paid_date.is_none() && copy.sent_date.is_none() && copy.viewed_date.is_none());
    assert_eq!(copy.issue_date, date(2024, 6, 1));
    assert_eq!(copy.due_date, Some(date(2024, 6, 1) + Duration::days(30)));
    assert_eq!(copy.total_cents, source.total_cents);
    assert_eq!(copy.client_name, source.client_name);
    assert_eq!(copy.items.len(), 2);
    assert!(copy.items.iter().zip(&source.items).all(|(a, b)| a.id != b.id
        && a.description == b.description
        && a.amount_cents == b.amount_cents));
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let state = test_state(2024, 6, 1);
    for name in ["Acme", "Globex", "Initech", "Acme West"] {
        state
            .invoices
            .create_next(TEST_USER, invoice_form(name, vec![line("Work", dec!(1), dec!(10))]))
            .await
            .unwrap();
    }
    let sent = state
        .invoices
        .list(TEST_USER, &InvoiceFilter { search: Some("globex".to_string()), ..Default::default() })
        .await
        .unwrap();
    state
        .invoices
        .update_status(&sent.invoices[0].id, InvoiceStatus::Sent)
        .await
        .unwrap();

    let acme = state
        .invoices
        .list(TEST_USER, &InvoiceFilter { search: Some("acme".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(acme.total, 2);

    let by_number = state
        .invoices
        .list(TEST_USER, &InvoiceFilter { search: Some("0003".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(by_number.invoices[0].client_name, "Initech");

    let only_sent = state
        .invoices
        .list(TEST_USER, &InvoiceFilter { status: Some(InvoiceStatus::Sent), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(only_sent.total, 1);

    // Newest number first
    let page = state
        .invoices
        .list(TEST_USER, &InvoiceFilter { limit: Some(2), offset: Some(1), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    let numbers: Vec<_> = page.invoices.iter().map(|i| i.invoice_number.as_str()).collect();
    assert_eq!(numbers, vec!["INV-2024-0003", "INV-2024-0002"]);

    let other = state.invoices.list(OTHER_USER, &InvoiceFilter::default()).await.unwrap();
    assert_eq!(other.total, 0);
}

#[tokio::test]
async fn test_deleted_invoice_is_gone() {
    let state = test_state(2024, 6, 1);
    let invoice = state
        .invoices
        .create_next(TEST_USER, invoice_form("Acme", vec![line("Work", dec!(1), dec!(10))]))
        .await
        .unwrap();

    state.invoices.delete(&invoice.id).await.unwrap();

    let err = state.invoices.get_by_id(&invoice.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
    let err = state.invoices.view_public(&invoice.public_id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
    let err = state.invoices.delete(&invoice.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}
