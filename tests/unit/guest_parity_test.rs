//! Guest totals must match signed-in totals cent for cent, so a guest invoice
//! recreated after signup carries the same amounts.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use quickbill::core::FixedClock;
use quickbill::modules::guest::models::{GuestInvoice, GuestLineItem};
use quickbill::modules::guest::services::{guest_totals, GuestService};
use quickbill::modules::invoices::services::InvoiceCalculator;

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;

fn guest_line() -> impl Strategy<Value = GuestLineItem> {
    (1i64..100_000, 0i64..10_000_000)
        .prop_map(|(q, p)| guest_item("x", Decimal::new(q, 2), Decimal::new(p, 2)))
}

proptest! {
    /// Property: guest totals equal the signed-in totals of the converted form
    #[test]
    fn test_guest_totals_match_converted_form(
        items in prop::collection::vec(guest_line(), 1..8),
        rate_bp in 0i64..=10_000,
    ) {
        let rate = Decimal::new(rate_bp, 2);
        let invoice = GuestInvoice::from_form(
            guest_form(items, rate),
            "parity-id",
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );

        let guest = guest_totals(&invoice.items, invoice.tax_rate);
        let form = invoice.to_invoice_form();
        let signed_in = InvoiceCalculator::invoice_totals(
            &form.items,
            form.tax_rate,
            form.discount_type,
            form.discount_value,
        );

        prop_assert_eq!(guest, signed_in);
        prop_assert_eq!(guest.discount_cents, 0);
    }
}

#[test]
fn test_converted_form_is_valid() {
    let invoice = GuestInvoice::from_form(
        guest_form(vec![guest_item("1", dec!(3), dec!(33.33))], dec!(10)),
        "abcdef12-3456",
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    );
    let form = invoice.to_invoice_form();

    assert!(form.validate().is_ok());
    assert_eq!(form.client_name, "Acme Corp");
    assert_eq!(form.client_address.as_deref(), Some("1 Main St"));
    assert_eq!(form.due_date, "2024-07-15");
    assert_eq!(form.items.len(), 1);
}

#[tokio::test]
async fn test_recreated_invoice_keeps_guest_total() {
    let guest = GuestService::new(std::sync::Arc::new(FixedClock::at_date(2024, 6, 1)), 7);
    let preview = guest
        .preview(
            guest_form(
                vec![
                    guest_item("1", dec!(3), dec!(33.33)),
                    guest_item("2", dec!(0.5), dec!(19.99)),
                ],
                dec!(8.875),
            ),
            None,
        )
        .unwrap();

    let state = test_state(2024, 6, 1);
    let invoice = state
        .invoices
        .create_next(TEST_USER, preview.invoice.to_invoice_form())
        .await
        .unwrap();

    assert_eq!(invoice.subtotal_cents, preview.totals.subtotal_cents);
    assert_eq!(invoice.tax_cents, preview.totals.tax_cents);
    assert_eq!(invoice.total_cents, preview.totals.total_cents);
    // 9999 + round(999.5) = 10999; tax round(976.16125) = 976
    assert_eq!(invoice.total_cents, 11975);
}
