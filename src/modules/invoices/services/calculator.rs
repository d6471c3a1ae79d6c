use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::currency::round_to_minor;
use crate::modules::invoices::models::DiscountType;

/// Anything with a quantity and a major-unit price
pub trait PricedItem {
    fn quantity(&self) -> Decimal;
    fn unit_price(&self) -> Decimal;
}

impl PricedItem for (Decimal, Decimal) {
    fn quantity(&self) -> Decimal {
        self.0
    }

    fn unit_price(&self) -> Decimal {
        self.1
    }
}

/// Computed totals, all in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Invoice money math
///
/// Every stage rounds half away from zero on its own; rounding is never
/// deferred to the grand total, so results match cent for cent with stored
/// invoices.
///
/// Arithmetic saturates rather than panics. Validated forms are bounded far
/// below the point where that matters (the `MAX_*` bounds on invoice forms).
pub struct InvoiceCalculator;

impl InvoiceCalculator {
    /// round(quantity × unit price × 100)
    pub fn line_item_amount(quantity: Decimal, unit_price: Decimal) -> i64 {
        round_to_minor(
            quantity
                .saturating_mul(unit_price)
                .saturating_mul(Decimal::ONE_HUNDRED),
        )
    }

    /// Sum of line amounts; 0 for no items
    pub fn subtotal<T: PricedItem>(items: &[T]) -> i64 {
        items
            .iter()
            .map(|item| Self::line_item_amount(item.quantity(), item.unit_price()))
            .fold(0, i64::saturating_add)
    }

    /// Discount in cents. Not clamped: callers validate `value >= 0`.
    pub fn discount(subtotal_cents: i64, discount_type: DiscountType, value: Decimal) -> i64 {
        if value <= Decimal::ZERO {
            return 0;
        }

        match discount_type {
            DiscountType::Fixed => round_to_minor(value.saturating_mul(Decimal::ONE_HUNDRED)),
            DiscountType::Percentage => {
                round_to_minor(
                    Decimal::from(subtotal_cents).saturating_mul(value) / Decimal::ONE_HUNDRED,
                )
            }
        }
    }

    pub fn tax(amount_cents: i64, rate_percent: Decimal) -> i64 {
        if rate_percent <= Decimal::ZERO {
            return 0;
        }

        round_to_minor(
            Decimal::from(amount_cents).saturating_mul(rate_percent) / Decimal::ONE_HUNDRED,
        )
    }

    /// Discount is applied before tax
    pub fn invoice_totals<T: PricedItem>(
        items: &[T],
        tax_rate: Decimal,
        discount_type: DiscountType,
        discount_value: Decimal,
    ) -> InvoiceTotals {
        Self::totals_for_subtotal(Self::subtotal(items), tax_rate, discount_type, discount_value)
    }

    /// Same as [`Self::invoice_totals`] starting from an already summed subtotal
    pub fn totals_for_subtotal(
        subtotal_cents: i64,
        tax_rate: Decimal,
        discount_type: DiscountType,
        discount_value: Decimal,
    ) -> InvoiceTotals {
        let discount_cents = Self::discount(subtotal_cents, discount_type, discount_value);
        let taxable_cents = subtotal_cents.saturating_sub(discount_cents);
        let tax_cents = Self::tax(taxable_cents, tax_rate);

        InvoiceTotals {
            subtotal_cents,
            discount_cents,
            tax_cents,
            total_cents: taxable_cents.saturating_add(tax_cents),
        }
    }
}
