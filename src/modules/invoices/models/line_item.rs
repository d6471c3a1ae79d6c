// A line item is one row of an invoice. It is built from form input in major
// units and stored in cents; it only changes when the parent invoice's items
// are re-submitted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::form::LineItemForm;
use crate::core::currency::dollars_to_cents;
use crate::modules::invoices::services::calculator::InvoiceCalculator;

/// Represents a single line item in an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,

    /// Description of the product or service
    pub description: String,

    /// Fractional quantities are allowed (hours, kilograms, ...)
    pub quantity: Decimal,

    /// Optional unit label, e.g. "hrs"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    pub unit_price_cents: i64,

    /// round(quantity × unit price × 100)
    pub amount_cents: i64,

    /// Per-line rate, informational only; invoice tax is a single flat rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
}

impl LineItem {
    /// Build a persisted line item from validated form input
    pub fn from_form(item: &LineItemForm) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: item.description.clone(),
            quantity: item.quantity,
            unit: item.unit.clone().filter(|u| !u.is_empty()),
            unit_price_cents: dollars_to_cents(item.unit_price),
            amount_cents: InvoiceCalculator::line_item_amount(item.quantity, item.unit_price),
            tax_rate: None,
        }
    }

    pub fn from_forms(items: &[LineItemForm]) -> Vec<Self> {
        items.iter().map(Self::from_form).collect()
    }
}
