// Form-shaped input for composing and editing invoices. Prices and discount
// values arrive in major units (dollars); conversion to cents happens when the
// aggregate service builds the persisted record.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::DiscountType;
use crate::core::validation::{is_valid_email, Issues};
use crate::core::Result;
use crate::modules::clients::models::Client;
use crate::modules::invoices::services::calculator::PricedItem;

/// Upper bounds on form input. At these limits the largest invoice is about
/// 2e18 cents, which keeps every total inside `i64`.
pub const MAX_ITEMS: usize = 100;
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
pub const MAX_FIXED_DISCOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn default_currency() -> String {
    "USD".to_string()
}

/// One item row as entered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemForm {
    pub description: String,
    pub quantity: Decimal,
    /// Major units
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl PricedItem for LineItemForm {
    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

/// Full invoice form, used by `create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceForm {
    #[serde(default)]
    pub client_id: Option<String>,
    pub client_name: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub client_tax_id: Option<String>,

    pub items: Vec<LineItemForm>,

    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: Decimal,

    /// `YYYY-MM-DD`
    pub due_date: String,
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_instructions: Option<String>,
}

impl InvoiceForm {
    /// Check every field, reporting all problems together
    pub fn validate(&self) -> Result<()> {
        let mut issues = Issues::new();

        validate_client_name(&self.client_name, &mut issues);
        validate_email(self.client_email.as_deref(), &mut issues);
        validate_items(&self.items, &mut issues);
        validate_tax_rate(self.tax_rate, &mut issues);
        validate_discount(Some(self.discount_type), self.discount_value, &mut issues);
        validate_due_date(&self.due_date, &mut issues);
        validate_currency(&self.currency, &mut issues);

        issues.finish()
    }

    /// Parsed due date; only meaningful after `validate`
    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        parse_date(&self.due_date)
    }

    /// Pre-fill client fields from a saved client
    pub fn prefill_from_client(mut self, client: &Client) -> Self {
        self.client_id = Some(client.id.clone());
        self.client_name = client.name.clone();
        self.client_email = client.email.clone();
        self.client_phone = client.phone.clone();
        self.client_address = client.full_address();
        self.client_tax_id = client.tax_id.clone();
        self
    }
}

/// Partial form, used by `update`. Absent fields are left untouched; an
/// empty string for an optional text field clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub client_tax_id: Option<String>,
    pub items: Option<Vec<LineItemForm>>,
    pub tax_rate: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub due_date: Option<String>,
    pub currency: Option<String>,
    pub notes: Option<String>,
    pub payment_instructions: Option<String>,
}

impl InvoicePatch {
    /// Same rules as [`InvoiceForm::validate`], applied to present fields only
    pub fn validate(&self) -> Result<()> {
        let mut issues = Issues::new();

        if let Some(name) = &self.client_name {
            validate_client_name(name, &mut issues);
        }
        validate_email(self.client_email.as_deref(), &mut issues);
        if let Some(items) = &self.items {
            validate_items(items, &mut issues);
        }
        if let Some(rate) = self.tax_rate {
            validate_tax_rate(rate, &mut issues);
        }
        if let Some(value) = self.discount_value {
            validate_discount(self.discount_type, value, &mut issues);
        }
        if let Some(due_date) = &self.due_date {
            validate_due_date(due_date, &mut issues);
        }
        if let Some(currency) = &self.currency {
            validate_currency(currency, &mut issues);
        }

        issues.finish()
    }

    /// True when any field feeding the totals is present
    pub fn touches_totals(&self) -> bool {
        self.items.is_some()
            || self.tax_rate.is_some()
            || self.discount_type.is_some()
            || self.discount_value.is_some()
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part is kept)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn validate_client_name(name: &str, issues: &mut Issues) {
    issues.check(!name.is_empty(), "client_name", "Client name is required");
}

fn validate_email(email: Option<&str>, issues: &mut Issues) {
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        issues.check(is_valid_email(email), "client_email", "Invalid email");
    }
}

pub(crate) fn validate_items<T: LineInput>(items: &[T], issues: &mut Issues) {
    if items.is_empty() {
        issues.push("items", "At least one item is required");
        return;
    }
    if items.len() > MAX_ITEMS {
        issues.push("items", format!("At most {} items are allowed", MAX_ITEMS));
    }

    for (idx, item) in items.iter().enumerate() {
        issues.check(
            !item.description().is_empty(),
            format!("items.{}.description", idx),
            "Description is required",
        );
        issues.check(
            item.line_quantity() > Decimal::ZERO,
            format!("items.{}.quantity", idx),
            "Quantity must be greater than 0",
        );
        issues.check(
            item.line_quantity() <= MAX_QUANTITY,
            format!("items.{}.quantity", idx),
            "Quantity is too large",
        );
        issues.check(
            item.line_unit_price() >= Decimal::ZERO,
            format!("items.{}.unit_price", idx),
            "Price must be 0 or greater",
        );
        issues.check(
            item.line_unit_price() <= MAX_UNIT_PRICE,
            format!("items.{}.unit_price", idx),
            "Price is too large",
        );
    }
}

pub(crate) fn validate_tax_rate(rate: Decimal, issues: &mut Issues) {
    issues.check(
        rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED,
        "tax_rate",
        "Tax rate must be between 0 and 100",
    );
}

/// With no type (a patch that only sets the value) the fixed bound applies;
/// the merged invoice is checked again with [`check_discount`].
fn validate_discount(discount_type: Option<DiscountType>, value: Decimal, issues: &mut Issues) {
    issues.check(
        value >= Decimal::ZERO,
        "discount_value",
        "Discount cannot be negative",
    );
    match discount_type {
        Some(DiscountType::Percentage) => issues.check(
            value <= Decimal::ONE_HUNDRED,
            "discount_value",
            "Discount cannot exceed 100%",
        ),
        Some(DiscountType::Fixed) | None => issues.check(
            value <= MAX_FIXED_DISCOUNT,
            "discount_value",
            "Discount is too large",
        ),
    }
}

/// Discount rules for a type and value that were set separately
pub fn check_discount(discount_type: DiscountType, value: Decimal) -> Result<()> {
    let mut issues = Issues::new();
    validate_discount(Some(discount_type), value, &mut issues);
    issues.finish()
}

pub(crate) fn validate_due_date(due_date: &str, issues: &mut Issues) {
    if due_date.is_empty() {
        issues.push("due_date", "Due date is required");
    } else if parse_date(due_date).is_none() {
        issues.push("due_date", "Invalid due date");
    }
}

pub(crate) fn validate_currency(currency: &str, issues: &mut Issues) {
    issues.check(
        currency.chars().count() == 3,
        "currency",
        "Currency must be 3 characters",
    );
}

/// Item rows that share the same validation rules (invoice and guest forms)
pub(crate) trait LineInput {
    fn description(&self) -> &str;
    fn line_quantity(&self) -> Decimal;
    fn line_unit_price(&self) -> Decimal;
}

impl LineInput for LineItemForm {
    fn description(&self) -> &str {
        &self.description
    }

    fn line_quantity(&self) -> Decimal {
        self.quantity
    }

    fn line_unit_price(&self) -> Decimal {
        self.unit_price
    }
}
