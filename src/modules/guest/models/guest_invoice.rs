// Guest invoices: one anonymous, browser-resident invoice per device before
// signup. Field names and the draft envelope match what the browser keeps in
// local storage, so drafts can be posted back as-is.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::validation::{is_valid_email, normalize_optional, Issues};
use crate::core::Result;
use crate::modules::invoices::models::{
    validate_currency, validate_due_date, validate_items, validate_tax_rate, DiscountType,
    InvoiceForm, LineInput, LineItemForm,
};
use crate::modules::invoices::services::PricedItem;

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestLineItem {
    pub id: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl PricedItem for GuestLineItem {
    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl LineInput for GuestLineItem {
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

/// Sender or recipient block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestParty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Guest invoice form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestInvoiceForm {
    pub from_name: String,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,

    pub to_name: String,
    #[serde(default)]
    pub to_email: Option<String>,
    #[serde(default)]
    pub to_phone: Option<String>,
    #[serde(default)]
    pub to_address: Option<String>,

    pub items: Vec<GuestLineItem>,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub due_date: String,
}

impl GuestInvoiceForm {
    pub fn validate(&self) -> Result<()> {
        let mut issues = Issues::new();

        issues.check(
            !self.from_name.is_empty(),
            "from_name",
            "Your business name is required",
        );
        if let Some(email) = self.from_email.as_deref().filter(|e| !e.is_empty()) {
            issues.check(is_valid_email(email), "from_email", "Invalid email");
        }
        issues.check(!self.to_name.is_empty(), "to_name", "Client name is required");
        if let Some(email) = self.to_email.as_deref().filter(|e| !e.is_empty()) {
            issues.check(is_valid_email(email), "to_email", "Invalid email");
        }
        validate_items(&self.items, &mut issues);
        validate_tax_rate(self.tax_rate, &mut issues);
        validate_currency(&self.currency, &mut issues);
        validate_due_date(&self.due_date, &mut issues);

        issues.finish()
    }
}

/// Display number for a guest invoice: `GUEST-` plus the first eight
/// characters of its id, uppercased
pub fn guest_invoice_number(invoice_id: &str) -> String {
    let prefix: String = invoice_id.chars().take(8).collect();
    format!("GUEST-{}", prefix.to_uppercase())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestInvoice {
    pub number: String,
    /// Issue date
    pub date: NaiveDate,
    pub due_date: String,
    pub from: GuestParty,
    pub to: GuestParty,
    pub items: Vec<GuestLineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub tax_rate: Decimal,
    pub currency: String,
}

impl GuestInvoice {
    pub fn from_form(form: GuestInvoiceForm, invoice_id: &str, today: NaiveDate) -> Self {
        Self {
            number: guest_invoice_number(invoice_id),
            date: today,
            due_date: form.due_date,
            from: GuestParty {
                name: form.from_name,
                email: normalize_optional(form.from_email),
                phone: None,
                address: normalize_optional(form.from_address),
            },
            to: GuestParty {
                name: form.to_name,
                email: normalize_optional(form.to_email),
                phone: normalize_optional(form.to_phone),
                address: normalize_optional(form.to_address),
            },
            items: form.items,
            notes: normalize_optional(form.notes),
            tax_rate: form.tax_rate,
            currency: form.currency,
        }
    }

    /// The equivalent signed-in invoice form. Guests have no discount, so
    /// totals come out identical.
    pub fn to_invoice_form(&self) -> InvoiceForm {
        InvoiceForm {
            client_id: None,
            client_name: self.to.name.clone(),
            client_email: self.to.email.clone(),
            client_phone: self.to.phone.clone(),
            client_address: self.to.address.clone(),
            client_tax_id: None,
            items: self
                .items
                .iter()
                .map(|item| LineItemForm {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    unit: None,
                })
                .collect(),
            tax_rate: self.tax_rate,
            discount_type: DiscountType::Fixed,
            discount_value: Decimal::ZERO,
            due_date: self.due_date.clone(),
            currency: self.currency.clone(),
            notes: self.notes.clone(),
            payment_instructions: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestDraftStatus {
    Draft,
    Completed,
}

/// Browser storage envelope, schema version 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDraftState {
    pub version: u8,
    pub created_at: DateTime<Utc>,
    pub invoice_id: String,
    pub status: GuestDraftStatus,
    pub attempt_fingerprint: String,
    pub invoice: GuestInvoice,
    pub pdf_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_generated_at: Option<DateTime<Utc>>,
}

impl GuestDraftState {
    pub const VERSION: u8 = 1;
}
