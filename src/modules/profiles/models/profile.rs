// Per-user business details and invoice defaults.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::validation::{is_valid_email, normalize_optional, Issues};
use crate::core::Result;
use crate::modules::invoices::models::{InvoiceDefaults, InvoiceForm};

pub const DEFAULT_TAX_ID_LABEL: &str = "Tax ID";
pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_DATE_FORMAT: &str = "MM/DD/YYYY";

/// Profile row; `id` is the owning user's id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub business_name: Option<String>,
    pub business_email: Option<String>,
    pub business_phone: Option<String>,
    pub business_address: Option<String>,
    pub business_city: Option<String>,
    pub business_country: Option<String>,
    pub business_postal_code: Option<String>,
    pub tax_id: Option<String>,
    pub tax_id_label: String,
    pub logo_url: Option<String>,
    pub default_currency: String,
    /// Days between issue and due date
    pub default_payment_terms: u32,
    pub default_tax_rate: Decimal,
    pub default_notes: Option<String>,
    pub default_payment_instructions: Option<String>,
    pub locale: String,
    pub date_format: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh profile seeded from the configured defaults
    pub fn new_default(user_id: &str, defaults: &InvoiceDefaults, now: DateTime<Utc>) -> Self {
        Self {
            id: user_id.to_string(),
            business_name: None,
            business_email: None,
            business_phone: None,
            business_address: None,
            business_city: None,
            business_country: None,
            business_postal_code: None,
            tax_id: None,
            tax_id_label: DEFAULT_TAX_ID_LABEL.to_string(),
            logo_url: None,
            default_currency: defaults.currency.clone(),
            default_payment_terms: defaults.payment_terms_days,
            default_tax_rate: defaults.tax_rate,
            default_notes: None,
            default_payment_instructions: None,
            locale: DEFAULT_LOCALE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite editable fields from a validated form. Empty strings are
    /// stored as absent.
    pub fn apply_form(&mut self, form: ProfileForm) {
        self.business_name = normalize_optional(form.business_name);
        self.business_email = normalize_optional(form.business_email);
        self.business_phone = normalize_optional(form.business_phone);
        self.business_address = normalize_optional(form.business_address);
        self.business_city = normalize_optional(form.business_city);
        self.business_country = normalize_optional(form.business_country);
        self.business_postal_code = normalize_optional(form.business_postal_code);
        self.tax_id = normalize_optional(form.tax_id);
        self.tax_id_label = form.tax_id_label;
        self.default_currency = form.default_currency.to_uppercase();
        self.default_payment_terms = u32::try_from(form.default_payment_terms).unwrap_or(0);
        self.default_tax_rate = form.default_tax_rate;
        self.default_notes = normalize_optional(form.default_notes);
        self.default_payment_instructions = normalize_optional(form.default_payment_instructions);
        self.locale = form.locale;
        self.date_format = form.date_format;
    }
}

fn default_tax_id_label() -> String {
    DEFAULT_TAX_ID_LABEL.to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_payment_terms() -> i64 {
    30
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

/// Settings form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub business_email: Option<String>,
    #[serde(default)]
    pub business_phone: Option<String>,
    #[serde(default)]
    pub business_address: Option<String>,
    #[serde(default)]
    pub business_city: Option<String>,
    #[serde(default)]
    pub business_country: Option<String>,
    #[serde(default)]
    pub business_postal_code: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default = "default_tax_id_label")]
    pub tax_id_label: String,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_payment_terms")]
    pub default_payment_terms: i64,
    #[serde(default)]
    pub default_tax_rate: Decimal,
    #[serde(default)]
    pub default_notes: Option<String>,
    #[serde(default)]
    pub default_payment_instructions: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            business_name: None,
            business_email: None,
            business_phone: None,
            business_address: None,
            business_city: None,
            business_country: None,
            business_postal_code: None,
            tax_id: None,
            tax_id_label: default_tax_id_label(),
            default_currency: default_currency(),
            default_payment_terms: default_payment_terms(),
            default_tax_rate: Decimal::ZERO,
            default_notes: None,
            default_payment_instructions: None,
            locale: default_locale(),
            date_format: default_date_format(),
        }
    }
}

fn check_len(issues: &mut Issues, value: Option<&str>, max: usize, path: &str, message: &str) {
    let len = value.map_or(0, |v| v.chars().count());
    issues.check(len <= max, path, message);
}

impl ProfileForm {
    pub fn validate(&self) -> Result<()> {
        let mut issues = Issues::new();

        check_len(&mut issues, self.business_name.as_deref(), 100, "business_name", "Business name is too long");
        if let Some(email) = self.business_email.as_deref().filter(|e| !e.is_empty()) {
            issues.check(is_valid_email(email), "business_email", "Invalid email");
        }
        check_len(&mut issues, self.business_phone.as_deref(), 30, "business_phone", "Phone number is too long");
        check_len(&mut issues, self.business_address.as_deref(), 200, "business_address", "Address is too long");
        check_len(&mut issues, self.business_city.as_deref(), 100, "business_city", "City is too long");
        check_len(&mut issues, self.business_country.as_deref(), 100, "business_country", "Country is too long");
        check_len(&mut issues, self.business_postal_code.as_deref(), 20, "business_postal_code", "Postal code is too long");
        check_len(&mut issues, self.tax_id.as_deref(), 50, "tax_id", "Tax ID is too long");
        check_len(&mut issues, Some(&self.tax_id_label), 50, "tax_id_label", "Tax ID label is too long");
        issues.check(
            self.default_currency.chars().count() == 3,
            "default_currency",
            "Currency must be 3 characters",
        );
        issues.check(
            (0..=365).contains(&self.default_payment_terms),
            "default_payment_terms",
            "Payment terms must be between 0 and 365 days",
        );
        issues.check(
            self.default_tax_rate >= Decimal::ZERO && self.default_tax_rate <= Decimal::ONE_HUNDRED,
            "default_tax_rate",
            "Tax rate must be between 0 and 100",
        );
        check_len(&mut issues, self.default_notes.as_deref(), 1000, "default_notes", "Notes are too long");
        check_len(
            &mut issues,
            self.default_payment_instructions.as_deref(),
            1000,
            "default_payment_instructions",
            "Payment instructions are too long",
        );

        issues.finish()
    }
}

/// Values pre-filled into a new invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoiceDefaults {
    pub currency: String,
    pub payment_terms: u32,
    pub tax_rate: Decimal,
    pub notes: Option<String>,
    pub payment_instructions: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl NewInvoiceDefaults {
    /// Empty invoice form carrying these defaults; client and items are
    /// left for the user
    pub fn blank_form(&self) -> InvoiceForm {
        InvoiceForm {
            client_id: None,
            client_name: String::new(),
            client_email: None,
            client_phone: None,
            client_address: None,
            client_tax_id: None,
            items: Vec::new(),
            tax_rate: self.tax_rate,
            discount_type: Default::default(),
            discount_value: Decimal::ZERO,
            due_date: self.due_date.format("%Y-%m-%d").to_string(),
            currency: self.currency.clone(),
            notes: self.notes.clone(),
            payment_instructions: self.payment_instructions.clone(),
        }
    }
}
