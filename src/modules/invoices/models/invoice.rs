// Invoice aggregate: persisted record, lifecycle status and the derived
// display status.
//
// Money is stored in integer cents. Rates (tax, percentage discount) and the
// raw discount value are kept as entered so the document can be re-rendered.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::LineItem;

/// Persisted invoice status
///
/// `overdue` is not stored: it is derived at read time, see
/// [`DisplayStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Created, not yet sent to the client
    Draft,
    /// Delivered to the client
    Sent,
    /// Public link opened by the client
    Viewed,
    /// Payment recorded
    Paid,
    /// Logically retired
    Cancelled,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Viewed => "viewed",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "viewed" => Ok(InvoiceStatus::Viewed),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            "overdue" => Err("Overdue is derived from the due date and cannot be stored".to_string()),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// Status shown to users: the persisted status, or `overdue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Draft,
    Sent,
    Viewed,
    Paid,
    Overdue,
    Cancelled,
}

impl From<InvoiceStatus> for DisplayStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => DisplayStatus::Draft,
            InvoiceStatus::Sent => DisplayStatus::Sent,
            InvoiceStatus::Viewed => DisplayStatus::Viewed,
            InvoiceStatus::Paid => DisplayStatus::Paid,
            InvoiceStatus::Cancelled => DisplayStatus::Cancelled,
        }
    }
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Draft => "draft",
            DisplayStatus::Sent => "sent",
            DisplayStatus::Viewed => "viewed",
            DisplayStatus::Paid => "paid",
            DisplayStatus::Overdue => "overdue",
            DisplayStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How `discount_value` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Flat amount in major units
    Fixed,
    /// Percent of the subtotal
    Percentage,
}

impl Default for DiscountType {
    fn default() -> Self {
        DiscountType::Fixed
    }
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Fixed => "fixed",
            DiscountType::Percentage => "percentage",
        }
    }
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(DiscountType::Fixed),
            "percentage" => Ok(DiscountType::Percentage),
            _ => Err(format!("Invalid discount type: {}", s)),
        }
    }
}

/// A persisted invoice document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub user_id: String,
    pub client_id: Option<String>,
    /// `INV-{year}-{seq:04}`, unique per user
    pub invoice_number: String,
    pub status: InvoiceStatus,

    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub client_tax_id: Option<String>,

    /// Document order is insertion order
    pub items: Vec<LineItem>,

    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    /// Percent, 0-100
    pub tax_rate: Decimal,
    pub tax_cents: i64,
    pub total_cents: i64,

    /// ISO 4217 code
    pub currency: String,

    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub sent_date: Option<DateTime<Utc>>,
    pub viewed_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,

    pub notes: Option<String>,
    pub payment_instructions: Option<String>,
    pub terms: Option<String>,
    pub footer: Option<String>,

    /// Opaque id for unauthenticated read access; never changes
    pub public_id: String,
    pub public_url: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Defaults threaded into invoice composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDefaults {
    pub currency: String,
    pub payment_terms_days: u32,
    pub tax_rate: Decimal,
    /// Offset used by `duplicate`, independent of payment terms
    pub duplicate_due_days: u32,
    pub public_base_url: String,
}

impl Default for InvoiceDefaults {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            payment_terms_days: 30,
            tax_rate: Decimal::ZERO,
            duplicate_due_days: 30,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl InvoiceDefaults {
    pub fn public_url_for(&self, public_id: &str) -> String {
        format!("{}/i/{}", self.public_base_url, public_id)
    }
}

/// Invoice plus its read-time status, for presentation collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub display_status: DisplayStatus,
    pub is_overdue: bool,
}

/// Listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceFilter {
    /// `None` lists every status
    pub status: Option<InvoiceStatus>,
    /// Substring of client name or invoice number
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl InvoiceFilter {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// One page of invoices plus the unpaged count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePage {
    pub invoices: Vec<Invoice>,
    pub total: i64,
}
