use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies offered in the settings and invoice forms.
///
/// Invoices accept any 3-character ISO 4217 code; this list only drives
/// symbols and form options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    JPY,
    IDR,
    SGD,
}

pub const SUPPORTED_CURRENCIES: [Currency; 8] = [
    Currency::USD,
    Currency::EUR,
    Currency::GBP,
    Currency::CAD,
    Currency::AUD,
    Currency::JPY,
    Currency::IDR,
    Currency::SGD,
];

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::JPY => "JPY",
            Currency::IDR => "IDR",
            Currency::SGD => "SGD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::JPY => "¥",
            Currency::IDR => "Rp",
            Currency::SGD => "S$",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Currency::USD => "USD - US Dollar",
            Currency::EUR => "EUR - Euro",
            Currency::GBP => "GBP - British Pound",
            Currency::CAD => "CAD - Canadian Dollar",
            Currency::AUD => "AUD - Australian Dollar",
            Currency::JPY => "JPY - Japanese Yen",
            Currency::IDR => "IDR - Indonesian Rupiah",
            Currency::SGD => "SGD - Singapore Dollar",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_CURRENCIES
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unsupported currency: {}", s))
    }
}

/// Round to a whole number of minor units, half away from zero.
///
/// Saturates at the `i64` bounds.
pub fn round_to_minor(value: Decimal) -> i64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Major units (dollars) to minor units (cents)
pub fn dollars_to_cents(dollars: Decimal) -> i64 {
    round_to_minor(dollars * Decimal::ONE_HUNDRED)
}

/// Minor units (cents) to major units (dollars), exact
pub fn cents_to_dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Format a cent amount for display, e.g. `$1,248.39` or `XYZ 1.00`.
///
/// Always two fraction digits, matching how stored amounts are kept in cents.
pub fn format_cents(cents: i64, currency: &str) -> String {
    let prefix = match currency.parse::<Currency>() {
        Ok(known) => known.symbol().to_string(),
        Err(_) => format!("{} ", currency.to_uppercase()),
    };

    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = group_thousands(abs / 100);
    let fraction = abs % 100;

    format!("{}{}{}.{:02}", sign, prefix, whole, fraction)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
