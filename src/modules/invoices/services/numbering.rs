// Invoice numbers are year-scoped per user: INV-2024-0001, INV-2024-0002, ...
//
// The sequence comes from counting the user's invoices created this calendar
// year. Two concurrent creations by the same user can read the same count;
// the unique (user_id, invoice_number) index turns that into a Conflict
// rather than a silent duplicate.

use chrono::Datelike;

use crate::core::Clock;
use crate::core::Result;
use crate::modules::invoices::repositories::InvoiceRepository;

pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{}-{:04}", year, sequence)
}

/// Next number for `user_id`, scoped to the clock's current year. The count
/// window uses the clock's own year boundaries so it matches `today()`.
pub async fn next_invoice_number(
    repo: &dyn InvoiceRepository,
    clock: &dyn Clock,
    user_id: &str,
) -> Result<String> {
    let year = clock.today().year();
    let (start, end) = clock.year_bounds(year);
    let count = repo.count_created_between(user_id, start, end).await?;

    Ok(format_invoice_number(year, count + 1))
}
