// Invoice persistence.
//
// Line items live in a JSON column on the invoice row, so an invoice is read
// and written as one record. Deletes are soft: deleted rows disappear from
// every query but still count toward the yearly numbering sequence, so a
// number is never handed out twice.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Result};
use crate::modules::invoices::models::{
    DiscountType, Invoice, InvoiceFilter, InvoicePage, InvoiceStatus, LineItem,
};

/// Storage collaborator for invoices
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Insert a new invoice. A duplicate `(user_id, invoice_number)` or
    /// `public_id` is a `Conflict`.
    async fn create(&self, invoice: &Invoice) -> Result<Invoice>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Invoice>>;

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Invoice>>;

    /// Newest first
    async fn list(&self, user_id: &str, filter: &InvoiceFilter) -> Result<InvoicePage>;

    /// Replace the stored record; `NotFound` if it does not exist
    async fn update(&self, invoice: &Invoice) -> Result<Invoice>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Invoices created by `user_id` in `[start, end)`, deleted ones included
    async fn count_created_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64>;
}

/// Escape LIKE wildcards in user-supplied search text
pub fn sanitize_search_query(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Map an insert failure, turning unique violations into `Conflict`
pub(crate) fn map_insert_error(err: sqlx::Error, what: &str) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::conflict(format!("{} already exists", what));
        }
    }
    AppError::Database(err)
}

const INVOICE_COLUMNS: &str = r#"
    id, user_id, client_id, invoice_number, status,
    client_name, client_email, client_phone, client_address, client_tax_id,
    items, subtotal_cents, discount_cents, discount_type, discount_value,
    tax_rate, tax_cents, total_cents, currency,
    issue_date, due_date, sent_date, viewed_date, paid_date,
    notes, payment_instructions, terms, footer,
    public_id, public_url, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    user_id: String,
    client_id: Option<String>,
    invoice_number: String,
    status: String,
    client_name: String,
    client_email: Option<String>,
    client_phone: Option<String>,
    client_address: Option<String>,
    client_tax_id: Option<String>,
    items: Json<Vec<LineItem>>,
    subtotal_cents: i64,
    discount_cents: i64,
    discount_type: String,
    discount_value: Decimal,
    tax_rate: Decimal,
    tax_cents: i64,
    total_cents: i64,
    currency: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    sent_date: Option<DateTime<Utc>>,
    viewed_date: Option<DateTime<Utc>>,
    paid_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    payment_instructions: Option<String>,
    terms: Option<String>,
    footer: Option<String>,
    public_id: String,
    public_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = AppError;

    fn try_from(row: InvoiceRow) -> Result<Self> {
        let status: InvoiceStatus = row
            .status
            .parse()
            .map_err(|e: String| AppError::internal(format!("Corrupt invoice {}: {}", row.id, e)))?;
        let discount_type: DiscountType = row
            .discount_type
            .parse()
            .map_err(|e: String| AppError::internal(format!("Corrupt invoice {}: {}", row.id, e)))?;

        Ok(Invoice {
            id: row.id,
            user_id: row.user_id,
            client_id: row.client_id,
            invoice_number: row.invoice_number,
            status,
            client_name: row.client_name,
            client_email: row.client_email,
            client_phone: row.client_phone,
            client_address: row.client_address,
            client_tax_id: row.client_tax_id,
            items: row.items.0,
            subtotal_cents: row.subtotal_cents,
            discount_cents: row.discount_cents,
            discount_type,
            discount_value: row.discount_value,
            tax_rate: row.tax_rate,
            tax_cents: row.tax_cents,
            total_cents: row.total_cents,
            currency: row.currency,
            issue_date: row.issue_date,
            due_date: row.due_date,
            sent_date: row.sent_date,
            viewed_date: row.viewed_date,
            paid_date: row.paid_date,
            notes: row.notes,
            payment_instructions: row.payment_instructions,
            terms: row.terms,
            footer: row.footer,
            public_id: row.public_id,
            public_url: row.public_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// MySQL-backed invoice repository
pub struct MySqlInvoiceRepository {
    pool: MySqlPool,
}

impl MySqlInvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Invoice>> {
        let sql = format!(
            "SELECT {} FROM invoices WHERE {} = ? AND deleted_at IS NULL",
            INVOICE_COLUMNS, column
        );

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, MySql>, user_id: &str, filter: &InvoiceFilter) {
    builder.push(" WHERE deleted_at IS NULL AND user_id = ");
    builder.push_bind(user_id.to_string());

    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", sanitize_search_query(search));
        builder.push(" AND (client_name LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR invoice_number LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl InvoiceRepository for MySqlInvoiceRepository {
    async fn create(&self, invoice: &Invoice) -> Result<Invoice> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, user_id, client_id, invoice_number, status,
                client_name, client_email, client_phone, client_address, client_tax_id,
                items, subtotal_cents, discount_cents, discount_type, discount_value,
                tax_rate, tax_cents, total_cents, currency,
                issue_date, due_date, sent_date, viewed_date, paid_date,
                notes, payment_instructions, terms, footer,
                public_id, public_url, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.user_id)
        .bind(&invoice.client_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.status.as_str())
        .bind(&invoice.client_name)
        .bind(&invoice.client_email)
        .bind(&invoice.client_phone)
        .bind(&invoice.client_address)
        .bind(&invoice.client_tax_id)
        .bind(Json(&invoice.items))
        .bind(invoice.subtotal_cents)
        .bind(invoice.discount_cents)
        .bind(invoice.discount_type.as_str())
        .bind(invoice.discount_value)
        .bind(invoice.tax_rate)
        .bind(invoice.tax_cents)
        .bind(invoice.total_cents)
        .bind(&invoice.currency)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.sent_date)
        .bind(invoice.viewed_date)
        .bind(invoice.paid_date)
        .bind(&invoice.notes)
        .bind(&invoice.payment_instructions)
        .bind(&invoice.terms)
        .bind(&invoice.footer)
        .bind(&invoice.public_id)
        .bind(&invoice.public_url)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &format!("Invoice {}", invoice.invoice_number)))?;

        Ok(invoice.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Invoice>> {
        self.find_one("id", id).await
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Invoice>> {
        self.find_one("public_id", public_id).await
    }

    async fn list(&self, user_id: &str, filter: &InvoiceFilter) -> Result<InvoicePage> {
        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM invoices");
        push_filter(&mut count_query, user_id, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<MySql>::new(format!("SELECT {} FROM invoices", INVOICE_COLUMNS));
        push_filter(&mut select, user_id, filter);
        select.push(" ORDER BY created_at DESC, invoice_number DESC LIMIT ");
        select.push_bind(filter.effective_limit());
        select.push(" OFFSET ");
        select.push_bind(filter.effective_offset());

        let rows = select
            .build_query_as::<InvoiceRow>()
            .fetch_all(&self.pool)
            .await?;

        let invoices = rows
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(InvoicePage { invoices, total })
    }

    async fn update(&self, invoice: &Invoice) -> Result<Invoice> {
        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                client_id = ?, status = ?,
                client_name = ?, client_email = ?, client_phone = ?,
                client_address = ?, client_tax_id = ?,
                items = ?, subtotal_cents = ?, discount_cents = ?,
                discount_type = ?, discount_value = ?,
                tax_rate = ?, tax_cents = ?, total_cents = ?, currency = ?,
                issue_date = ?, due_date = ?,
                sent_date = ?, viewed_date = ?, paid_date = ?,
                notes = ?, payment_instructions = ?, terms = ?, footer = ?,
                updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&invoice.client_id)
        .bind(invoice.status.as_str())
        .bind(&invoice.client_name)
        .bind(&invoice.client_email)
        .bind(&invoice.client_phone)
        .bind(&invoice.client_address)
        .bind(&invoice.client_tax_id)
        .bind(Json(&invoice.items))
        .bind(invoice.subtotal_cents)
        .bind(invoice.discount_cents)
        .bind(invoice.discount_type.as_str())
        .bind(invoice.discount_value)
        .bind(invoice.tax_rate)
        .bind(invoice.tax_cents)
        .bind(invoice.total_cents)
        .bind(&invoice.currency)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.sent_date)
        .bind(invoice.viewed_date)
        .bind(invoice.paid_date)
        .bind(&invoice.notes)
        .bind(&invoice.payment_instructions)
        .bind(&invoice.terms)
        .bind(&invoice.footer)
        .bind(invoice.updated_at)
        .bind(&invoice.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Invoice"));
        }

        Ok(invoice.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE invoices SET deleted_at = CURRENT_TIMESTAMP WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_created_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM invoices
            WHERE user_id = ? AND created_at >= ? AND created_at < ?
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
