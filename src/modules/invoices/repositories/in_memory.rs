use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::invoice_repository::InvoiceRepository;
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{Invoice, InvoiceFilter, InvoicePage};

#[derive(Debug, Clone)]
struct Stored {
    invoice: Invoice,
    deleted: bool,
}

/// Process-local invoice store for tests and `STORAGE=memory` runs
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<HashMap<String, Stored>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_search(invoice: &Invoice, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || invoice.client_name.to_lowercase().contains(&needle)
        || invoice.invoice_number.to_lowercase().contains(&needle)
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn create(&self, invoice: &Invoice) -> Result<Invoice> {
        let mut invoices = self.invoices.write().await;

        let clash = invoices.values().any(|s| {
            s.invoice.id == invoice.id
                || s.invoice.public_id == invoice.public_id
                || (s.invoice.user_id == invoice.user_id
                    && s.invoice.invoice_number == invoice.invoice_number)
        });
        if clash {
            return Err(AppError::conflict(format!(
                "Invoice {} already exists",
                invoice.invoice_number
            )));
        }

        invoices.insert(
            invoice.id.clone(),
            Stored {
                invoice: invoice.clone(),
                deleted: false,
            },
        );
        Ok(invoice.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Invoice>> {
        let invoices = self.invoices.read().await;
        Ok(invoices
            .get(id)
            .filter(|s| !s.deleted)
            .map(|s| s.invoice.clone()))
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Invoice>> {
        let invoices = self.invoices.read().await;
        Ok(invoices
            .values()
            .find(|s| !s.deleted && s.invoice.public_id == public_id)
            .map(|s| s.invoice.clone()))
    }

    async fn list(&self, user_id: &str, filter: &InvoiceFilter) -> Result<InvoicePage> {
        let invoices = self.invoices.read().await;

        let mut matching: Vec<&Invoice> = invoices
            .values()
            .filter(|s| !s.deleted && s.invoice.user_id == user_id)
            .map(|s| &s.invoice)
            .filter(|i| filter.status.map_or(true, |status| i.status == status))
            .filter(|i| {
                filter
                    .search
                    .as_deref()
                    .map_or(true, |search| matches_search(i, search))
            })
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.invoice_number.cmp(&a.invoice_number))
        });

        let total = matching.len() as i64;
        let invoices = matching
            .into_iter()
            .skip(filter.effective_offset() as usize)
            .take(filter.effective_limit() as usize)
            .cloned()
            .collect();

        Ok(InvoicePage { invoices, total })
    }

    async fn update(&self, invoice: &Invoice) -> Result<Invoice> {
        let mut invoices = self.invoices.write().await;

        match invoices.get_mut(&invoice.id) {
            Some(stored) if !stored.deleted => {
                stored.invoice = invoice.clone();
                Ok(invoice.clone())
            }
            _ => Err(AppError::not_found("Invoice")),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut invoices = self.invoices.write().await;

        match invoices.get_mut(id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_created_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let invoices = self.invoices.read().await;
        let count = invoices
            .values()
            .filter(|s| {
                s.invoice.user_id == user_id
                    && s.invoice.created_at >= start
                    && s.invoice.created_at < end
            })
            .count();

        Ok(count as i64)
    }
}
