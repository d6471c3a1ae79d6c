pub mod calculator;
pub mod invoice_service;
pub mod numbering;
pub mod status;

pub use calculator::{InvoiceCalculator, InvoiceTotals, PricedItem};
pub use invoice_service::InvoiceService;
