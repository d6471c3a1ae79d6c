// Test data factory
//
// Decimal inputs are sent as strings, the way the browser forms submit them.

use rust_decimal::Decimal;
use serde_json::{json, Value};

use quickbill::modules::guest::models::{GuestInvoiceForm, GuestLineItem};
use quickbill::modules::invoices::models::{DiscountType, InvoiceForm, LineItemForm};

pub fn line(description: &str, quantity: Decimal, unit_price: Decimal) -> LineItemForm {
    LineItemForm {
        description: description.to_string(),
        quantity,
        unit_price,
        unit: None,
    }
}

/// Minimal valid form: one client name, the given items, no tax or discount
pub fn invoice_form(client_name: &str, items: Vec<LineItemForm>) -> InvoiceForm {
    InvoiceForm {
        client_id: None,
        client_name: client_name.to_string(),
        client_email: None,
        client_phone: None,
        client_address: None,
        client_tax_id: None,
        items,
        tax_rate: Decimal::ZERO,
        discount_type: DiscountType::Fixed,
        discount_value: Decimal::ZERO,
        due_date: "2024-07-15".to_string(),
        currency: "USD".to_string(),
        notes: None,
        payment_instructions: None,
    }
}

pub fn guest_item(id: &str, quantity: Decimal, unit_price: Decimal) -> GuestLineItem {
    GuestLineItem {
        id: id.to_string(),
        description: format!("Item {}", id),
        quantity,
        unit_price,
    }
}

pub fn guest_form(items: Vec<GuestLineItem>, tax_rate: Decimal) -> GuestInvoiceForm {
    GuestInvoiceForm {
        from_name: "Jo's Studio".to_string(),
        from_email: Some("jo@studio.test".to_string()),
        from_address: None,
        to_name: "Acme Corp".to_string(),
        to_email: None,
        to_phone: None,
        to_address: Some("1 Main St".to_string()),
        items,
        tax_rate,
        currency: "USD".to_string(),
        notes: None,
        due_date: "2024-07-15".to_string(),
    }
}

/// POST /invoices body totalling $248.39: 2 × $100.00 + 1 × $48.39
pub fn invoice_payload() -> Value {
    json!({
        "client_name": "Acme Corp",
        "client_email": "ap@acme.test",
        "items": [
            { "description": "Design", "quantity": "2", "unit_price": "100.00" },
            { "description": "Hosting", "quantity": "1", "unit_price": "48.39" }
        ],
        "due_date": "2024-07-15"
    })
}

pub fn guest_payload() -> Value {
    json!({
        "from_name": "Jo's Studio",
        "to_name": "Acme Corp",
        "items": [
            { "id": "1", "description": "Logo", "quantity": "3", "unit_price": "33.33" }
        ],
        "tax_rate": "10",
        "due_date": "2024-07-15"
    })
}
