mod form;
mod invoice;
mod line_item;

pub use form::{
    check_discount, parse_date, InvoiceForm, InvoicePatch, LineItemForm, MAX_FIXED_DISCOUNT,
    MAX_ITEMS, MAX_QUANTITY, MAX_UNIT_PRICE,
};
pub(crate) use form::{validate_currency, validate_due_date, validate_items, validate_tax_rate, LineInput};
pub use invoice::{
    DiscountType, DisplayStatus, Invoice, InvoiceDefaults, InvoiceFilter, InvoicePage,
    InvoiceStatus, InvoiceView,
};
pub use line_item::LineItem;
