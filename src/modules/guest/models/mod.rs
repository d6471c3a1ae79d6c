mod guest_invoice;

pub use guest_invoice::{
    guest_invoice_number, GuestDraftState, GuestDraftStatus, GuestInvoice, GuestInvoiceForm,
    GuestLineItem, GuestParty,
};
