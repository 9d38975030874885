pub mod bundle;
pub mod document;
pub mod records;
pub mod serial_no;

pub use bundle::{Bundle, BundleEntry};
pub use document::{
    parse_inline_serials, DeliveryNote, DocStatus, InvoiceItem, LineItem, SalesInvoice,
    SerialAssignment,
};
pub use records::{CustomField, DeliveryItemRecord, DeliveryNoteRecord, ErrorLog};
pub use serial_no::{SerialNo, SerialNoStatus};
