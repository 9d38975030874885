//! Collaborator contracts the hooks run against.
//!
//! The host platform owns documents, records, and user messaging; the hooks
//! only see these traits. [`crate::store_impls::KvHost`] implements the
//! storage side over a [`snm_kv::KVStore`].

use chrono::NaiveDate;
use snm_core::ServiceError;

use crate::model::{DeliveryItemRecord, DocStatus, SerialNo, SerialNoStatus};

/// Record reads and writes by id.
pub trait DocumentStore: Send + Sync {
    fn bundle_exists(&self, bundle: &str) -> Result<bool, ServiceError>;

    /// Delete a bundle and its entries.
    fn delete_bundle(&self, bundle: &str) -> Result<(), ServiceError>;

    fn serial_no_exists(&self, serial_no: &str) -> Result<bool, ServiceError>;

    /// Stamp invoice linkage onto a serial record without running validation.
    fn link_serial_to_invoice(
        &self,
        serial_no: &str,
        sales_invoice: &str,
        invoice_date: NaiveDate,
    ) -> Result<(), ServiceError>;

    fn delivery_item(&self, name: &str) -> Result<Option<DeliveryItemRecord>, ServiceError>;

    fn delivery_note_status(&self, name: &str) -> Result<Option<DocStatus>, ServiceError>;

    /// Whether `fieldname` is installed as a custom field on `doctype`.
    fn has_custom_field(&self, doctype: &str, fieldname: &str) -> Result<bool, ServiceError>;

    /// Write a delivery line description after its document was finalized.
    fn set_delivery_item_description(
        &self,
        item: &str,
        description: &str,
    ) -> Result<(), ServiceError>;
}

/// Filter for [`QueryService::available_serial_numbers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableSerials<'a> {
    pub item_code: &'a str,
    /// `None` matches every warehouse.
    pub warehouse: Option<&'a str>,
    pub status: SerialNoStatus,
    pub limit: usize,
}

/// Filtered, ordered, limited lookups.
pub trait QueryService: Send + Sync {
    /// Number of bundle entries carrying a non-empty serial number.
    fn count_bundle_entries(&self, bundle: &str) -> Result<usize, ServiceError>;

    /// Serial numbers recorded in a bundle, sorted ascending.
    fn bundle_serial_numbers(&self, bundle: &str) -> Result<Vec<String>, ServiceError>;

    /// Matching serial records, oldest first, at most `filter.limit`.
    fn available_serial_numbers(
        &self,
        filter: &AvailableSerials<'_>,
    ) -> Result<Vec<SerialNo>, ServiceError>;

    /// Delivery lines fulfilling the given sales order line, at most `limit`.
    fn delivery_items_for_order_line(
        &self,
        so_detail: &str,
        limit: usize,
    ) -> Result<Vec<DeliveryItemRecord>, ServiceError>;
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

impl NoticeLevel {
    /// Host alert indicator colour.
    pub fn indicator(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "blue",
            NoticeLevel::Warning => "orange",
        }
    }
}

/// A transient alert shown to the user who triggered the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

/// User-visible message sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Persistent error reports, independent of user notices.
pub trait ErrorReporter: Send + Sync {
    fn log_error(&self, title: &str, message: &str);
}
