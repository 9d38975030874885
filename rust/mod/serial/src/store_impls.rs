//! KV-backed host: document store, query service, and error log over a
//! [`KVStore`].
//!
//! Records are JSON under namespaced keys:
//!
//! ```text
//! serial_no:{name}                 → SerialNo
//! bundle:{name}                    → Bundle
//! bundle_entry:{bundle}:{idx:04}   → BundleEntry
//! delivery_note:{name}             → DeliveryNoteRecord
//! dn_item:{name}                   → DeliveryItemRecord
//! custom_field:{dt}-{fieldname}    → CustomField
//! error_log:{id}                   → ErrorLog
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use snm_core::{new_id, now_rfc3339, ServiceConfig, ServiceError};
use snm_kv::{KVError, KVStore, RedbStore};

use crate::host::{AvailableSerials, DocumentStore, ErrorReporter, QueryService};
use crate::model::{
    Bundle, BundleEntry, CustomField, DeliveryItemRecord, DeliveryNote, DeliveryNoteRecord,
    DocStatus, ErrorLog, SerialAssignment, SerialNo,
};

const SERIAL_NO: &str = "serial_no:";
const BUNDLE: &str = "bundle:";
const BUNDLE_ENTRY: &str = "bundle_entry:";
const DELIVERY_NOTE: &str = "delivery_note:";
const DN_ITEM: &str = "dn_item:";
const CUSTOM_FIELD: &str = "custom_field:";
const ERROR_LOG: &str = "error_log:";

fn storage(e: KVError) -> ServiceError {
    match e {
        KVError::Serialization(msg) => ServiceError::Internal(msg),
        KVError::Storage(msg) => ServiceError::Storage(msg),
    }
}

fn entry_prefix(bundle: &str) -> String {
    format!("{BUNDLE_ENTRY}{bundle}:")
}

/// Host collaborators backed by one key-value store.
pub struct KvHost {
    kv: Arc<dyn KVStore>,
}

impl KvHost {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    /// Open the redb database named by the service configuration.
    pub fn open(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let path = config.resolve_db_path();
        let kv = RedbStore::open(&path).map_err(storage)?;
        debug!("KvHost: using {}", path.display());
        Ok(Self::new(Arc::new(kv)))
    }

    // ── Generic record helpers ──

    fn get_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ServiceError> {
        match self.kv.get(key).map_err(storage)? {
            Some(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(|e| ServiceError::Internal(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    fn put_record<T: Serialize>(&self, key: &str, record: &T) -> Result<(), ServiceError> {
        let data =
            serde_json::to_vec(record).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv.set(key, &data).map_err(storage)
    }

    fn scan_records<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, ServiceError> {
        let rows = self.kv.scan(prefix).map_err(storage)?;
        let mut records = Vec::with_capacity(rows.len());
        for (key, value) in rows {
            let record = serde_json::from_slice(&value)
                .map_err(|e| ServiceError::Internal(format!("{key}: {e}")))?;
            records.push(record);
        }
        Ok(records)
    }

    fn bundle_entries(&self, bundle: &str) -> Result<Vec<BundleEntry>, ServiceError> {
        self.scan_records(&entry_prefix(bundle))
    }

    // ── Record maintenance ──

    pub fn put_serial_no(&self, serial: &SerialNo) -> Result<(), ServiceError> {
        self.put_record(&format!("{SERIAL_NO}{}", serial.name), serial)
    }

    pub fn get_serial_no(&self, name: &str) -> Result<Option<SerialNo>, ServiceError> {
        self.get_record(&format!("{SERIAL_NO}{name}"))
    }

    /// Create a bundle whose entries list `serial_numbers` in order.
    pub fn put_bundle(&self, bundle: &Bundle, serial_numbers: &[&str]) -> Result<(), ServiceError> {
        self.put_record(&format!("{BUNDLE}{}", bundle.name), bundle)?;
        for (i, sn) in serial_numbers.iter().enumerate() {
            let entry = BundleEntry {
                bundle: bundle.name.clone(),
                idx: i as u32 + 1,
                serial_no: sn.to_string(),
                batch_no: None,
            };
            self.put_record(&format!("{}{:04}", entry_prefix(&bundle.name), entry.idx), &entry)?;
        }
        Ok(())
    }

    pub fn put_custom_field(&self, field: &CustomField) -> Result<(), ServiceError> {
        self.put_record(&format!("{CUSTOM_FIELD}{}", field.id()), field)
    }

    /// Persist a delivery note's header and lines so invoices can find them.
    pub fn save_delivery_note(&self, note: &DeliveryNote) -> Result<(), ServiceError> {
        let header = DeliveryNoteRecord {
            name: note.name.clone(),
            docstatus: note.docstatus,
        };
        self.put_record(&format!("{DELIVERY_NOTE}{}", note.name), &header)?;

        for item in &note.items {
            let record = DeliveryItemRecord {
                name: item.name.clone(),
                parent: note.name.clone(),
                item_code: item.item_code.clone(),
                so_detail: item.so_detail.clone(),
                serial_and_batch_bundle: item
                    .serial_assignment
                    .as_ref()
                    .and_then(SerialAssignment::bundle_id)
                    .map(str::to_string),
                description: item.description.clone(),
            };
            self.put_record(&format!("{DN_ITEM}{}", item.name), &record)?;
        }
        Ok(())
    }

    /// All persisted error reports, oldest key first.
    pub fn error_logs(&self) -> Result<Vec<ErrorLog>, ServiceError> {
        self.scan_records(ERROR_LOG)
    }
}

impl DocumentStore for KvHost {
    fn bundle_exists(&self, bundle: &str) -> Result<bool, ServiceError> {
        Ok(self.kv.get(&format!("{BUNDLE}{bundle}")).map_err(storage)?.is_some())
    }

    fn delete_bundle(&self, bundle: &str) -> Result<(), ServiceError> {
        let header = format!("{BUNDLE}{bundle}");
        let entries: Vec<String> = self
            .kv
            .scan(&entry_prefix(bundle))
            .map_err(storage)?
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        let mut keys: Vec<&str> = entries.iter().map(String::as_str).collect();
        keys.push(&header);
        self.kv.batch_delete(&keys).map_err(storage)
    }

    fn serial_no_exists(&self, serial_no: &str) -> Result<bool, ServiceError> {
        Ok(self.kv.get(&format!("{SERIAL_NO}{serial_no}")).map_err(storage)?.is_some())
    }

    fn link_serial_to_invoice(
        &self,
        serial_no: &str,
        sales_invoice: &str,
        invoice_date: NaiveDate,
    ) -> Result<(), ServiceError> {
        let mut serial = self
            .get_serial_no(serial_no)?
            .ok_or_else(|| ServiceError::NotFound(format!("Serial No {serial_no}")))?;
        serial.sales_invoice = Some(sales_invoice.to_string());
        serial.sales_invoice_date = Some(invoice_date);
        self.put_serial_no(&serial)
    }

    fn delivery_item(&self, name: &str) -> Result<Option<DeliveryItemRecord>, ServiceError> {
        self.get_record(&format!("{DN_ITEM}{name}"))
    }

    fn delivery_note_status(&self, name: &str) -> Result<Option<DocStatus>, ServiceError> {
        let header: Option<DeliveryNoteRecord> =
            self.get_record(&format!("{DELIVERY_NOTE}{name}"))?;
        Ok(header.map(|h| h.docstatus))
    }

    fn has_custom_field(&self, doctype: &str, fieldname: &str) -> Result<bool, ServiceError> {
        let key = format!("{CUSTOM_FIELD}{doctype}-{fieldname}");
        Ok(self.kv.get(&key).map_err(storage)?.is_some())
    }

    fn set_delivery_item_description(
        &self,
        item: &str,
        description: &str,
    ) -> Result<(), ServiceError> {
        let key = format!("{DN_ITEM}{item}");
        let mut record: DeliveryItemRecord = self
            .get_record(&key)?
            .ok_or_else(|| ServiceError::NotFound(format!("Delivery Note Item {item}")))?;
        record.description = description.to_string();
        self.put_record(&key, &record)
    }
}

impl QueryService for KvHost {
    fn count_bundle_entries(&self, bundle: &str) -> Result<usize, ServiceError> {
        Ok(self.bundle_entries(bundle)?.iter().filter(|e| e.has_serial()).count())
    }

    fn bundle_serial_numbers(&self, bundle: &str) -> Result<Vec<String>, ServiceError> {
        let mut serials: Vec<String> = self
            .bundle_entries(bundle)?
            .into_iter()
            .filter(BundleEntry::has_serial)
            .map(|e| e.serial_no.trim().to_string())
            .collect();
        serials.sort();
        Ok(serials)
    }

    fn available_serial_numbers(
        &self,
        filter: &AvailableSerials<'_>,
    ) -> Result<Vec<SerialNo>, ServiceError> {
        let mut matches: Vec<SerialNo> = self
            .scan_records::<SerialNo>(SERIAL_NO)?
            .into_iter()
            .filter(|sn| sn.item_code == filter.item_code && sn.status == filter.status)
            .filter(|sn| match filter.warehouse {
                Some(wh) => sn.warehouse.as_deref() == Some(wh),
                None => true,
            })
            .collect();

        matches.sort_by(|a, b| a.creation.cmp(&b.creation).then_with(|| a.name.cmp(&b.name)));
        matches.truncate(filter.limit);
        Ok(matches)
    }

    fn delivery_items_for_order_line(
        &self,
        so_detail: &str,
        limit: usize,
    ) -> Result<Vec<DeliveryItemRecord>, ServiceError> {
        Ok(self
            .scan_records::<DeliveryItemRecord>(DN_ITEM)?
            .into_iter()
            .filter(|item| item.so_detail.as_deref() == Some(so_detail))
            .take(limit)
            .collect())
    }
}

impl ErrorReporter for KvHost {
    fn log_error(&self, title: &str, message: &str) {
        let record = ErrorLog {
            id: new_id(),
            title: title.to_string(),
            message: message.to_string(),
            create_at: now_rfc3339(),
        };
        error!(title, "{}", message);

        let key = format!("{ERROR_LOG}{}-{}", record.create_at, record.id);
        if let Err(e) = self.put_record(&key, &record) {
            error!(code = e.error_code(), "failed to persist error log '{}': {}", title, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::model::{LineItem, SerialNoStatus};

    fn test_host() -> (tempfile::NamedTempFile, KvHost) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let kv = RedbStore::open(tmp.path()).unwrap();
        (tmp, KvHost::new(Arc::new(kv)))
    }

    fn bundle(name: &str) -> Bundle {
        Bundle {
            name: name.into(),
            item_code: "LAPTOP".into(),
            voucher_type: Some("Delivery Note".into()),
            voucher_no: None,
        }
    }

    #[test]
    fn test_bundle_entries_count_and_sort() {
        let (_tmp, host) = test_host();
        host.put_bundle(&bundle("SABB-1"), &["SN-3", "SN-1", " ", "SN-2"]).unwrap();
        host.put_bundle(&bundle("SABB-10"), &["OTHER"]).unwrap();

        assert_eq!(host.count_bundle_entries("SABB-1").unwrap(), 3);
        assert_eq!(
            host.bundle_serial_numbers("SABB-1").unwrap(),
            vec!["SN-1", "SN-2", "SN-3"]
        );
        assert_eq!(host.count_bundle_entries("missing").unwrap(), 0);
    }

    #[test]
    fn test_delete_bundle_removes_header_and_entries() {
        let (_tmp, host) = test_host();
        host.put_bundle(&bundle("SABB-1"), &["SN-1", "SN-2"]).unwrap();
        host.put_bundle(&bundle("SABB-10"), &["SN-9"]).unwrap();

        host.delete_bundle("SABB-1").unwrap();
        assert!(!host.bundle_exists("SABB-1").unwrap());
        assert_eq!(host.count_bundle_entries("SABB-1").unwrap(), 0);
        // Sibling bundle with a shared name prefix is untouched.
        assert_eq!(host.count_bundle_entries("SABB-10").unwrap(), 1);
    }

    #[test]
    fn test_available_serials_fifo_and_scoped() {
        let (_tmp, host) = test_host();
        let base = Utc::now() - Duration::days(10);
        for (i, name) in ["SN-C", "SN-A", "SN-B"].iter().enumerate() {
            let sn = SerialNo::new(*name, "LAPTOP")
                .in_warehouse("Stores")
                .created_at(base + Duration::days(i as i64));
            host.put_serial_no(&sn).unwrap();
        }
        host.put_serial_no(&SerialNo::new("SN-0", "LAPTOP").in_warehouse("Other").created_at(base))
            .unwrap();
        host.put_serial_no(
            &SerialNo::new("SN-D", "LAPTOP")
                .in_warehouse("Stores")
                .created_at(base - Duration::days(1))
                .with_status(SerialNoStatus::Delivered),
        )
        .unwrap();

        let found = host
            .available_serial_numbers(&AvailableSerials {
                item_code: "LAPTOP",
                warehouse: Some("Stores"),
                status: SerialNoStatus::Active,
                limit: 2,
            })
            .unwrap();
        let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["SN-C", "SN-A"]);

        // No warehouse: every warehouse counts, still oldest first.
        let found = host
            .available_serial_numbers(&AvailableSerials {
                item_code: "LAPTOP",
                warehouse: None,
                status: SerialNoStatus::Active,
                limit: 10,
            })
            .unwrap();
        let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["SN-0", "SN-C", "SN-A", "SN-B"]);
    }

    #[test]
    fn test_link_serial_to_invoice_updates_record() {
        let (_tmp, host) = test_host();
        host.put_serial_no(&SerialNo::new("SN-1", "LAPTOP")).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 2, 22).unwrap();

        host.link_serial_to_invoice("SN-1", "SINV-0001", date).unwrap();
        let sn = host.get_serial_no("SN-1").unwrap().unwrap();
        assert_eq!(sn.sales_invoice.as_deref(), Some("SINV-0001"));
        assert_eq!(sn.sales_invoice_date, Some(date));

        let err = host.link_serial_to_invoice("SN-404", "SINV-0001", date).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_save_delivery_note_indexes_lines() {
        let (_tmp, host) = test_host();
        let mut note = DeliveryNote::new(
            "DN-0001",
            vec![
                LineItem::new("dn-row-1", "LAPTOP", 2)
                    .with_so_detail("so-row-1")
                    .with_bundle("SABB-1"),
                LineItem::new("dn-row-2", "CABLE", 5).with_so_detail("so-row-2"),
            ],
        );
        note.docstatus = DocStatus::Submitted;
        host.save_delivery_note(&note).unwrap();

        assert_eq!(host.delivery_note_status("DN-0001").unwrap(), Some(DocStatus::Submitted));
        let row = host.delivery_item("dn-row-1").unwrap().unwrap();
        assert_eq!(row.parent, "DN-0001");
        assert_eq!(row.serial_and_batch_bundle.as_deref(), Some("SABB-1"));

        let by_order = host.delivery_items_for_order_line("so-row-2", 5).unwrap();
        assert_eq!(by_order.len(), 1);
        assert_eq!(by_order[0].name, "dn-row-2");

        host.set_delivery_item_description("dn-row-2", "<p>Cable</p>").unwrap();
        assert_eq!(host.delivery_item("dn-row-2").unwrap().unwrap().description, "<p>Cable</p>");
    }

    #[test]
    fn test_open_from_service_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::from_args(&[format!("--data-dir={}", dir.path().display())]);
        let host = KvHost::open(&config).unwrap();
        host.put_serial_no(&SerialNo::new("SN-1", "LAPTOP")).unwrap();
        assert!(host.serial_no_exists("SN-1").unwrap());
        assert!(dir.path().join("data.redb").exists());
    }

    #[test]
    fn test_custom_fields_and_error_logs() {
        let (_tmp, host) = test_host();
        assert!(!host.has_custom_field("Serial No", "custom_sales_invoice").unwrap());
        host.put_custom_field(&CustomField {
            dt: "Serial No".into(),
            fieldname: "custom_sales_invoice".into(),
            fieldtype: "Link".into(),
        })
        .unwrap();
        assert!(host.has_custom_field("Serial No", "custom_sales_invoice").unwrap());

        host.log_error("Serial No Update Failed", "fields missing");
        let logs = host.error_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].title, "Serial No Update Failed");
        assert_eq!(logs[0].id.len(), 32);
    }
}
