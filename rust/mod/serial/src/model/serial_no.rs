use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stock status of a serial number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SerialNoStatus {
    /// In stock and free to deliver.
    #[default]
    Active,
    Inactive,
    Delivered,
    Expired,
}

impl SerialNoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerialNoStatus::Active => "Active",
            SerialNoStatus::Inactive => "Inactive",
            SerialNoStatus::Delivered => "Delivered",
            SerialNoStatus::Expired => "Expired",
        }
    }
}

/// Serial number record. PK = name (the serial number itself).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SerialNo {
    pub name: String,

    pub item_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,

    #[serde(default)]
    pub status: SerialNoStatus,

    /// Creation time; FIFO assignment consumes the oldest first.
    pub creation: DateTime<Utc>,

    /// Invoice that billed this serial number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_invoice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_invoice_date: Option<NaiveDate>,
}

impl SerialNo {
    /// An active serial number created now.
    pub fn new(name: impl Into<String>, item_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item_code: item_code.into(),
            warehouse: None,
            status: SerialNoStatus::Active,
            creation: Utc::now(),
            sales_invoice: None,
            sales_invoice_date: None,
        }
    }

    pub fn in_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn created_at(mut self, creation: DateTime<Utc>) -> Self {
        self.creation = creation;
        self
    }

    pub fn with_status(mut self, status: SerialNoStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_host_spelling() {
        assert_eq!(serde_json::to_string(&SerialNoStatus::Active).unwrap(), "\"Active\"");
        assert_eq!(SerialNoStatus::Delivered.as_str(), "Delivered");
        assert_eq!(SerialNoStatus::default(), SerialNoStatus::Active);
    }

    #[test]
    fn test_unlinked_serial_omits_invoice_fields() {
        let sn = SerialNo::new("SN-001", "LAPTOP").in_warehouse("Stores - AC");
        let json = serde_json::to_value(&sn).unwrap();
        assert_eq!(json["status"], "Active");
        assert!(json.get("salesInvoice").is_none());
        assert!(json.get("salesInvoiceDate").is_none());
    }
}
