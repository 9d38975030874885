use std::path::Path;

use serde::{Deserialize, Serialize};
use snm_core::ServiceError;

use crate::model::SerialNoStatus;

/// Module configuration, read from `serial.toml`.
///
/// ```toml
/// available_status = "Active"
/// delivery_candidate_limit = 5
///
/// [invoice_link]
/// doctype = "Serial No"
/// date_field = "custom_sales_invoice_date"
/// invoice_field = "custom_sales_invoice"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Stock status that makes a serial number eligible for auto-assignment.
    pub available_status: SerialNoStatus,

    /// How many delivery lines to inspect when an invoice line only carries
    /// a sales order reference.
    pub delivery_candidate_limit: usize,

    pub invoice_link: InvoiceLinkConfig,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            available_status: SerialNoStatus::Active,
            delivery_candidate_limit: 5,
            invoice_link: InvoiceLinkConfig::default(),
        }
    }
}

/// Custom fields that must exist on the serial record type before invoice
/// linkage is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceLinkConfig {
    pub doctype: String,
    pub date_field: String,
    pub invoice_field: String,
}

impl Default for InvoiceLinkConfig {
    fn default() -> Self {
        Self {
            doctype: "Serial No".to_string(),
            date_field: "custom_sales_invoice_date".to_string(),
            invoice_field: "custom_sales_invoice".to_string(),
        }
    }
}

impl SerialConfig {
    /// Load config from disk, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Storage(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ServiceError> {
        let config: SerialConfig =
            toml::from_str(content).map_err(|e| ServiceError::Validation(e.to_string()))?;
        if config.delivery_candidate_limit == 0 {
            return Err(ServiceError::Validation(
                "delivery_candidate_limit must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}
