use serde::{Deserialize, Serialize};

/// Serial-and-batch bundle header. Entries are stored separately and
/// reference the bundle by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub name: String,

    pub item_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_no: Option<String>,
}

/// One row of a bundle. Batch-only rows leave `serial_no` empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub bundle: String,

    pub idx: u32,

    #[serde(default)]
    pub serial_no: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_no: Option<String>,
}

impl BundleEntry {
    pub fn has_serial(&self) -> bool {
        !self.serial_no.trim().is_empty()
    }
}
