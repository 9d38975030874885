use serde::{Deserialize, Serialize};

use super::DocStatus;

/// Persisted delivery note line, as the invoice side looks it up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryItemRecord {
    /// Row id; invoice lines refer to it as `dn_detail`.
    pub name: String,

    /// Owning delivery note.
    pub parent: String,

    pub item_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_and_batch_bundle: Option<String>,

    #[serde(default)]
    pub description: String,
}

/// Persisted delivery note header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNoteRecord {
    pub name: String,

    #[serde(default)]
    pub docstatus: DocStatus,
}

/// A custom field installed on a host document type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    /// Document type the field is installed on, e.g. `"Serial No"`.
    pub dt: String,

    pub fieldname: String,

    pub fieldtype: String,
}

impl CustomField {
    /// Host record id: `"{dt}-{fieldname}"`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.dt, self.fieldname)
    }
}

/// Persisted error report for operational follow-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLog {
    pub id: String,
    pub title: String,
    pub message: String,
    pub create_at: String,
}
