use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document lifecycle state. Serialized as the host's integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DocStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

impl From<DocStatus> for u8 {
    fn from(status: DocStatus) -> u8 {
        match status {
            DocStatus::Draft => 0,
            DocStatus::Submitted => 1,
            DocStatus::Cancelled => 2,
        }
    }
}

impl TryFrom<u8> for DocStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DocStatus::Draft),
            1 => Ok(DocStatus::Submitted),
            2 => Ok(DocStatus::Cancelled),
            other => Err(format!("invalid docstatus {other}")),
        }
    }
}

/// How a line item carries its serial numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum SerialAssignment {
    /// Reference to a serial-and-batch bundle whose entries hold the serials.
    Bundle(String),
    /// Legacy newline-separated serial numbers stored on the item itself.
    Inline(String),
}

impl SerialAssignment {
    pub fn bundle_id(&self) -> Option<&str> {
        match self {
            SerialAssignment::Bundle(id) => Some(id),
            SerialAssignment::Inline(_) => None,
        }
    }
}

/// Split legacy serial text into trimmed, non-empty serial numbers.
pub fn parse_inline_serials(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A delivery note line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Row id.
    pub name: String,

    pub item_code: String,

    /// Ordered quantity. Lines with `quantity <= 0` are not serialized.
    pub quantity: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,

    /// Sales order line this row fulfils.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_assignment: Option<SerialAssignment>,

    /// Free-text (HTML) description.
    #[serde(default)]
    pub description: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, item_code: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            item_code: item_code.into(),
            quantity,
            warehouse: None,
            so_detail: None,
            serial_assignment: None,
            description: String::new(),
        }
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_so_detail(mut self, so_detail: impl Into<String>) -> Self {
        self.so_detail = Some(so_detail.into());
        self
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.serial_assignment = Some(SerialAssignment::Bundle(bundle.into()));
        self
    }

    pub fn with_inline_serials(mut self, text: impl Into<String>) -> Self {
        self.serial_assignment = Some(SerialAssignment::Inline(text.into()));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.serial_assignment.as_ref().and_then(SerialAssignment::bundle_id)
    }
}

/// Delivery note, the fulfillment document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNote {
    pub name: String,

    #[serde(default)]
    pub docstatus: DocStatus,

    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl DeliveryNote {
    pub fn new(name: impl Into<String>, items: Vec<LineItem>) -> Self {
        Self {
            name: name.into(),
            docstatus: DocStatus::Draft,
            items,
        }
    }
}

/// A sales invoice line, linked back to what was delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub name: String,

    pub item_code: String,

    pub quantity: i64,

    #[serde(default)]
    pub description: String,

    /// Delivery note line this row was billed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dn_detail: Option<String>,

    /// Sales order line this row was billed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_detail: Option<String>,
}

impl InvoiceItem {
    pub fn new(name: impl Into<String>, item_code: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            item_code: item_code.into(),
            quantity,
            description: String::new(),
            dn_detail: None,
            so_detail: None,
        }
    }

    pub fn with_dn_detail(mut self, dn_detail: impl Into<String>) -> Self {
        self.dn_detail = Some(dn_detail.into());
        self
    }

    pub fn with_so_detail(mut self, so_detail: impl Into<String>) -> Self {
        self.so_detail = Some(so_detail.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Sales invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesInvoice {
    pub name: String,

    #[serde(default)]
    pub docstatus: DocStatus,

    /// Used as the invoice date stamped on serial records; today when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posting_date: Option<NaiveDate>,

    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

impl SalesInvoice {
    pub fn new(name: impl Into<String>, items: Vec<InvoiceItem>) -> Self {
        Self {
            name: name.into(),
            docstatus: DocStatus::Draft,
            posting_date: None,
            items,
        }
    }
}
