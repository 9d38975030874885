//! Routing from host lifecycle events to hooks.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::model::{DeliveryNote, SalesInvoice};
use crate::service::{AnnotateReport, LinkReport, ReconcileReport, SerialService};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown document event: {0}")]
    UnknownEvent(String),

    #[error("unknown doctype: {0}")]
    UnknownDoctype(String),

    #[error("event registered for {expected} but document is a {actual}")]
    DoctypeMismatch { expected: Doctype, actual: Doctype },
}

/// Document lifecycle events the module listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocEvent {
    Validate,
    OnUpdate,
    BeforeSubmit,
    OnSubmit,
}

impl DocEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocEvent::Validate => "validate",
            DocEvent::OnUpdate => "on_update",
            DocEvent::BeforeSubmit => "before_submit",
            DocEvent::OnSubmit => "on_submit",
        }
    }
}

impl FromStr for DocEvent {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "validate" => Ok(DocEvent::Validate),
            "on_update" => Ok(DocEvent::OnUpdate),
            "before_submit" => Ok(DocEvent::BeforeSubmit),
            "on_submit" => Ok(DocEvent::OnSubmit),
            other => Err(DispatchError::UnknownEvent(other.to_string())),
        }
    }
}

/// Host document types the module handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Doctype {
    DeliveryNote,
    SalesInvoice,
}

impl Doctype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Doctype::DeliveryNote => "Delivery Note",
            Doctype::SalesInvoice => "Sales Invoice",
        }
    }
}

impl fmt::Display for Doctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Doctype {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delivery Note" => Ok(Doctype::DeliveryNote),
            "Sales Invoice" => Ok(Doctype::SalesInvoice),
            other => Err(DispatchError::UnknownDoctype(other.to_string())),
        }
    }
}

/// A document handed to the module by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    DeliveryNote(DeliveryNote),
    SalesInvoice(SalesInvoice),
}

impl Document {
    pub fn doctype(&self) -> Doctype {
        match self {
            Document::DeliveryNote(_) => Doctype::DeliveryNote,
            Document::SalesInvoice(_) => Doctype::SalesInvoice,
        }
    }
}

/// What a dispatched hook did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookReport {
    Reconcile(ReconcileReport),
    Annotate(AnnotateReport),
    Link(LinkReport),
    /// No hook is registered for this event on this document type.
    NotHandled,
}

/// Registration table: (doctype, event, handler name).
pub const HOOKS: [(Doctype, DocEvent, &str); 5] = [
    (Doctype::DeliveryNote, DocEvent::Validate, "fix_serial_count_on_validate"),
    (Doctype::DeliveryNote, DocEvent::OnUpdate, "add_serials_to_description_on_update"),
    (Doctype::DeliveryNote, DocEvent::BeforeSubmit, "add_serials_to_description_before_submit"),
    (Doctype::DeliveryNote, DocEvent::OnSubmit, "add_serials_to_description_on_submit"),
    (Doctype::SalesInvoice, DocEvent::BeforeSubmit, "add_serials_from_delivery_on_submit"),
];

impl SerialService {
    /// Run the hook registered for `event` on this document, if any.
    pub fn dispatch(&self, event: DocEvent, doc: &mut Document) -> HookReport {
        debug!("dispatch {} {}", doc.doctype(), event.as_str());
        match (doc, event) {
            (Document::DeliveryNote(dn), DocEvent::Validate) => {
                HookReport::Reconcile(self.fix_serial_count_on_validate(dn))
            }
            (Document::DeliveryNote(dn), DocEvent::OnUpdate) => {
                HookReport::Annotate(self.add_serials_to_description_on_update(dn))
            }
            (Document::DeliveryNote(dn), DocEvent::BeforeSubmit) => {
                HookReport::Annotate(self.add_serials_to_description_before_submit(dn))
            }
            (Document::DeliveryNote(dn), DocEvent::OnSubmit) => {
                HookReport::Annotate(self.add_serials_to_description_on_submit(dn))
            }
            (Document::SalesInvoice(si), DocEvent::BeforeSubmit) => {
                HookReport::Link(self.add_serials_from_delivery_on_submit(si))
            }
            (Document::SalesInvoice(_), _) => HookReport::NotHandled,
        }
    }
}
