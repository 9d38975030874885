//! Serial number bookkeeping hooks for delivery notes and sales invoices.
//!
//! - validate: serial counts are reconciled against quantities
//!   ([`SerialService::fix_serial_count_on_validate`]).
//! - save / submit: serial numbers are appended to item descriptions
//!   ([`description`]).
//! - invoice submit: delivered serials are copied onto the invoice and the
//!   serial records are stamped with the invoice.

pub mod config;
pub mod description;
pub mod dispatch;
pub mod host;
pub mod model;
pub mod notice;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use snm_core::{HookBinding, Module};
use tracing::info;

pub use config::SerialConfig;
pub use dispatch::{DispatchError, DocEvent, Doctype, Document, HookReport};
pub use notice::NoticeLog;
pub use service::SerialService;
pub use store_impls::KvHost;

/// Serial Number Manager module.
pub struct SerialModule {
    service: Arc<SerialService>,
}

impl SerialModule {
    pub fn new(service: SerialService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<SerialService> {
        &self.service
    }

    /// Entry point for the host's lifecycle dispatch, by raw names.
    pub fn handle(
        &self,
        doctype: &str,
        event: &str,
        doc: &mut Document,
    ) -> Result<HookReport, DispatchError> {
        let expected: Doctype = doctype.parse()?;
        let event: DocEvent = event.parse()?;
        if doc.doctype() != expected {
            return Err(DispatchError::DoctypeMismatch {
                expected,
                actual: doc.doctype(),
            });
        }
        Ok(self.service.dispatch(event, doc))
    }
}

impl Module for SerialModule {
    fn name(&self) -> &str {
        "serial_number_manager"
    }

    fn hooks(&self) -> Vec<HookBinding> {
        let hooks: Vec<HookBinding> = dispatch::HOOKS
            .iter()
            .map(|&(doctype, event, handler)| HookBinding {
                doctype: doctype.as_str(),
                event: event.as_str(),
                handler,
            })
            .collect();
        info!("{}: {} document hooks", self.name(), hooks.len());
        hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DocumentStore;
    use crate::model::{DeliveryNote, DocStatus, InvoiceItem, LineItem, SalesInvoice, SerialNo};
    use crate::service::testing::fixture;

    #[test]
    fn test_registration_table() {
        let fx = fixture();
        let module = SerialModule::new(fx.service);
        let hooks = module.hooks();
        assert_eq!(hooks.len(), 5);
        assert!(hooks.contains(&HookBinding {
            doctype: "Sales Invoice",
            event: "before_submit",
            handler: "add_serials_from_delivery_on_submit",
        }));
        assert!(hooks.iter().all(|h| h.doctype == "Delivery Note" || h.event == "before_submit"));
    }

    #[test]
    fn test_handle_rejects_mismatched_doctype() {
        let fx = fixture();
        let module = SerialModule::new(fx.service);
        let mut doc = Document::DeliveryNote(DeliveryNote::new("DN-0001", vec![]));

        let err = module.handle("Sales Invoice", "before_submit", &mut doc).unwrap_err();
        assert_eq!(
            err,
            DispatchError::DoctypeMismatch {
                expected: Doctype::SalesInvoice,
                actual: Doctype::DeliveryNote,
            }
        );
        assert!(module.handle("Delivery Note", "on_trash", &mut doc).is_err());
    }

    /// Delivery note validate → save → submit, then the invoice billed from it.
    #[test]
    fn test_delivery_to_invoice_lifecycle() {
        let fx = fixture();
        fx.install_link_fields();
        fx.stock("LAPTOP", "Stores", "SN", 3);
        fx.bundle("SABB-0001", "PHONE", &["P-2", "P-1"]);
        let host = fx.host.clone();
        let notices = fx.notices.clone();
        let module = SerialModule::new(fx.service);

        let mut dn = Document::DeliveryNote(DeliveryNote::new(
            "DN-0001",
            vec![
                LineItem::new("dn-row-1", "LAPTOP", 2)
                    .with_warehouse("Stores")
                    .with_inline_serials("")
                    .with_description("<p>Laptop</p>"),
                LineItem::new("dn-row-2", "PHONE", 2)
                    .with_so_detail("so-row-2")
                    .with_bundle("SABB-0001"),
            ],
        ));

        let report = module.handle("Delivery Note", "validate", &mut dn).unwrap();
        assert!(matches!(report, HookReport::Reconcile(ref r) if r.assigned == ["dn-row-1"]));
        assert_eq!(notices.take().len(), 1);

        module.handle("Delivery Note", "on_update", &mut dn).unwrap();
        module.handle("Delivery Note", "before_submit", &mut dn).unwrap();

        let Document::DeliveryNote(note) = &mut dn else {
            unreachable!()
        };
        note.docstatus = DocStatus::Submitted;
        host.save_delivery_note(note).unwrap();
        let report = module.handle("Delivery Note", "on_submit", &mut dn).unwrap();
        assert!(matches!(report, HookReport::Annotate(ref r) if r.annotated.is_empty()));

        let Document::DeliveryNote(note) = &dn else {
            unreachable!()
        };
        assert_eq!(
            note.items[0].description,
            "<p>Laptop</p><br><br><p><strong>S/N:</strong></p><p>SN-1</p><p>SN-2</p>"
        );
        assert_eq!(
            host.delivery_item("dn-row-2").unwrap().unwrap().description,
            "<p><strong>S/N:</strong></p><p>P-1</p><p>P-2</p>"
        );

        host.put_serial_no(&SerialNo::new("P-1", "PHONE")).unwrap();
        host.put_serial_no(&SerialNo::new("P-2", "PHONE")).unwrap();
        let mut si = Document::SalesInvoice(SalesInvoice::new(
            "SINV-0001",
            vec![InvoiceItem::new("si-row-1", "PHONE", 2).with_so_detail("so-row-2")],
        ));
        let report = module.handle("Sales Invoice", "before_submit", &mut si).unwrap();
        match report {
            HookReport::Link(r) => {
                assert_eq!(r.stamped, 2);
                assert!(r.failed.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
        let p1 = host.get_serial_no("P-1").unwrap().unwrap();
        assert_eq!(p1.sales_invoice.as_deref(), Some("SINV-0001"));
        assert!(p1.sales_invoice_date.is_some());
    }
}
