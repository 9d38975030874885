use tracing::{debug, error, info, warn};

use snm_core::ServiceError;

use crate::description::{annotate, has_serial_marker};
use crate::model::{DeliveryNote, DocStatus, LineItem};

use super::SerialService;

/// The lifecycle point an annotation pass runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotateStage {
    /// After a draft is saved.
    AfterSave,
    BeforeSubmit,
    /// After submit; the document is final, so writes go to the store.
    AfterSubmit,
}

/// Result of one annotation pass over a delivery note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotateReport {
    /// Rows whose description gained a serial block.
    pub annotated: Vec<String>,
    /// Rows already carrying a serial block.
    pub already_marked: usize,
    /// Rows whose serials could not be resolved or written.
    pub failed: Vec<String>,
}

impl SerialService {
    /// Hook: Delivery Note.on_update
    pub fn add_serials_to_description_on_update(&self, doc: &mut DeliveryNote) -> AnnotateReport {
        if doc.docstatus != DocStatus::Draft {
            return AnnotateReport::default();
        }
        self.annotate_delivery_note(doc, AnnotateStage::AfterSave)
    }

    /// Hook: Delivery Note.before_submit
    pub fn add_serials_to_description_before_submit(
        &self,
        doc: &mut DeliveryNote,
    ) -> AnnotateReport {
        self.annotate_delivery_note(doc, AnnotateStage::BeforeSubmit)
    }

    /// Hook: Delivery Note.on_submit
    pub fn add_serials_to_description_on_submit(&self, doc: &mut DeliveryNote) -> AnnotateReport {
        self.annotate_delivery_note(doc, AnnotateStage::AfterSubmit)
    }

    /// Append each row's serial numbers to its description.
    ///
    /// Rows with no serials, or whose description already has an `S/N:`
    /// marker, are left alone, so running several stages is harmless.
    pub fn annotate_delivery_note(
        &self,
        doc: &mut DeliveryNote,
        stage: AnnotateStage,
    ) -> AnnotateReport {
        let mut report = AnnotateReport::default();

        for item in doc.items.iter_mut() {
            match self.annotate_item(&doc.name, item, stage) {
                Ok(Some(count)) => {
                    info!(
                        "Delivery Note {}, Item {}: Added {} serial numbers to description",
                        doc.name, item.item_code, count
                    );
                    report.annotated.push(item.name.clone());
                }
                Ok(None) => {
                    if has_serial_marker(&item.description) {
                        report.already_marked += 1;
                    }
                }
                Err(e) => {
                    error!(
                        code = e.error_code(),
                        "Delivery Note {}, Item {}: could not annotate description: {}",
                        doc.name, item.item_code, e
                    );
                    report.failed.push(item.name.clone());
                }
            }
        }

        if !report.annotated.is_empty() {
            info!(
                "Delivery Note {}: Added serial numbers to {} item(s) ({:?})",
                doc.name,
                report.annotated.len(),
                stage
            );
        }
        self.report_failed_rows("Serial Description Update Failed", &doc.name, &report.failed);
        report
    }

    /// Returns the number of serials added, or `None` when nothing changed.
    fn annotate_item(
        &self,
        doc_name: &str,
        item: &mut LineItem,
        stage: AnnotateStage,
    ) -> Result<Option<usize>, ServiceError> {
        if item.serial_assignment.is_none() {
            return Ok(None);
        }

        let serials = self.resolve_serials(item.serial_assignment.as_ref())?;
        if serials.is_empty() {
            if let Some(bundle) = item.bundle_id() {
                warn!(
                    "Delivery Note {doc_name}, Item {}: Serial bundle {bundle} has no serial numbers",
                    item.item_code
                );
            }
            return Ok(None);
        }

        if has_serial_marker(&item.description) {
            debug!(
                "Delivery Note {doc_name}, Item {}: Serial numbers already in description, skipping",
                item.item_code
            );
            return Ok(None);
        }

        let description = annotate(&item.description, &serials);
        if stage == AnnotateStage::AfterSubmit {
            self.docs.set_delivery_item_description(&item.name, &description)?;
        }
        item.description = description;
        Ok(Some(serials.len()))
    }
}
