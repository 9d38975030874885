use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use snm_core::{today, ServiceError};

use crate::description::{annotate, has_serial_marker};
use crate::model::{DeliveryItemRecord, DocStatus, InvoiceItem, SalesInvoice};

use super::SerialService;

/// Result of copying delivery serials onto an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// Invoice rows whose description gained a serial block.
    pub annotated: Vec<String>,
    /// Serial records stamped with the invoice.
    pub stamped: usize,
    /// Serial numbers that were missing or failed to update.
    pub failed: Vec<String>,
    /// Invoice rows skipped because their delivery line could not be read.
    pub skipped: Vec<String>,
}

/// Outcome of stamping one row's serials.
#[derive(Debug, Default)]
struct StampOutcome {
    stamped: usize,
    failed: Vec<String>,
}

impl SerialService {
    /// Hook: Sales Invoice.before_submit
    ///
    /// For every invoice row billed from a submitted delivery line, copy the
    /// delivered serial numbers into the row description and record the
    /// invoice on each serial number.
    pub fn add_serials_from_delivery_on_submit(&self, doc: &mut SalesInvoice) -> LinkReport {
        let mut report = LinkReport::default();
        let invoice_date = doc.posting_date.unwrap_or_else(today);
        // Every delivered serial on the invoice, stamped in one pass.
        let mut to_stamp: Vec<String> = Vec::new();

        for item in doc.items.iter_mut() {
            let delivery = match self.find_delivery_item(item) {
                Ok(Some(delivery)) => delivery,
                Ok(None) => {
                    if item.dn_detail.is_some() || item.so_detail.is_some() {
                        warn!(
                            "Sales Invoice {}, Item {}: No submitted Delivery Note item found \
                             (dn_detail={:?}, so_detail={:?})",
                            doc.name, item.item_code, item.dn_detail, item.so_detail
                        );
                    }
                    continue;
                }
                Err(e) => {
                    error!(
                        code = e.error_code(),
                        "Sales Invoice {}, Item {}: delivery lookup failed: {}",
                        doc.name, item.item_code, e
                    );
                    report.skipped.push(item.name.clone());
                    continue;
                }
            };

            // Not serialized.
            let Some(bundle) = delivery.serial_and_batch_bundle.as_deref() else {
                continue;
            };

            let serials = match self.query.bundle_serial_numbers(bundle) {
                Ok(serials) => serials,
                Err(e) => {
                    error!(
                        code = e.error_code(),
                        "Sales Invoice {}, Item {}: could not read bundle {}: {}",
                        doc.name, item.item_code, bundle, e
                    );
                    report.skipped.push(item.name.clone());
                    continue;
                }
            };
            if serials.is_empty() {
                warn!(
                    "Sales Invoice {}, Item {}: DN bundle {} has no serial numbers",
                    doc.name, item.item_code, bundle
                );
                continue;
            }

            if !has_serial_marker(&item.description) {
                item.description = annotate(&item.description, &serials);
                report.annotated.push(item.name.clone());
                info!(
                    "Sales Invoice {}, Item {}: Added {} serial numbers to description",
                    doc.name,
                    item.item_code,
                    serials.len()
                );
            }

            for serial in serials {
                if !to_stamp.contains(&serial) {
                    to_stamp.push(serial);
                }
            }
        }

        let outcome = self.update_serial_no_records(&to_stamp, &doc.name, invoice_date);
        report.stamped = outcome.stamped;
        report.failed = outcome.failed;

        if !report.annotated.is_empty() {
            info!(
                "Sales Invoice {}: Added serial numbers to {} item(s)",
                doc.name,
                report.annotated.len()
            );
        }
        self.report_failed_rows("Serial Delivery Lookup Failed", &doc.name, &report.skipped);
        report
    }

    /// Find the submitted delivery line an invoice row was billed from.
    ///
    /// A direct `dn_detail` link wins. Rows created from a sales order only
    /// carry `so_detail`; the first delivery line for that order line whose
    /// note is submitted is used.
    fn find_delivery_item(
        &self,
        item: &InvoiceItem,
    ) -> Result<Option<DeliveryItemRecord>, ServiceError> {
        if let Some(dn_detail) = item.dn_detail.as_deref() {
            return match self.docs.delivery_item(dn_detail)? {
                Some(delivery) if self.is_submitted(&delivery.parent)? => Ok(Some(delivery)),
                _ => Ok(None),
            };
        }

        let Some(so_detail) = item.so_detail.as_deref() else {
            return Ok(None);
        };
        let candidates = self
            .query
            .delivery_items_for_order_line(so_detail, self.config.delivery_candidate_limit)?;
        for candidate in candidates {
            if self.is_submitted(&candidate.parent)? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    fn is_submitted(&self, delivery_note: &str) -> Result<bool, ServiceError> {
        Ok(self.docs.delivery_note_status(delivery_note)? == Some(DocStatus::Submitted))
    }

    /// Stamp invoice date and id onto each serial record of the invoice.
    ///
    /// Both link fields must be installed first; otherwise nothing is written
    /// and a single error report lists every serial. Missing serials and write
    /// failures are collected and reported once at the end.
    fn update_serial_no_records(
        &self,
        serials: &[String],
        sales_invoice: &str,
        invoice_date: NaiveDate,
    ) -> StampOutcome {
        let mut outcome = StampOutcome::default();
        if serials.is_empty() {
            return outcome;
        }

        if let Err(e) = self.check_link_fields() {
            self.errors.log_error(
                "Serial No Update Failed",
                &format!(
                    "{}\nExpected fields: {}, {}\nSales Invoice: {}\nSerial Numbers: {}",
                    e,
                    self.config.invoice_link.date_field,
                    self.config.invoice_link.invoice_field,
                    sales_invoice,
                    serials.join(", ")
                ),
            );
            return outcome;
        }

        for serial in serials {
            match self.stamp_serial(serial, sales_invoice, invoice_date) {
                Ok(()) => outcome.stamped += 1,
                Err(ServiceError::NotFound(_)) => {
                    warn!("Serial No {serial} does not exist in database, skipping update");
                    outcome.failed.push(serial.clone());
                }
                Err(e) => {
                    error!(
                        code = e.error_code(),
                        "Failed to update Serial No {serial} with SI {sales_invoice}: {e}"
                    );
                    outcome.failed.push(serial.clone());
                }
            }
        }

        if outcome.stamped > 0 {
            info!("Updated {} serial number(s) with SI {}", outcome.stamped, sales_invoice);
        }
        if !outcome.failed.is_empty() {
            self.errors.log_error(
                "Serial No Update Partial Failure",
                &format!(
                    "Failed to update {} serial number(s) for SI {}:\n{}",
                    outcome.failed.len(),
                    sales_invoice,
                    outcome.failed.join(", ")
                ),
            );
        }
        outcome
    }

    fn check_link_fields(&self) -> Result<(), ServiceError> {
        let link = &self.config.invoice_link;
        let mut missing = Vec::new();
        for field in [&link.date_field, &link.invoice_field] {
            if !self.docs.has_custom_field(&link.doctype, field)? {
                missing.push(field.as_str());
            }
        }
        if missing.is_empty() {
            debug!("{} link fields present", link.doctype);
            Ok(())
        } else {
            Err(ServiceError::MissingSchema(format!(
                "Custom fields missing on {} doctype for tracking Sales Invoice: {}",
                link.doctype,
                missing.join(", ")
            )))
        }
    }

    fn stamp_serial(
        &self,
        serial: &str,
        sales_invoice: &str,
        invoice_date: NaiveDate,
    ) -> Result<(), ServiceError> {
        if !self.docs.serial_no_exists(serial)? {
            return Err(ServiceError::NotFound(format!("Serial No {serial}")));
        }
        self.docs.link_serial_to_invoice(serial, sales_invoice, invoice_date)
    }
}
