use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use snm_core::ServiceError;

use crate::host::{AvailableSerials, NoticeLevel};
use crate::model::{parse_inline_serials, DeliveryNote, DocStatus, LineItem, SerialAssignment};

use super::SerialService;

/// What validation changed, by item row name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Bundle assignments dropped for a count mismatch.
    pub cleared: Vec<String>,
    /// Inline assignments filled from stock.
    pub assigned: Vec<String>,
    /// Inline assignments emptied because stock ran short.
    pub short: Vec<String>,
    /// Rows skipped because a lookup failed.
    pub failed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.cleared.is_empty()
            && self.assigned.is_empty()
            && self.short.is_empty()
            && self.failed.is_empty()
    }
}

enum Outcome {
    Unchanged,
    Cleared,
    Assigned,
    Short,
}

impl SerialService {
    /// Hook: Delivery Note.validate
    ///
    /// Makes every serialized row's serial count match its quantity. Bundle
    /// rows with a mismatch lose the bundle; legacy rows get refilled from
    /// stock, oldest serial first, or emptied when stock is short.
    pub fn fix_serial_count_on_validate(&self, doc: &mut DeliveryNote) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if doc.docstatus != DocStatus::Draft {
            return report;
        }

        // Serials held by rows that keep their inline list stay out of reach
        // of auto-assignment, and each assignment claims what it picks.
        let mut claimed: HashSet<String> = doc
            .items
            .iter()
            .filter_map(|item| match &item.serial_assignment {
                Some(SerialAssignment::Inline(text)) => {
                    let serials = parse_inline_serials(text);
                    (item.quantity > 0 && serials.len() as i64 == item.quantity)
                        .then_some(serials)
                }
                _ => None,
            })
            .flatten()
            .collect();

        for (idx, item) in doc.items.iter_mut().enumerate() {
            if item.quantity <= 0 {
                continue;
            }
            let row = idx + 1;

            let outcome = match item.serial_assignment.clone() {
                Some(SerialAssignment::Bundle(bundle)) => {
                    self.reconcile_bundle(&doc.name, row, item, &bundle)
                }
                Some(SerialAssignment::Inline(text)) => {
                    self.reconcile_inline(&doc.name, row, item, &text, &mut claimed)
                }
                None => continue,
            };

            match outcome {
                Ok(Outcome::Unchanged) => {}
                Ok(Outcome::Cleared) => report.cleared.push(item.name.clone()),
                Ok(Outcome::Assigned) => report.assigned.push(item.name.clone()),
                Ok(Outcome::Short) => report.short.push(item.name.clone()),
                Err(e) => {
                    error!(
                        code = e.error_code(),
                        "Delivery Note {}, Item {}: serial reconciliation failed: {}",
                        doc.name, item.item_code, e
                    );
                    report.failed.push(item.name.clone());
                }
            }
        }

        if !report.is_clean() {
            info!(
                "Delivery Note {}: cleared {}, assigned {}, short {}, failed {}",
                doc.name,
                report.cleared.len(),
                report.assigned.len(),
                report.short.len(),
                report.failed.len()
            );
        }
        self.report_failed_rows("Serial Reconciliation Failed", &doc.name, &report.failed);
        report
    }

    fn reconcile_bundle(
        &self,
        doc_name: &str,
        row: usize,
        item: &mut LineItem,
        bundle: &str,
    ) -> Result<Outcome, ServiceError> {
        let count = self.query.count_bundle_entries(bundle)?;
        if count as i64 == item.quantity {
            return Ok(Outcome::Unchanged);
        }

        item.serial_assignment = None;

        // Best-effort: the row is already detached, a stale bundle only
        // costs storage.
        match self.docs.bundle_exists(bundle) {
            Ok(true) => {
                if let Err(e) = self.docs.delete_bundle(bundle) {
                    warn!("Delivery Note {doc_name}: could not delete bundle {bundle}: {e}");
                }
            }
            Ok(false) => debug!("Delivery Note {doc_name}: bundle {bundle} already gone"),
            Err(e) => warn!("Delivery Note {doc_name}: could not check bundle {bundle}: {e}"),
        }

        self.notify(
            NoticeLevel::Warning,
            "Serial Numbers Cleared",
            format!(
                "Row {row}: Item {} had {count} serial number(s) but quantity is {}. \
                 Serial bundle {bundle} was removed; select {} serial number(s) again.",
                item.item_code, item.quantity, item.quantity
            ),
        );
        Ok(Outcome::Cleared)
    }

    fn reconcile_inline(
        &self,
        doc_name: &str,
        row: usize,
        item: &mut LineItem,
        text: &str,
        claimed: &mut HashSet<String>,
    ) -> Result<Outcome, ServiceError> {
        let current = parse_inline_serials(text);
        if current.len() as i64 == item.quantity {
            return Ok(Outcome::Unchanged);
        }

        let required = item.quantity as usize;
        let available: Vec<String> = self
            .query
            .available_serial_numbers(&AvailableSerials {
                item_code: &item.item_code,
                warehouse: item.warehouse.as_deref(),
                status: self.config.available_status,
                limit: required + claimed.len(),
            })?
            .into_iter()
            .map(|sn| sn.name)
            .filter(|name| !claimed.contains(name))
            .collect();

        if available.len() >= required {
            let picked: Vec<String> = available.into_iter().take(required).collect();
            claimed.extend(picked.iter().cloned());
            item.serial_assignment = Some(SerialAssignment::Inline(picked.join("\n")));
            debug!(
                "Delivery Note {doc_name}, Item {}: replaced {} serial(s) with {}",
                item.item_code,
                current.len(),
                picked.len()
            );
            self.notify(
                NoticeLevel::Info,
                "Serial Numbers Assigned",
                format!(
                    "Row {row}: Auto-assigned {required} serial number(s) to Item {}: {}",
                    item.item_code,
                    picked.join(", ")
                ),
            );
            return Ok(Outcome::Assigned);
        }

        item.serial_assignment = Some(SerialAssignment::Inline(String::new()));
        let warehouse = item.warehouse.as_deref().unwrap_or("any warehouse");
        self.notify(
            NoticeLevel::Warning,
            "Insufficient Serial Numbers",
            format!(
                "Row {row}: Not enough available serial numbers for Item {} in {warehouse}. \
                 Required quantity: {required}, available: {}.",
                item.item_code,
                available.len()
            ),
        );
        Ok(Outcome::Short)
    }
}
