pub mod annotate;
pub mod invoice_link;
pub mod reconcile;

use std::sync::Arc;

use snm_core::ServiceError;

use crate::config::SerialConfig;
use crate::host::{DocumentStore, ErrorReporter, Notice, NoticeLevel, Notifier, QueryService};
use crate::model::{parse_inline_serials, SerialAssignment};
use crate::store_impls::KvHost;

pub use annotate::{AnnotateReport, AnnotateStage};
pub use invoice_link::LinkReport;
pub use reconcile::ReconcileReport;

/// Serial number service. Holds the host collaborators and runs the hooks.
///
/// Every hook takes the document it fires on and returns a report; none of
/// them fail the triggering save or submit.
pub struct SerialService {
    pub(crate) docs: Arc<dyn DocumentStore>,
    pub(crate) query: Arc<dyn QueryService>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) errors: Arc<dyn ErrorReporter>,
    pub(crate) config: SerialConfig,
}

impl SerialService {
    pub fn new(
        docs: Arc<dyn DocumentStore>,
        query: Arc<dyn QueryService>,
        notifier: Arc<dyn Notifier>,
        errors: Arc<dyn ErrorReporter>,
        config: SerialConfig,
    ) -> Self {
        Self {
            docs,
            query,
            notifier,
            errors,
            config,
        }
    }

    /// Wire every storage-side collaborator to one [`KvHost`].
    pub fn with_kv_host(host: Arc<KvHost>, notifier: Arc<dyn Notifier>, config: SerialConfig) -> Self {
        Self::new(host.clone(), host.clone(), notifier, host, config)
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// The serial numbers an assignment currently stands for.
    ///
    /// Bundle serials come back sorted; inline serials keep their order.
    pub(crate) fn resolve_serials(
        &self,
        assignment: Option<&SerialAssignment>,
    ) -> Result<Vec<String>, ServiceError> {
        match assignment {
            Some(SerialAssignment::Bundle(id)) => self.query.bundle_serial_numbers(id),
            Some(SerialAssignment::Inline(text)) => Ok(parse_inline_serials(text)),
            None => Ok(Vec::new()),
        }
    }

    /// File one error record naming every row a hook could not process.
    pub(crate) fn report_failed_rows(&self, title: &str, doc_name: &str, rows: &[String]) {
        if rows.is_empty() {
            return;
        }
        self.errors.log_error(
            title,
            &format!(
                "{}: {} row(s) could not be processed:\n{}",
                doc_name,
                rows.len(),
                rows.join(", ")
            ),
        );
    }

    pub(crate) fn notify(&self, level: NoticeLevel, title: &str, message: String) {
        self.notifier.notify(Notice {
            level,
            title: title.to_string(),
            message,
        });
    }
}
