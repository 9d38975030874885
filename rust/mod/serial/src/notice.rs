use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::host::{Notice, NoticeLevel, Notifier};

/// In-memory notice sink.
///
/// Every notice is also written to the log. The host drains the queue with
/// [`NoticeLog::take`] when it builds the response for the triggering request.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of queued notices.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return all queued notices.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(title = %notice.title, "{}", notice.message),
            NoticeLevel::Warning => warn!(title = %notice.title, "{}", notice.message),
        }
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drains_queue() {
        let log = NoticeLog::new();
        log.notify(Notice {
            level: NoticeLevel::Warning,
            title: "Serial Numbers Cleared".into(),
            message: "row 1".into(),
        });
        assert_eq!(log.notices().len(), 1);

        let taken = log.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].level.indicator(), "orange");
        assert!(log.notices().is_empty());
    }
}
