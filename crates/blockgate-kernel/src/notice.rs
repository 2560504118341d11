//! The template restriction notice.
//!
//! The core only decides whether the notice is visible and what it says.
//! Rendering belongs to a [`NoticeSink`]. Because the host re-renders its
//! settings panel after every store change, writes go through
//! [`DeferredNotice`], which holds the latest update until the host reports
//! that rendering has settled. Only the last queued update is applied.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::host::NoticeSink;

/// Notice content: an explanation plus one line per offending block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub items: Vec<String>,
}

impl Notice {
    /// Build a notice listing blocks by display title (`"Code"` → `"Code Block"`).
    pub fn new<'a>(message: impl Into<String>, titles: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            message: message.into(),
            items: titles.into_iter().map(|t| format!("{t} Block")).collect(),
        }
    }
}

/// A visibility decision for the notice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeUpdate {
    Show(Notice),
    Hide,
}

impl NoticeUpdate {
    pub fn is_show(&self) -> bool {
        matches!(self, Self::Show(_))
    }
}

/// Holds notice writes until [`settle`](Self::settle) is called.
pub struct DeferredNotice {
    inner: Arc<dyn NoticeSink>,
    pending: Mutex<Option<NoticeUpdate>>,
}

impl DeferredNotice {
    pub fn new(inner: Arc<dyn NoticeSink>) -> Self {
        Self {
            inner,
            pending: Mutex::new(None),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Apply the latest queued update, if any. Returns whether one was applied.
    pub fn settle(&self) -> bool {
        let update = self.pending.lock().take();
        match update {
            Some(update) => {
                tracing::trace!(show = update.is_show(), "applying deferred notice");
                self.inner.apply(update);
                true
            }
            None => false,
        }
    }
}

impl NoticeSink for DeferredNotice {
    fn apply(&self, update: NoticeUpdate) {
        let replaced = self.pending.lock().replace(update);
        if replaced.is_some() {
            tracing::trace!("superseded pending notice update");
        }
    }
}

impl std::fmt::Debug for DeferredNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredNotice")
            .field("pending", &*self.pending.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<NoticeUpdate>>);

    impl NoticeSink for Recorder {
        fn apply(&self, update: NoticeUpdate) {
            self.0.lock().push(update);
        }
    }

    #[test]
    fn titles_get_block_suffix() {
        let notice = Notice::new("why", ["Code", "Hero"]);
        assert_eq!(notice.items, ["Code Block", "Hero Block"]);
    }

    #[test]
    fn last_deferred_write_wins() {
        let recorder = Arc::new(Recorder::default());
        let deferred = DeferredNotice::new(recorder.clone());

        deferred.apply(NoticeUpdate::Show(Notice::new("why", ["Code"])));
        deferred.apply(NoticeUpdate::Hide);
        assert!(deferred.is_pending());
        assert!(recorder.0.lock().is_empty());

        assert!(deferred.settle());
        assert!(!deferred.settle());
        assert_eq!(*recorder.0.lock(), [NoticeUpdate::Hide]);
    }
}
