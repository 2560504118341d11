//! Store-change ticks.
//!
//! Every host mutation publishes one [`StoreChange`]. A listener treats it as
//! a bare tick: it re-queries host state rather than trusting the payload, so
//! a dropped or coalesced tick only delays work until the next one.
//!
//! Each change has a dotted subject (`editor.template`, `registry.added`, ...)
//! and each controller subscribes only to the subjects whose state it reads.
//! Patterns are matched token by token:
//!
//! - `*` matches exactly one token: `editor.*` matches `editor.typing`
//! - `>` as the last token matches one or more tokens: `document.>`
//! - anything else matches itself

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use blockgate_types::{BlockKind, TemplateId};

/// Default channel capacity for a session's change bus.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Whether `subject` matches a subscription `pattern`.
///
/// ```
/// use blockgate_kernel::flows::subject_matches;
///
/// assert!(subject_matches("editor.*", "editor.typing"));
/// assert!(subject_matches("document.>", "document.blocks"));
/// assert!(!subject_matches("editor.*", "registry.added"));
/// ```
pub fn subject_matches(pattern: &str, subject: &str) -> bool {
    let mut subject_tokens = subject.split('.');
    let mut pattern_tokens = pattern.split('.').peekable();

    while let Some(token) = pattern_tokens.next() {
        if token == ">" {
            return pattern_tokens.peek().is_none() && subject_tokens.next().is_some();
        }
        match subject_tokens.next() {
            Some(s) if token == "*" || token == s => {}
            _ => return false,
        }
    }
    subject_tokens.next().is_none()
}

/// One host store mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreChange {
    /// The document's template selection changed (`None` = unset).
    TemplateSelected { template: Option<TemplateId> },
    /// The block tree was replaced or edited.
    BlocksChanged { top_level: usize },
    /// The typing flag flipped.
    TypingChanged { typing: bool },
    /// A batch of block types was registered.
    BlockTypesAdded { kinds: Vec<BlockKind> },
    /// A batch of block types was unregistered.
    BlockTypesRemoved { kinds: Vec<BlockKind> },
    /// The offered template catalog was replaced.
    TemplatesOffered { count: usize },
    /// A settings panel or sidebar opened or closed.
    PanelChanged,
}

impl StoreChange {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::TemplateSelected { .. } => "editor.template",
            Self::TypingChanged { .. } => "editor.typing",
            Self::BlocksChanged { .. } => "document.blocks",
            Self::BlockTypesAdded { .. } => "registry.added",
            Self::BlockTypesRemoved { .. } => "registry.removed",
            Self::TemplatesOffered { .. } => "settings.templates",
            Self::PanelChanged => "settings.panel",
        }
    }
}

/// Fan-out of store changes to every subscriber.
///
/// A subscriber sees only changes published after it subscribed.
#[derive(Debug)]
pub struct ChangeBus {
    tx: broadcast::Sender<StoreChange>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish a change. Returns how many subscribers were listening.
    pub fn publish(&self, change: StoreChange) -> usize {
        self.tx.send(change).unwrap_or(0)
    }

    /// Subscribe to changes whose subject matches any of `patterns`.
    pub fn subscribe(&self, patterns: &[&str]) -> Subscription {
        Subscription {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            rx: self.tx.subscribe(),
        }
    }
}

/// Shared store-change bus.
pub type SharedChangeBus = Arc<ChangeBus>;

pub fn shared_change_bus(capacity: usize) -> SharedChangeBus {
    Arc::new(ChangeBus::new(capacity))
}

/// A filtered view of a [`ChangeBus`].
pub struct Subscription {
    patterns: Vec<String>,
    rx: broadcast::Receiver<StoreChange>,
}

impl Subscription {
    pub fn wants(&self, subject: &str) -> bool {
        self.patterns.iter().any(|p| subject_matches(p, subject))
    }

    /// Next queued change this subscription wants, without blocking.
    pub fn try_recv(&mut self) -> Option<StoreChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if self.wants(change.subject()) => return Some(change),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        patterns = ?self.patterns,
                        skipped,
                        "store changes dropped; next tick re-reads host state"
                    );
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}
