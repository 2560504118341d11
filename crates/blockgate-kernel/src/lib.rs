//! # blockgate-kernel
//!
//! Two reactive controllers that keep a block editor's template choice and
//! block composition consistent with a static restriction table:
//!
//! - [`BlockAvailabilityController`] watches the selected template and
//!   unregisters block kinds the template does not allow, restoring them
//!   verbatim when it does.
//! - [`TemplateAvailabilityController`] watches the document tree and narrows
//!   the offered templates to those every restricted block accepts, with an
//!   advisory notice explaining why.
//!
//! Both talk to the host editor only through the traits in [`host`], and
//! both react to the same [`flows::ChangeBus`]. Neither does anything while
//! the user is typing.
//!
//! [`Session`] wires them together; [`MemoryHost`] is an in-memory editor for
//! tests and offline checks.

pub mod block_availability;
pub mod config;
pub mod error;
pub mod flows;
pub mod host;
pub mod memory;
pub mod notice;
pub mod scanner;
pub mod session;
pub mod template_availability;

pub use block_availability::{BlockAvailabilityController, Reconciliation};
pub use config::{GateConfig, NoticeConfig, RenarrowPolicy};
pub use error::ConfigError;
pub use flows::{
    ChangeBus, SharedChangeBus, StoreChange, Subscription, shared_change_bus, subject_matches,
};
pub use host::{BlockTypeRegistry, DocumentStore, EditorSettings, HostHandles, NoticeSink};
pub use memory::{MemoryHost, RegistryCall};
pub use notice::{DeferredNotice, Notice, NoticeUpdate};
pub use scanner::{ScanResult, scan_blocks};
pub use session::{PumpStats, Session};
pub use template_availability::{TemplateAvailabilityController, TemplateHost};
