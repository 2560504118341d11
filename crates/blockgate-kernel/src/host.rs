//! Host editor seams.
//!
//! The controllers never reach into ambient global state. Everything they read
//! or write goes through these traits, injected at construction. Reads return
//! owned snapshots so a listener sees one consistent view per tick.
//!
//! Implementations use interior mutability (`&self` writes), matching how a
//! host store is shared between both controllers.

use std::sync::Arc;

use blockgate_types::{BlockKind, BlockNode, BlockType, TemplateCatalog, TemplateId};

use crate::flows::SharedChangeBus;
use crate::notice::NoticeUpdate;

/// Read side of the host document.
pub trait DocumentStore: Send + Sync {
    /// Template the user selected, if any.
    fn selected_template(&self) -> Option<TemplateId>;

    /// Snapshot of the full block forest.
    fn blocks(&self) -> Vec<BlockNode>;

    /// Whether the user is mid-keystroke.
    fn is_typing(&self) -> bool;
}

/// The live set of insertable block types.
///
/// Both batch calls are expected to emit one store change each. Unknown kinds
/// in `remove_block_types` are ignored.
pub trait BlockTypeRegistry: Send + Sync {
    /// Registered definition for `kind`, if it is currently insertable.
    fn block_type(&self, kind: &BlockKind) -> Option<BlockType>;

    fn add_block_types(&self, definitions: Vec<BlockType>);

    fn remove_block_types(&self, kinds: &[BlockKind]);
}

/// Editor settings: the offered template list and panel state.
pub trait EditorSettings: Send + Sync {
    /// Templates currently offered in the template picker.
    fn available_templates(&self) -> TemplateCatalog;

    /// Replace the offered templates.
    fn set_available_templates(&self, catalog: TemplateCatalog);

    fn is_panel_opened(&self, panel: &str) -> bool;

    /// Name of the active general sidebar, if one is open.
    fn active_sidebar(&self) -> Option<String>;
}

/// Where the restriction notice is rendered.
pub trait NoticeSink: Send + Sync {
    fn apply(&self, update: NoticeUpdate);
}

/// Everything a session needs from the host, as shared handles.
#[derive(Clone)]
pub struct HostHandles {
    pub documents: Arc<dyn DocumentStore>,
    pub registry: Arc<dyn BlockTypeRegistry>,
    pub settings: Arc<dyn EditorSettings>,
    pub notices: Arc<dyn NoticeSink>,
    /// The stream the host publishes its store changes on.
    pub bus: SharedChangeBus,
}

impl HostHandles {
    /// Handles for a host that implements every seam on one object.
    pub fn from_shared<H>(host: Arc<H>, bus: SharedChangeBus) -> Self
    where
        H: DocumentStore + BlockTypeRegistry + EditorSettings + NoticeSink + 'static,
    {
        Self {
            documents: host.clone(),
            registry: host.clone(),
            settings: host.clone(),
            notices: host,
            bus,
        }
    }
}

impl std::fmt::Debug for HostHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandles")
            .field("bus_subscribers", &self.bus.subscriber_count())
            .finish_non_exhaustive()
    }
}
