//! In-memory host editor.
//!
//! Implements every host seam over plain data, publishing one
//! [`StoreChange`] per mutation the way a real editor store notifies its
//! subscribers. Used by tests and by the `blockgate` CLI. All state is
//! ephemeral.
//!
//! Notice updates and registry batch calls are recorded so callers can
//! assert on exactly what the controllers did.

use std::collections::HashSet;

use indexmap::IndexMap;
use parking_lot::RwLock;

use blockgate_types::{BlockKind, BlockNode, BlockType, TemplateCatalog, TemplateId};

use crate::flows::{SharedChangeBus, StoreChange};
use crate::host::{BlockTypeRegistry, DocumentStore, EditorSettings, NoticeSink};
use crate::notice::{Notice, NoticeUpdate};

/// One batch call made against the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryCall {
    Add(Vec<BlockKind>),
    Remove(Vec<BlockKind>),
}

#[derive(Debug, Default)]
struct HostState {
    template: Option<TemplateId>,
    blocks: Vec<BlockNode>,
    typing: bool,
    registry: IndexMap<BlockKind, BlockType>,
    offered: TemplateCatalog,
    open_panels: HashSet<String>,
    sidebar: Option<String>,
    notice: Option<Notice>,
    notice_log: Vec<NoticeUpdate>,
    registry_calls: Vec<RegistryCall>,
}

/// In-memory host editor.
///
/// Thread-safe via an internal `RwLock`. The lock is never held while
/// publishing.
#[derive(Debug)]
pub struct MemoryHost {
    state: RwLock<HostState>,
    bus: SharedChangeBus,
}

impl MemoryHost {
    /// A host offering `catalog`, with an empty document and registry.
    pub fn new(bus: SharedChangeBus, catalog: TemplateCatalog) -> Self {
        Self {
            state: RwLock::new(HostState {
                offered: catalog,
                ..HostState::default()
            }),
            bus,
        }
    }

    pub fn bus(&self) -> SharedChangeBus {
        self.bus.clone()
    }

    // ========================================================================
    // Document
    // ========================================================================

    pub fn select_template(&self, template: Option<&str>) {
        let template = template.map(TemplateId::from);
        self.state.write().template = template.clone();
        self.bus.publish(StoreChange::TemplateSelected { template });
    }

    pub fn set_blocks(&self, blocks: Vec<BlockNode>) {
        let top_level = blocks.len();
        self.state.write().blocks = blocks;
        self.bus.publish(StoreChange::BlocksChanged { top_level });
    }

    /// Append a block at the top level.
    pub fn insert_block(&self, block: BlockNode) {
        let top_level = {
            let mut state = self.state.write();
            state.blocks.push(block);
            state.blocks.len()
        };
        self.bus.publish(StoreChange::BlocksChanged { top_level });
    }

    /// Delete every block of `kind` at any depth, along with its children.
    /// Returns how many were deleted.
    pub fn remove_blocks(&self, kind: &str) -> usize {
        let (removed, top_level) = {
            let mut state = self.state.write();
            let removed = prune(&mut state.blocks, kind);
            (removed, state.blocks.len())
        };
        self.bus.publish(StoreChange::BlocksChanged { top_level });
        removed
    }

    pub fn set_typing(&self, typing: bool) {
        self.state.write().typing = typing;
        self.bus.publish(StoreChange::TypingChanged { typing });
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Seed the registry, as the editor does at boot. Not recorded as a batch call.
    pub fn register_block_types(&self, definitions: Vec<BlockType>) {
        let kinds: Vec<BlockKind> = {
            let mut state = self.state.write();
            definitions
                .into_iter()
                .map(|def| {
                    let kind = def.kind.clone();
                    state.registry.insert(kind.clone(), def);
                    kind
                })
                .collect()
        };
        self.bus.publish(StoreChange::BlockTypesAdded { kinds });
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.state.read().registry.contains_key(kind)
    }

    pub fn registered_kinds(&self) -> Vec<BlockKind> {
        self.state.read().registry.keys().cloned().collect()
    }

    pub fn registry_calls(&self) -> Vec<RegistryCall> {
        self.state.read().registry_calls.clone()
    }

    pub fn clear_registry_calls(&self) {
        self.state.write().registry_calls.clear();
    }

    // ========================================================================
    // Settings panels
    // ========================================================================

    pub fn open_panel(&self, panel: &str) {
        self.state.write().open_panels.insert(panel.to_string());
        self.bus.publish(StoreChange::PanelChanged);
    }

    pub fn close_panel(&self, panel: &str) {
        self.state.write().open_panels.remove(panel);
        self.bus.publish(StoreChange::PanelChanged);
    }

    pub fn set_sidebar(&self, sidebar: Option<&str>) {
        self.state.write().sidebar = sidebar.map(str::to_string);
        self.bus.publish(StoreChange::PanelChanged);
    }

    // ========================================================================
    // Observed output
    // ========================================================================

    pub fn offered_templates(&self) -> TemplateCatalog {
        self.state.read().offered.clone()
    }

    /// The notice as currently rendered.
    pub fn notice(&self) -> Option<Notice> {
        self.state.read().notice.clone()
    }

    /// Every notice update applied so far, in order.
    pub fn notice_log(&self) -> Vec<NoticeUpdate> {
        self.state.read().notice_log.clone()
    }
}

fn prune(nodes: &mut Vec<BlockNode>, kind: &str) -> usize {
    let before = nodes.len();
    nodes.retain(|node| node.kind != kind);
    let mut removed = before - nodes.len();
    for node in nodes.iter_mut() {
        removed += prune(&mut node.children, kind);
    }
    removed
}

impl DocumentStore for MemoryHost {
    fn selected_template(&self) -> Option<TemplateId> {
        self.state.read().template.clone()
    }

    fn blocks(&self) -> Vec<BlockNode> {
        self.state.read().blocks.clone()
    }

    fn is_typing(&self) -> bool {
        self.state.read().typing
    }
}

impl BlockTypeRegistry for MemoryHost {
    fn block_type(&self, kind: &BlockKind) -> Option<BlockType> {
        self.state.read().registry.get(kind).cloned()
    }

    fn add_block_types(&self, definitions: Vec<BlockType>) {
        let kinds: Vec<BlockKind> = {
            let mut state = self.state.write();
            let kinds: Vec<BlockKind> = definitions.iter().map(|d| d.kind.clone()).collect();
            for def in definitions {
                state.registry.insert(def.kind.clone(), def);
            }
            state.registry_calls.push(RegistryCall::Add(kinds.clone()));
            kinds
        };
        self.bus.publish(StoreChange::BlockTypesAdded { kinds });
    }

    fn remove_block_types(&self, kinds: &[BlockKind]) {
        {
            let mut state = self.state.write();
            for kind in kinds {
                state.registry.shift_remove(kind);
            }
            state.registry_calls.push(RegistryCall::Remove(kinds.to_vec()));
        }
        self.bus.publish(StoreChange::BlockTypesRemoved {
            kinds: kinds.to_vec(),
        });
    }
}

impl EditorSettings for MemoryHost {
    fn available_templates(&self) -> TemplateCatalog {
        self.state.read().offered.clone()
    }

    fn set_available_templates(&self, catalog: TemplateCatalog) {
        let count = catalog.len();
        self.state.write().offered = catalog;
        self.bus.publish(StoreChange::TemplatesOffered { count });
    }

    fn is_panel_opened(&self, panel: &str) -> bool {
        self.state.read().open_panels.contains(panel)
    }

    fn active_sidebar(&self) -> Option<String> {
        self.state.read().sidebar.clone()
    }
}

impl NoticeSink for MemoryHost {
    fn apply(&self, update: NoticeUpdate) {
        let mut state = self.state.write();
        state.notice = match &update {
            NoticeUpdate::Show(notice) => Some(notice.clone()),
            NoticeUpdate::Hide => None,
        };
        state.notice_log.push(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::shared_change_bus;

    fn host() -> MemoryHost {
        MemoryHost::new(shared_change_bus(64), TemplateCatalog::new().with("default", "Default"))
    }

    #[test]
    fn every_mutation_publishes() {
        let host = host();
        let mut sub = host.bus().subscribe(&[">"]);

        host.select_template(Some("tpl-super"));
        host.insert_block(BlockNode::new("core/code"));
        host.set_typing(true);
        host.open_panel("page-attributes");
        host.remove_block_types(&[BlockKind::from("core/code")]);

        let subjects: Vec<&str> = std::iter::from_fn(|| sub.try_recv())
            .map(|change| change.subject())
            .collect();
        assert_eq!(
            subjects,
            [
                "editor.template",
                "document.blocks",
                "editor.typing",
                "settings.panel",
                "registry.removed",
            ]
        );
    }

    #[test]
    fn remove_blocks_prunes_nested() {
        let host = host();
        host.set_blocks(vec![
            BlockNode::new("core/code"),
            BlockNode::new("core/group")
                .child(BlockNode::new("core/code").child(BlockNode::new("core/paragraph")))
                .child(BlockNode::new("core/paragraph")),
        ]);

        assert_eq!(host.remove_blocks("core/code"), 2);
        assert_eq!(
            host.blocks(),
            [BlockNode::new("core/group").child(BlockNode::new("core/paragraph"))]
        );
    }

    #[test]
    fn registry_batches_are_recorded() {
        let host = host();
        host.register_block_types(vec![BlockType::new("core/code", "Code")]);
        assert!(host.registry_calls().is_empty());

        host.remove_block_types(&[BlockKind::from("core/code"), BlockKind::from("acme/ghost")]);
        assert!(!host.is_registered("core/code"));
        host.add_block_types(vec![BlockType::new("core/code", "Code")]);
        assert_eq!(host.registry_calls().len(), 2);
        assert_eq!(host.registered_kinds(), [BlockKind::from("core/code")]);
    }

    #[test]
    fn notice_tracks_last_update() {
        let host = host();
        host.apply(NoticeUpdate::Show(Notice::new("why", ["Code"])));
        assert_eq!(host.notice().unwrap().items, ["Code Block"]);
        host.apply(NoticeUpdate::Hide);
        assert!(host.notice().is_none());
        assert_eq!(host.notice_log().len(), 2);
    }
}
