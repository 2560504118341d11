//! Keeps the block registry in step with the selected template.
//!
//! Restricted kinds that the current template does not allow are pulled out
//! of the host registry and parked in a cache; when the template changes to
//! one that allows them again, the parked definitions go back verbatim.
//!
//! # Invariant
//!
//! A restricted kind is never both registered and cached. Every removal
//! snapshots the definition first and every re-add drains it from the cache.

use std::sync::Arc;

use indexmap::IndexMap;

use blockgate_types::{BlockKind, BlockType, RestrictionTable, TemplateId};

use crate::flows::{ChangeBus, Subscription};
use crate::host::{BlockTypeRegistry, DocumentStore};

/// Only the template selection and the typing flag affect the registry.
pub const BLOCK_SUBJECTS: &[&str] = &["editor.*"];

/// Outcome of one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Kinds removed from the registry in this pass's batch.
    pub removed: Vec<BlockKind>,
    /// Kinds restored to the registry in this pass's batch.
    pub restored: Vec<BlockKind>,
}

/// Adds and removes block registrations as the template changes.
pub struct BlockAvailabilityController {
    restrictions: Arc<RestrictionTable>,
    documents: Arc<dyn DocumentStore>,
    registry: Arc<dyn BlockTypeRegistry>,
    default_template: TemplateId,
    current_template: TemplateId,
    unregistered_blocks: IndexMap<BlockKind, BlockType>,
    subscription: Option<Subscription>,
}

impl BlockAvailabilityController {
    pub fn new(
        restrictions: Arc<RestrictionTable>,
        documents: Arc<dyn DocumentStore>,
        registry: Arc<dyn BlockTypeRegistry>,
    ) -> Self {
        Self {
            restrictions,
            documents,
            registry,
            default_template: TemplateId::default_template(),
            current_template: TemplateId::default_template(),
            unregistered_blocks: IndexMap::new(),
            subscription: None,
        }
    }

    /// Use a different fallback than `"default"` for an unset template.
    pub fn with_default_template(mut self, template: TemplateId) -> Self {
        self.current_template = template.clone();
        self.default_template = template;
        self
    }

    pub fn current_template(&self) -> &TemplateId {
        &self.current_template
    }

    /// Definitions currently parked out of the registry.
    pub fn unregistered_blocks(&self) -> &IndexMap<BlockKind, BlockType> {
        &self.unregistered_blocks
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Reconcile against the current selection, then start listening.
    pub fn run(&mut self, bus: &ChangeBus) {
        self.current_template = self.read_template();
        tracing::debug!(template = %self.current_template, "block availability starting");
        self.restrict_blocks_to_template();
        self.subscription = Some(bus.subscribe(BLOCK_SUBJECTS));
    }

    /// Handle every queued change tick. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(change) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            tracing::trace!(subject = change.subject(), "block availability tick");
            self.on_change();
            handled += 1;
        }
        handled
    }

    /// React to one store change. Returns whether a reconciliation ran.
    pub fn on_change(&mut self) -> bool {
        if self.documents.is_typing() {
            tracing::trace!("typing; registry left alone");
            return false;
        }

        let template = self.read_template();
        if template == self.current_template {
            return false;
        }

        tracing::debug!(from = %self.current_template, to = %template, "template changed");
        self.current_template = template;
        self.restrict_blocks_to_template();
        true
    }

    /// Bring the registry in line with `current_template`.
    ///
    /// Idempotent: a second pass with nothing changed moves nothing. Kinds the
    /// registry does not know and the cache does not hold are skipped.
    pub fn restrict_blocks_to_template(&mut self) -> Reconciliation {
        let (to_add, to_remove) = self.restrictions.partition(&self.current_template);
        let mut outcome = Reconciliation::default();

        if !to_remove.is_empty() {
            for kind in to_remove {
                if self.unregistered_blocks.contains_key(kind) {
                    continue;
                }
                if let Some(definition) = self.registry.block_type(kind) {
                    self.unregistered_blocks.insert(kind.clone(), definition);
                    outcome.removed.push(kind.clone());
                }
            }
            if !self.unregistered_blocks.is_empty() {
                let parked: Vec<BlockKind> = self.unregistered_blocks.keys().cloned().collect();
                self.registry.remove_block_types(&parked);
            }
        }

        if !to_add.is_empty() {
            let mut restored = Vec::new();
            for kind in to_add {
                if self.registry.block_type(kind).is_some() {
                    continue;
                }
                if let Some(definition) = self.unregistered_blocks.shift_remove(kind) {
                    outcome.restored.push(kind.clone());
                    restored.push(definition);
                }
            }
            if !restored.is_empty() {
                self.registry.add_block_types(restored);
            }
        }

        tracing::debug!(
            template = %self.current_template,
            removed = outcome.removed.len(),
            restored = outcome.restored.len(),
            parked = self.unregistered_blocks.len(),
            "reconciled block registry"
        );
        outcome
    }

    fn read_template(&self) -> TemplateId {
        self.documents
            .selected_template()
            .unwrap_or_else(|| self.default_template.clone())
    }
}

impl std::fmt::Debug for BlockAvailabilityController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockAvailabilityController")
            .field("current_template", &self.current_template)
            .field("unregistered", &self.unregistered_blocks.keys().collect::<Vec<_>>())
            .field("subscribed", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryHost, RegistryCall};
    use crate::flows::shared_change_bus;
    use blockgate_types::{BlockNode, TemplateCatalog};

    fn setup() -> (Arc<MemoryHost>, BlockAvailabilityController) {
        let bus = shared_change_bus(64);
        let host = Arc::new(MemoryHost::new(bus, TemplateCatalog::new()));
        host.register_block_types(vec![
            BlockType::new("core/paragraph", "Paragraph"),
            BlockType::new("core/code", "Code").with_setting("category", "formatting".into()),
            BlockType::new("acme/hero", "Hero"),
        ]);
        let table = RestrictionTable::new()
            .with("core/code", ["tpl-super"])
            .with("acme/hero", ["tpl-super", "tpl-wide"]);
        let controller =
            BlockAvailabilityController::new(Arc::new(table), host.clone(), host.clone());
        (host, controller)
    }

    #[test]
    fn unset_template_falls_back_to_default() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());
        assert!(controller.current_template().is_default());
        assert!(host.is_registered("core/paragraph"));
        assert!(!host.is_registered("core/code"));
        assert!(!host.is_registered("acme/hero"));
        assert_eq!(controller.unregistered_blocks().len(), 2);
    }

    #[test]
    fn removal_is_one_batch() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());
        assert_eq!(
            host.registry_calls(),
            [RegistryCall::Remove(vec![
                BlockKind::from("core/code"),
                BlockKind::from("acme/hero"),
            ])]
        );
    }

    #[test]
    fn template_switch_restores_allowed_kinds() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());

        host.select_template(Some("tpl-wide"));
        assert!(controller.on_change());
        assert!(host.is_registered("acme/hero"));
        assert!(!host.is_registered("core/code"));
        assert_eq!(
            controller.unregistered_blocks().keys().collect::<Vec<_>>(),
            [&BlockKind::from("core/code")]
        );
    }

    #[test]
    fn unchanged_template_is_a_no_op() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());
        host.clear_registry_calls();

        host.set_typing(false);
        assert!(!controller.on_change());
        assert!(host.registry_calls().is_empty());
    }

    #[test]
    fn typing_suspends_reconciliation() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());
        host.clear_registry_calls();

        host.set_typing(true);
        host.select_template(Some("tpl-super"));
        assert!(!controller.on_change());
        assert!(controller.current_template().is_default());
        assert!(host.registry_calls().is_empty());

        host.set_typing(false);
        assert!(controller.on_change());
        assert!(host.is_registered("core/code"));
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());
        let registry = host.registered_kinds();
        let cache = controller.unregistered_blocks().clone();

        let second = controller.restrict_blocks_to_template();
        assert_eq!(second, Reconciliation::default());
        assert_eq!(host.registered_kinds(), registry);
        assert_eq!(controller.unregistered_blocks(), &cache);
    }

    #[test]
    fn restored_definition_is_identical() {
        let (host, mut controller) = setup();
        let original = host.block_type(&BlockKind::from("core/code")).unwrap();
        controller.run(&host.bus());

        host.select_template(Some("tpl-super"));
        controller.on_change();
        assert_eq!(host.block_type(&BlockKind::from("core/code")), Some(original));
    }

    #[test]
    fn unknown_kinds_are_ignored() {
        let bus = shared_change_bus(16);
        let host = Arc::new(MemoryHost::new(bus, TemplateCatalog::new()));
        let table = RestrictionTable::new().with("acme/ghost", ["tpl-super"]);
        let mut controller =
            BlockAvailabilityController::new(Arc::new(table), host.clone(), host.clone());

        controller.run(&host.bus());
        assert!(controller.unregistered_blocks().is_empty());
        assert!(host.registry_calls().is_empty());

        host.select_template(Some("tpl-super"));
        assert!(controller.on_change());
        assert!(host.registry_calls().is_empty());
    }

    #[test]
    fn poll_drains_ticks() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());
        assert!(controller.is_subscribed());

        host.set_typing(true);
        host.select_template(Some("tpl-super"));
        host.set_typing(false);
        // the restore batch published mid-poll is a registry change, not an editor one
        assert_eq!(controller.poll(), 3);
        assert_eq!(controller.poll(), 0);
        assert_eq!(controller.current_template(), &TemplateId::from("tpl-super"));
    }

    #[test]
    fn custom_default_template() {
        let (host, controller) = setup();
        let mut controller = controller.with_default_template(TemplateId::from("tpl-wide"));
        controller.run(&host.bus());
        assert!(host.is_registered("acme/hero"));
        assert!(!host.is_registered("core/code"));
    }

    #[test]
    fn only_editor_changes_are_delivered() {
        let (host, mut controller) = setup();
        controller.run(&host.bus());

        host.set_blocks(vec![BlockNode::new("core/code")]);
        host.open_panel("page-attributes");
        host.remove_block_types(&[BlockKind::from("core/paragraph")]);
        assert_eq!(controller.poll(), 0);

        host.select_template(Some("tpl-wide"));
        assert_eq!(controller.poll(), 1);
        assert!(host.is_registered("acme/hero"));
    }
}
