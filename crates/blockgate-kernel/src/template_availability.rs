//! Narrows the offered templates to those every restricted block accepts.
//!
//! On each tick the document is rescanned. The notice is re-decided every
//! time (its visibility depends on panel state the host may change at any
//! moment), but the offered templates are only recomputed when the
//! [`RenarrowPolicy`] says the restricted set moved.
//!
//! Within one tick the offer is narrowed before the notice is decided, so the
//! notice always reflects this tick's restriction rather than the previous one.

use std::collections::HashMap;
use std::sync::Arc;

use blockgate_types::{BlockKind, RestrictionTable, TemplateCatalog, TemplateId};

use crate::config::{NoticeConfig, RenarrowPolicy};
use crate::flows::{ChangeBus, Subscription};
use crate::host::{BlockTypeRegistry, DocumentStore, EditorSettings, NoticeSink};
use crate::notice::{Notice, NoticeUpdate};
use crate::scanner::{ScanResult, scan_blocks};

/// Everything the scan and the notice read. The offered templates are
/// written here and nowhere else, so `settings.templates` is left out.
pub const TEMPLATE_SUBJECTS: &[&str] =
    &["document.>", "editor.typing", "registry.*", "settings.panel"];

/// Host seams the template controller reads and writes.
#[derive(Clone)]
pub struct TemplateHost {
    pub documents: Arc<dyn DocumentStore>,
    /// Only read, for block titles in the notice.
    pub registry: Arc<dyn BlockTypeRegistry>,
    pub settings: Arc<dyn EditorSettings>,
    pub notices: Arc<dyn NoticeSink>,
}

/// Whitelists templates compatible with the blocks in the document.
pub struct TemplateAvailabilityController {
    restrictions: Arc<RestrictionTable>,
    host: TemplateHost,
    notice_config: NoticeConfig,
    policy: RenarrowPolicy,
    default_page_templates: TemplateCatalog,
    known_titles: HashMap<BlockKind, String>,
    current_restricted_blocks: Vec<BlockKind>,
    is_restricted: bool,
    subscription: Option<Subscription>,
}

impl TemplateAvailabilityController {
    /// Capture the host's full template catalog and the titles of every
    /// restricted kind that is registered right now.
    ///
    /// Titles are captured up front because the block controller may
    /// unregister a kind before its notice entry is rendered.
    pub fn new(restrictions: Arc<RestrictionTable>, host: TemplateHost) -> Self {
        let default_page_templates = host.settings.available_templates();
        let known_titles = restrictions
            .kinds()
            .filter_map(|kind| {
                host.registry
                    .block_type(kind)
                    .map(|def| (kind.clone(), def.title))
            })
            .collect();

        Self {
            restrictions,
            host,
            notice_config: NoticeConfig::default(),
            policy: RenarrowPolicy::default(),
            default_page_templates,
            known_titles,
            current_restricted_blocks: Vec::new(),
            is_restricted: false,
            subscription: None,
        }
    }

    pub fn with_notice_config(mut self, config: NoticeConfig) -> Self {
        self.notice_config = config;
        self
    }

    pub fn with_policy(mut self, policy: RenarrowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_restricted(&self) -> bool {
        self.is_restricted
    }

    pub fn current_restricted_blocks(&self) -> &[BlockKind] {
        &self.current_restricted_blocks
    }

    /// The catalog captured at construction; what an unrestricted offer restores.
    pub fn default_page_templates(&self) -> &TemplateCatalog {
        &self.default_page_templates
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Scan, narrow, decide the notice, then start listening.
    pub fn run(&mut self, bus: &ChangeBus) {
        let scan = self.scan();
        tracing::debug!(
            restricted = scan.restricted_blocks.len(),
            templates = scan.templates.len(),
            "template availability starting"
        );
        self.current_restricted_blocks = scan.restricted_blocks.clone();
        self.update_whitelisted_templates(&scan.templates);
        self.update_notice(&scan.restricted_blocks);
        self.subscription = Some(bus.subscribe(TEMPLATE_SUBJECTS));
    }

    /// Handle every queued change tick. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(change) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            tracing::trace!(subject = change.subject(), "template availability tick");
            self.on_change();
            handled += 1;
        }
        handled
    }

    /// React to one store change. Returns whether the offer was recomputed.
    pub fn on_change(&mut self) -> bool {
        if self.host.documents.is_typing() {
            tracing::trace!("typing; templates left alone");
            return false;
        }

        let scan = self.scan();
        let renarrow = self
            .policy
            .should_renarrow(&self.current_restricted_blocks, &scan.restricted_blocks);

        if renarrow {
            tracing::debug!(
                before = self.current_restricted_blocks.len(),
                after = scan.restricted_blocks.len(),
                policy = %self.policy,
                "restricted blocks changed"
            );
            self.current_restricted_blocks = scan.restricted_blocks.clone();
            self.update_whitelisted_templates(&scan.templates);
        }

        self.update_notice(&scan.restricted_blocks);
        renarrow
    }

    /// Offer exactly `templates`, or everything when `templates` is empty.
    pub fn update_whitelisted_templates(&mut self, templates: &[TemplateId]) {
        if templates.is_empty() {
            self.is_restricted = false;
            self.host
                .settings
                .set_available_templates(self.default_page_templates.clone());
            tracing::debug!(offered = self.default_page_templates.len(), "templates unrestricted");
        } else {
            self.is_restricted = true;
            let offered = self.default_page_templates.pick(templates);
            tracing::debug!(offered = offered.len(), "templates narrowed");
            self.host.settings.set_available_templates(offered);
        }
    }

    /// Show the notice iff narrowing is in effect and its panel is on screen.
    pub fn update_notice(&mut self, restricted_blocks: &[BlockKind]) {
        let update = if self.is_restricted && self.notice_panel_visible() {
            NoticeUpdate::Show(self.build_notice(restricted_blocks))
        } else {
            NoticeUpdate::Hide
        };
        self.host.notices.apply(update);
    }

    fn notice_panel_visible(&self) -> bool {
        let settings = &self.host.settings;
        settings.is_panel_opened(&self.notice_config.panel)
            && settings.active_sidebar().as_deref() == Some(self.notice_config.sidebar.as_str())
    }

    fn build_notice(&mut self, restricted_blocks: &[BlockKind]) -> Notice {
        let titles: Vec<String> = restricted_blocks
            .iter()
            .map(|kind| self.block_title(kind))
            .collect();
        Notice::new(
            self.notice_config.message.clone(),
            titles.iter().map(String::as_str),
        )
    }

    /// Registered title, else the one captured earlier, else the raw kind.
    fn block_title(&mut self, kind: &BlockKind) -> String {
        if let Some(def) = self.host.registry.block_type(kind) {
            self.known_titles.insert(kind.clone(), def.title.clone());
            return def.title;
        }
        self.known_titles
            .get(kind)
            .cloned()
            .unwrap_or_else(|| kind.to_string())
    }

    fn scan(&self) -> ScanResult {
        scan_blocks(&self.host.documents.blocks(), &self.restrictions)
    }
}

impl std::fmt::Debug for TemplateAvailabilityController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateAvailabilityController")
            .field("is_restricted", &self.is_restricted)
            .field("current_restricted_blocks", &self.current_restricted_blocks)
            .field("policy", &self.policy)
            .field("subscribed", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}
