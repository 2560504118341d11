//! One offline settle of both controllers against an in-memory editor.

use std::sync::Arc;

use serde::Serialize;

use blockgate_kernel::flows::DEFAULT_BUS_CAPACITY;
use blockgate_kernel::{
    GateConfig, HostHandles, MemoryHost, Notice, Session, scan_blocks, shared_change_bus,
};
use blockgate_types::{BlockKind, BlockNode, BlockType, TemplateCatalog, TemplateId, Walk};

/// Everything a check needs besides the config.
#[derive(Debug, Default)]
pub struct CheckInput {
    pub document: Vec<BlockNode>,
    /// Selected template; `None` leaves the document on the default.
    pub template: Option<TemplateId>,
    /// Template catalog; derived from the config when absent.
    pub catalog: Option<TemplateCatalog>,
    /// Registered block types; derived from the document and config when absent.
    pub block_types: Option<Vec<BlockType>>,
    /// Render the notice as if the document sidebar were open.
    pub sidebar_open: bool,
}

/// What the editor would look like after the controllers settle.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub template: TemplateId,
    pub restricted_blocks: Vec<BlockKind>,
    pub registered: Vec<BlockKind>,
    pub unregistered: Vec<BlockKind>,
    pub offered_templates: TemplateCatalog,
    pub notice: Option<Notice>,
    pub rounds: usize,
}

pub fn run_check(config: &GateConfig, input: CheckInput) -> CheckReport {
    let catalog = input.catalog.unwrap_or_else(|| derive_catalog(config));
    let block_types = input
        .block_types
        .unwrap_or_else(|| derive_block_types(&input.document, config));

    let bus = shared_change_bus(DEFAULT_BUS_CAPACITY);
    let host = Arc::new(MemoryHost::new(bus.clone(), catalog));
    host.register_block_types(block_types);
    if input.sidebar_open {
        host.open_panel(&config.notice.panel);
        host.set_sidebar(Some(&config.notice.sidebar));
    }
    host.select_template(input.template.as_ref().map(TemplateId::as_str));
    host.set_blocks(input.document.clone());

    let mut session = Session::new(config, HostHandles::from_shared(host.clone(), bus));
    let stats = session.start();
    tracing::debug!(?stats, "check settled");

    let scan = scan_blocks(&input.document, &config.restrictions);
    CheckReport {
        template: session.block_controller().current_template().clone(),
        restricted_blocks: scan.restricted_blocks,
        registered: host.registered_kinds(),
        unregistered: session
            .block_controller()
            .unregistered_blocks()
            .keys()
            .cloned()
            .collect(),
        offered_templates: host.offered_templates(),
        notice: host.notice(),
        rounds: stats.rounds,
    }
}

/// The default template plus every template the restriction table names,
/// each labelled with its own id.
pub fn derive_catalog(config: &GateConfig) -> TemplateCatalog {
    let mut catalog =
        TemplateCatalog::new().with(config.default_template.clone(), "Default template");
    for (_, templates) in config.restrictions.iter() {
        for template in templates {
            if !catalog.contains(template.as_str()) {
                catalog.insert(template.clone(), template.as_str());
            }
        }
    }
    catalog
}

/// One block type per kind seen in the document or the restriction table.
pub fn derive_block_types(document: &[BlockNode], config: &GateConfig) -> Vec<BlockType> {
    let mut kinds: Vec<&BlockKind> = config.restrictions.kinds().collect();
    for node in Walk::forest(document) {
        if !kinds.contains(&&node.kind) {
            kinds.push(&node.kind);
        }
    }
    kinds
        .into_iter()
        .map(|kind| BlockType::new(kind.clone(), title_from_kind(kind.as_str())))
        .collect()
}

/// `"core/code"` → `"Code"`, `"acme/hero-banner"` → `"Hero Banner"`.
fn title_from_kind(kind: &str) -> String {
    let name = kind.rsplit('/').next().unwrap_or(kind);
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
