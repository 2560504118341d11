//! Property tests: random editing sessions must keep the registry, the block
//! cache, and the offered templates consistent after every settled pump.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use blockgate_kernel::flows::DEFAULT_BUS_CAPACITY;
use blockgate_kernel::{
    BlockTypeRegistry, DocumentStore, GateConfig, HostHandles, MemoryHost, RenarrowPolicy,
    Session, scan_blocks, shared_change_bus,
};
use blockgate_types::{
    BlockKind, BlockNode, BlockType, RestrictionTable, TemplateCatalog, TemplateId,
};

const TEMPLATES: &[&str] = &["default", "tpl-a", "tpl-b", "tpl-c"];
const KINDS: &[&str] = &["core/paragraph", "core/code", "acme/hero", "acme/map"];

#[derive(Clone, Debug)]
enum Op {
    Select(Option<usize>),
    Typing(bool),
    Insert(usize),
    Nest(usize, usize),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::option::of(0..TEMPLATES.len()).prop_map(Op::Select),
        any::<bool>().prop_map(Op::Typing),
        (0..KINDS.len()).prop_map(Op::Insert),
        (0..KINDS.len(), 0..KINDS.len()).prop_map(|(a, b)| Op::Nest(a, b)),
        (0..KINDS.len()).prop_map(Op::Remove),
    ]
}

fn table() -> RestrictionTable {
    RestrictionTable::new()
        .with("core/code", ["tpl-a"])
        .with("acme/hero", ["tpl-a", "tpl-b"])
        .with("acme/map", ["tpl-b", "tpl-c"])
        // never registered by the host
        .with("acme/ghost", ["tpl-c"])
}

fn catalog() -> TemplateCatalog {
    TEMPLATES
        .iter()
        .fold(TemplateCatalog::new(), |catalog, t| catalog.with(*t, format!("{t} label")))
}

fn start(policy: RenarrowPolicy) -> (Arc<MemoryHost>, Session) {
    let bus = shared_change_bus(DEFAULT_BUS_CAPACITY);
    let host = Arc::new(MemoryHost::new(bus.clone(), catalog()));
    host.register_block_types(
        KINDS
            .iter()
            .map(|k| BlockType::new(*k, k.rsplit('/').next().unwrap_or(*k)))
            .collect(),
    );
    let config = GateConfig::new(table()).with_renarrow(policy);
    let mut session = Session::new(&config, HostHandles::from_shared(host.clone(), bus));
    session.start();
    (host, session)
}

fn apply(host: &MemoryHost, op: &Op, typing: &mut bool) {
    match *op {
        Op::Select(t) => host.select_template(t.map(|i| TEMPLATES[i])),
        Op::Typing(on) => {
            *typing = on;
            host.set_typing(on);
        }
        Op::Insert(k) => host.insert_block(BlockNode::new(KINDS[k])),
        Op::Nest(outer, inner) => host.insert_block(
            BlockNode::new(KINDS[outer])
                .child(BlockNode::new("core/group").child(BlockNode::new(KINDS[inner]))),
        ),
        Op::Remove(k) => {
            host.remove_blocks(KINDS[k]);
        }
    }
}

fn effective_template(host: &MemoryHost) -> TemplateId {
    host.selected_template().unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn registry_and_cache_stay_disjoint(ops in proptest::collection::vec(op(), 0..40)) {
        let (host, mut session) = start(RenarrowPolicy::RestrictedCount);
        let table = table();
        let mut typing = false;

        for op in &ops {
            apply(&host, op, &mut typing);
            session.pump();

            let cache = session.block_controller().unregistered_blocks();
            for kind in table.kinds() {
                let registered = host.is_registered(kind.as_str());
                let parked = cache.contains_key(kind);
                if kind.as_str() == "acme/ghost" {
                    prop_assert!(!registered && !parked);
                } else {
                    prop_assert!(
                        registered != parked,
                        "{kind} registered={registered} parked={parked}"
                    );
                }
            }
            prop_assert!(host.is_registered("core/paragraph"));

            if !typing {
                let template = effective_template(&host);
                for kind in table.kinds().filter(|k| k.as_str() != "acme/ghost") {
                    prop_assert_eq!(
                        host.is_registered(kind.as_str()),
                        table.allows(kind.as_str(), &template)
                    );
                }
            }
        }
    }

    #[test]
    fn offered_templates_fit_every_restricted_block(ops in proptest::collection::vec(op(), 0..40)) {
        let (host, mut session) = start(RenarrowPolicy::RestrictedSet);
        let table = table();
        let mut typing = false;

        for op in &ops {
            apply(&host, op, &mut typing);
            session.pump();
            if typing {
                continue;
            }

            let scan = scan_blocks(&host.blocks(), &table);
            let offered: HashSet<TemplateId> = host.offered_templates().ids().cloned().collect();

            if scan.is_restricted() {
                let expected: HashSet<TemplateId> =
                    catalog().pick(&scan.templates).ids().cloned().collect();
                prop_assert_eq!(&offered, &expected);
                for kind in &scan.restricted_blocks {
                    for template in &offered {
                        prop_assert!(table.allows(kind.as_str(), template));
                    }
                }
                prop_assert!(host.notice().is_none(), "notice panel is closed in this harness");
            } else {
                prop_assert_eq!(offered.len(), TEMPLATES.len());
            }
        }
    }

    #[test]
    fn cached_definitions_are_unchanged(
        switches in proptest::collection::vec(proptest::option::of(0..TEMPLATES.len()), 1..20)
    ) {
        let (host, mut session) = start(RenarrowPolicy::RestrictedCount);
        let originals: Vec<BlockType> = KINDS
            .iter()
            .map(|k| BlockType::new(*k, k.rsplit('/').next().unwrap_or(*k)))
            .collect();

        for template in switches {
            host.select_template(template.map(|i| TEMPLATES[i]));
            session.pump();
        }
        host.select_template(Some("tpl-a"));
        session.pump();
        host.select_template(Some("tpl-b"));
        session.pump();

        let cache = session.block_controller().unregistered_blocks();
        for original in originals {
            let current = host
                .block_type(&original.kind)
                .or_else(|| cache.get(&original.kind).cloned());
            prop_assert_eq!(current, Some(original));
        }
        prop_assert!(cache.contains_key(&BlockKind::from("core/code")));
    }
}
