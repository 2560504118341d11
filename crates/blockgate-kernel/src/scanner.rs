//! Block-tree scan: which restricted blocks are present, and which templates
//! every one of them accepts.

use serde::Serialize;

use blockgate_types::{BlockKind, BlockNode, RestrictionTable, TemplateId, Walk};

/// Result of scanning a block forest against a restriction table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Distinct restricted kinds present, first-seen in document pre-order.
    pub restricted_blocks: Vec<BlockKind>,
    /// Templates acceptable to every restricted block present.
    ///
    /// Empty means no restriction is in effect, either because no restricted
    /// block is present or because their template sets share nothing.
    pub templates: Vec<TemplateId>,
}

impl ScanResult {
    /// Whether the offered templates should be narrowed.
    pub fn is_restricted(&self) -> bool {
        !self.templates.is_empty()
    }
}

/// Scan every node at every depth. Pure; safe to call on every tick.
///
/// Children are visited whether or not their parent is restricted. The
/// intersection keeps the order of the first recorded template set.
pub fn scan_blocks(forest: &[BlockNode], table: &RestrictionTable) -> ScanResult {
    let mut restricted_blocks: Vec<BlockKind> = Vec::new();
    let mut templates: Option<Vec<TemplateId>> = None;

    for node in Walk::forest(forest) {
        let Some(allowed) = table.allowed(node.kind.as_str()) else {
            continue;
        };

        templates = Some(match templates.take() {
            None => allowed.to_vec(),
            Some(mut acc) => {
                acc.retain(|t| allowed.contains(t));
                acc
            }
        });

        if !restricted_blocks.contains(&node.kind) {
            restricted_blocks.push(node.kind.clone());
        }
    }

    ScanResult {
        restricted_blocks,
        templates: templates.unwrap_or_default(),
    }
}
