//! Block instances and block type definitions.
//!
//! A [`BlockNode`] is one placed block in the host's document tree; the core
//! only ever reads snapshots of it. A [`BlockType`] is the registry entry that
//! makes a kind insertable. Definitions removed from the registry must come
//! back byte-for-byte, so everything the host attaches beyond `kind` and
//! `title` rides along in `settings` untouched.

use serde::{Deserialize, Serialize};

use crate::ids::BlockKind;

/// One block instance in the document tree.
///
/// Accepts the host's wire names (`name`, `innerBlocks`) as aliases so a
/// serialized editor tree deserializes directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(alias = "name")]
    pub kind: BlockKind,
    /// Nested blocks in document order.
    #[serde(default, alias = "innerBlocks", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// A leaf block.
    pub fn new(kind: impl Into<BlockKind>) -> Self {
        Self {
            kind: kind.into(),
            children: Vec::new(),
        }
    }

    /// Append a child, builder style.
    pub fn child(mut self, node: BlockNode) -> Self {
        self.children.push(node);
        self
    }
}

/// Pre-order iterator over a forest of blocks.
///
/// Uses an explicit stack, so arbitrarily deep nesting cannot overflow.
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a BlockNode>,
}

impl<'a> Walk<'a> {
    /// Walk every tree in `forest` in document order.
    pub fn forest(forest: &'a [BlockNode]) -> Self {
        Self {
            stack: forest.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a BlockNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A block type definition as held by the host registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    #[serde(alias = "name")]
    pub kind: BlockKind,
    /// Human-facing title (`"Code"`), used in the restriction notice.
    pub title: String,
    /// Everything else the host keeps on the definition.
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl BlockType {
    pub fn new(kind: impl Into<BlockKind>, title: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            settings: serde_json::Map::new(),
        }
    }

    /// Attach a host setting, builder style.
    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }
}
