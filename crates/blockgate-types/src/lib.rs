//! Shared block, template, and restriction types for blockgate.
//!
//! This crate is the vocabulary every other blockgate crate speaks. It has
//! **no internal blockgate dependencies** and holds no state beyond the
//! values themselves.
//!
//! # Relationships
//!
//! ```text
//! RestrictionTable ← static input, fixed for the session
//!     └── BlockKind → {TemplateId}
//!
//! Document forest (host-owned)
//!     └── BlockNode { kind, children }
//!
//! Registry entries (host-owned)
//!     └── BlockType { kind, title, ... }
//!
//! TemplateCatalog ← captured once at startup
//!     └── TemplateId → TemplateDescriptor
//! ```
//!
//! # Key Types
//!
//! |----------------------|------------------------------------------------|
//! | Type                 | Purpose                                        |
//! |----------------------|------------------------------------------------|
//! | [`BlockKind`]        | Block type name, e.g. `core/code`              |
//! | [`TemplateId`]       | Page template identifier, e.g. `full-width.php`|
//! | [`BlockNode`]        | One block instance in the document tree        |
//! | [`BlockType`]        | Full registry definition of a block kind       |
//! | [`TemplateCatalog`]  | Offerable templates with display metadata      |
//! | [`RestrictionTable`] | Which templates each restricted kind allows    |
//! |----------------------|------------------------------------------------|

pub mod block;
pub mod ids;
pub mod restriction;
pub mod template;

pub use block::{BlockNode, BlockType, Walk};
pub use ids::{BlockKind, IdError, TemplateId};
pub use restriction::RestrictionTable;
pub use template::{TemplateCatalog, TemplateDescriptor};
