//! Typed identifiers for block kinds and page templates.
//!
//! Both are opaque strings owned by the host editor (`core/code`,
//! `template-super-cool.php`). Wrapping them keeps a block kind from being
//! passed where a template is expected; the wire form stays a bare string.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A block type name (e.g. `core/code`, `acme/hero`).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKind(String);

/// A page template identifier (e.g. `default`, `template-wide.php`).
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

/// Rejected identifier text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("{0} identifier is empty")]
    Empty(&'static str),
    #[error("{kind} identifier {value:?} has surrounding whitespace")]
    Whitespace { kind: &'static str, value: String },
}

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_string_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Wrap an identifier without validation.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Parse host-supplied text, rejecting blank or padded values.
            pub fn parse(s: &str) -> Result<Self, IdError> {
                if s.is_empty() {
                    return Err(IdError::Empty($name));
                }
                if s.trim() != s {
                    return Err(IdError::Whitespace {
                        kind: $name,
                        value: s.to_string(),
                    });
                }
                Ok(Self(s.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $T {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $T {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $T {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $T {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $T {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $T {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", $name, self.0)
            }
        }
    };
}

impl_string_id!(BlockKind, "BlockKind");
impl_string_id!(TemplateId, "TemplateId");

// ── TemplateId sentinels ────────────────────────────────────────────────────

/// The template the host reports when a document has no explicit selection.
pub const DEFAULT_TEMPLATE: &str = "default";

impl TemplateId {
    /// The `"default"` template, used when the host reports no selection.
    pub fn default_template() -> Self {
        Self(DEFAULT_TEMPLATE.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_TEMPLATE
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::default_template()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_blank_and_padded() {
        assert_eq!(BlockKind::parse(""), Err(IdError::Empty("BlockKind")));
        assert!(matches!(
            TemplateId::parse(" wide.php"),
            Err(IdError::Whitespace { kind: "TemplateId", .. })
        ));
        assert_eq!(BlockKind::parse("core/code").unwrap(), "core/code");
    }

    #[test]
    fn serde_is_transparent() {
        let kind = BlockKind::from("core/code");
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"core/code\"");
        let tpl: TemplateId = serde_json::from_str("\"wide.php\"").unwrap();
        assert_eq!(tpl.as_str(), "wide.php");
    }

    #[test]
    fn default_template_sentinel() {
        assert!(TemplateId::default().is_default());
        assert!(!TemplateId::from("wide.php").is_default());
        assert_eq!(format!("{:?}", TemplateId::default()), "TemplateId(\"default\")");
    }
}
