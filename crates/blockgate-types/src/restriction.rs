//! The static block kind → compatible templates table.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{BlockKind, TemplateId};

/// Which templates each restricted block kind may appear under.
///
/// Kinds absent from the table are unrestricted. Template lists are sets:
/// duplicates are dropped on construction, first occurrence kept. Declaration
/// order is preserved because it decides the order of scan output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RestrictionTable {
    entries: IndexMap<BlockKind, Vec<TemplateId>>,
}

impl RestrictionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a restricted kind, builder style.
    pub fn with<I, T>(mut self, kind: impl Into<BlockKind>, templates: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TemplateId>,
    {
        self.insert(kind, templates);
        self
    }

    /// Insert or replace the template set for `kind`.
    pub fn insert<I, T>(&mut self, kind: impl Into<BlockKind>, templates: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<TemplateId>,
    {
        let mut set: Vec<TemplateId> = Vec::new();
        for t in templates {
            let t = t.into();
            if !set.contains(&t) {
                set.push(t);
            }
        }
        self.entries.insert(kind.into(), set);
    }

    /// Compatible templates for `kind`, or `None` if it is unrestricted.
    pub fn allowed(&self, kind: &str) -> Option<&[TemplateId]> {
        self.entries.get(kind).map(Vec::as_slice)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Whether `kind` may be used under `template`. Unrestricted kinds always may.
    pub fn allows(&self, kind: &str, template: &TemplateId) -> bool {
        self.allowed(kind).is_none_or(|set| set.contains(template))
    }

    /// The table's domain, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = &BlockKind> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockKind, &[TemplateId])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split the domain into kinds allowed under `template` and kinds that are not.
    pub fn partition(&self, template: &TemplateId) -> (Vec<&BlockKind>, Vec<&BlockKind>) {
        let mut allowed = Vec::new();
        let mut denied = Vec::new();
        for (kind, set) in &self.entries {
            if set.contains(template) {
                allowed.push(kind);
            } else {
                denied.push(kind);
            }
        }
        (allowed, denied)
    }
}

impl<'de> Deserialize<'de> for RestrictionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<BlockKind, Vec<TemplateId>>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

impl FromIterator<(BlockKind, Vec<TemplateId>)> for RestrictionTable {
    fn from_iter<I: IntoIterator<Item = (BlockKind, Vec<TemplateId>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (kind, templates) in iter {
            table.insert(kind, templates);
        }
        table
    }
}
