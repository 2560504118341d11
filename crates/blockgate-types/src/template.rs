//! Page template catalog.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::TemplateId;

/// Display metadata for one template. On the wire this is just the label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateDescriptor {
    pub label: String,
}

impl TemplateDescriptor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Ordered map of template id → descriptor, as the host offers them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCatalog {
    entries: IndexMap<TemplateId, TemplateDescriptor>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, builder style.
    pub fn with(mut self, id: impl Into<TemplateId>, label: impl Into<String>) -> Self {
        self.insert(id, label);
        self
    }

    pub fn insert(&mut self, id: impl Into<TemplateId>, label: impl Into<String>) {
        self.entries.insert(id.into(), TemplateDescriptor::new(label));
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDescriptor> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TemplateId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TemplateId, &TemplateDescriptor)> {
        self.entries.iter()
    }

    /// Sub-catalog holding only `ids`, in the order given.
    ///
    /// Ids the catalog does not know are skipped.
    pub fn pick<'a>(&self, ids: impl IntoIterator<Item = &'a TemplateId>) -> Self {
        let mut entries = IndexMap::new();
        for id in ids {
            if let Some(desc) = self.entries.get(id) {
                entries.insert(id.clone(), desc.clone());
            }
        }
        Self { entries }
    }
}

impl FromIterator<(TemplateId, TemplateDescriptor)> for TemplateCatalog {
    fn from_iter<I: IntoIterator<Item = (TemplateId, TemplateDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::new()
            .with("default", "Default template")
            .with("tpl-super", "Super Cool")
            .with("tpl-wide", "Wide")
    }

    #[test]
    fn pick_follows_requested_order_and_skips_unknown() {
        let picked = catalog().pick(&[
            TemplateId::from("tpl-wide"),
            TemplateId::from("missing.php"),
            TemplateId::from("default"),
        ]);
        let ids: Vec<&str> = picked.ids().map(TemplateId::as_str).collect();
        assert_eq!(ids, ["tpl-wide", "default"]);
    }

    #[test]
    fn pick_nothing_is_empty() {
        assert!(catalog().pick(std::iter::empty::<&TemplateId>()).is_empty());
    }

    #[test]
    fn wire_form_is_a_plain_object() {
        let json = serde_json::to_value(catalog()).unwrap();
        assert_eq!(json["tpl-super"], "Super Cool");
        let back: TemplateCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, catalog());
    }
}
