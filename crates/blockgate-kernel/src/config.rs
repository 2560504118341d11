//! Session configuration, loaded from RON.
//!
//! ```ron
//! (
//!     restrictions: {
//!         "core/code": ["template-super-cool.php"],
//!     },
//!     default_template: "default",
//!     renarrow: RestrictedCount,
//!     notice: (
//!         panel: "page-attributes",
//!         sidebar: "edit-post/document",
//!     ),
//! )
//! ```
//!
//! Only `restrictions` is required.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use blockgate_types::{BlockKind, RestrictionTable, TemplateId};

use crate::error::ConfigError;

/// Panel the notice is rendered under.
pub const DEFAULT_NOTICE_PANEL: &str = "page-attributes";

/// Sidebar that must be active for the notice to be visible.
pub const DEFAULT_NOTICE_SIDEBAR: &str = "edit-post/document";

pub const DEFAULT_NOTICE_MESSAGE: &str = "Some page templates are currently unavailable because they are incompatible with the following blocks on this page. You will need to remove them in order to make those templates available again.";

/// When the template controller recomputes the offered templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum RenarrowPolicy {
    /// Only when the number of distinct restricted kinds changes.
    ///
    /// Swapping one restricted kind for another leaves the offer stale until
    /// the count moves again.
    #[default]
    #[strum(to_string = "RestrictedCount", serialize = "count")]
    RestrictedCount,
    /// Whenever the set of restricted kinds changes.
    #[strum(to_string = "RestrictedSet", serialize = "set")]
    RestrictedSet,
}

impl RenarrowPolicy {
    /// Whether moving from `previous` to `current` warrants renarrowing.
    pub fn should_renarrow(&self, previous: &[BlockKind], current: &[BlockKind]) -> bool {
        match self {
            Self::RestrictedCount => previous.len() != current.len(),
            Self::RestrictedSet => {
                previous.len() != current.len() || previous.iter().any(|k| !current.contains(k))
            }
        }
    }
}

/// Where and what the restriction notice shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeConfig {
    pub panel: String,
    pub sidebar: String,
    pub message: String,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            panel: DEFAULT_NOTICE_PANEL.to_string(),
            sidebar: DEFAULT_NOTICE_SIDEBAR.to_string(),
            message: DEFAULT_NOTICE_MESSAGE.to_string(),
        }
    }
}

/// Everything a [`Session`](crate::Session) is configured with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub restrictions: RestrictionTable,
    /// Template assumed when the document has no selection.
    #[serde(default)]
    pub default_template: TemplateId,
    #[serde(default)]
    pub renarrow: RenarrowPolicy,
    #[serde(default)]
    pub notice: NoticeConfig,
}

impl Default for GateConfig {
    /// The stock table: code blocks only under the super cool template.
    fn default() -> Self {
        Self::new(RestrictionTable::new().with("core/code", ["template-super-cool.php"]))
    }
}

impl GateConfig {
    pub fn new(restrictions: RestrictionTable) -> Self {
        Self {
            restrictions,
            default_template: TemplateId::default_template(),
            renarrow: RenarrowPolicy::default(),
            notice: NoticeConfig::default(),
        }
    }

    pub fn with_renarrow(mut self, policy: RenarrowPolicy) -> Self {
        self.renarrow = policy;
        self
    }

    /// Parse and validate RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text)?;
        tracing::debug!(
            path = %path.display(),
            restricted = config.restrictions.len(),
            "loaded restriction config"
        );
        Ok(config)
    }

    /// Reject blank identifiers and kinds with no templates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        TemplateId::parse(self.default_template.as_str())?;
        for (kind, templates) in self.restrictions.iter() {
            BlockKind::parse(kind.as_str())?;
            if templates.is_empty() {
                return Err(ConfigError::EmptyTemplateSet(kind.clone()));
            }
            for template in templates {
                TemplateId::parse(template.as_str())?;
            }
        }
        Ok(())
    }
}
