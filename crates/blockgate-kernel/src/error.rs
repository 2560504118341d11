//! Error types for configuration loading.
//!
//! The reactive core has no failure paths; only reading and validating the
//! restriction config can fail.

use std::path::PathBuf;

use thiserror::Error;

use blockgate_types::{BlockKind, IdError};

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid RON for [`GateConfig`](crate::GateConfig).
    #[error("config parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// A restricted kind lists no templates at all.
    #[error("restricted block {0} lists no templates")]
    EmptyTemplateSet(BlockKind),

    /// A block kind or template id is blank or padded.
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdError),
}
