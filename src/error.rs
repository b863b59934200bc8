use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything that can stop a data update.  All variants are terminal for a run.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("source data invalid: {0}")]
    SourceDataInvalid(String),

    #[error("failed writing {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl UpdateError {
    pub fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        UpdateError::PersistenceFailure {
            path: path.into(),
            source,
        }
    }

    /// Short name of the error kind, used in the job's log line.
    pub fn kind(&self) -> &'static str {
        match self {
            UpdateError::SourceUnavailable(_) => "SourceUnavailable",
            UpdateError::SourceDataInvalid(_) => "SourceDataInvalid",
            UpdateError::PersistenceFailure { .. } => "PersistenceFailure",
            UpdateError::Config(_) => "Config",
        }
    }
}
