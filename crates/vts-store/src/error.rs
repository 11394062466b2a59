use std::path::PathBuf;

use thiserror::Error;
use vts_model::ModelError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize store snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse site catalog {source_name}: {message}")]
    Catalog {
        source_name: String,
        message: String,
    },

    #[error("duplicate trial id {id}")]
    DuplicateTrial { id: String },

    #[error("unknown trial {id}")]
    UnknownTrial { id: String },

    #[error("participant {participant} is not part of trial {trial}")]
    UnknownParticipant { trial: String, participant: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl StoreError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
