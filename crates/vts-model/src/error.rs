use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid {kind}: {value:?}")]
    InvalidId { kind: &'static str, value: String },

    #[error("trial needs at least one participant")]
    NoParticipants,

    #[error("variety {variety} is listed more than once")]
    DuplicateParticipant { variety: String },

    #[error("standard variety {variety} is not among the participants")]
    StandardNotParticipant { variety: String },

    #[error("trial {trial} has no standard participant")]
    MissingStandard { trial: String },

    #[error("trial {trial} has {count} standard participants")]
    MultipleStandards { trial: String, count: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
