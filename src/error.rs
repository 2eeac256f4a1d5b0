use thiserror::Error;

use crate::roster::StudentId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid roster format: {0}")]
    Format(String),

    #[error("student not found: {0}")]
    NotFound(StudentId),

    #[error("no students in study group to export")]
    EmptyGroup,
}

impl EngineError {
    /// Stable code used in the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Format(_) => "format_error",
            EngineError::NotFound(_) => "not_found",
            EngineError::EmptyGroup => "empty_group",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
