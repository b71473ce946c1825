//! Common error types for skillhub

use thiserror::Error;

/// Common result type for skillhub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across skillhub services
///
/// The submission path classifies recording failures by variant:
/// `SkillNotFound` is the only kind that triggers a compensating
/// invalid-skill report; everything else propagates as-is.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected before any side effect occurred
    #[error("{reason} (project [{project_id}], skill [{skill_id}])")]
    Validation {
        project_id: String,
        skill_id: String,
        reason: String,
    },

    /// Identity resolution failure; never retried
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Referenced skill does not exist in the project
    #[error("Skill [{skill_id}] does not exist in project [{project_id}]")]
    SkillNotFound {
        project_id: String,
        skill_id: String,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Validation failure bound to the submission's (project, skill) pair
    pub fn validation(project_id: &str, skill_id: &str, reason: impl Into<String>) -> Self {
        Error::Validation {
            project_id: project_id.to_string(),
            skill_id: skill_id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn skill_not_found(project_id: &str, skill_id: &str) -> Self {
        Error::SkillNotFound {
            project_id: project_id.to_string(),
            skill_id: skill_id.to_string(),
        }
    }
}
