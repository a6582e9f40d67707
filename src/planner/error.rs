use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerErrorKind {
    InvalidPolicy,
    InvalidCandidate,
    InvalidConfig,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct PlannerError {
    pub kind: PlannerErrorKind,
    pub message: String,
}

impl PlannerError {
    pub fn new(kind: PlannerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn invalid_policy(message: impl Into<String>) -> PlannerError {
    PlannerError::new(PlannerErrorKind::InvalidPolicy, message)
}

pub fn invalid_candidate(message: impl Into<String>) -> PlannerError {
    PlannerError::new(PlannerErrorKind::InvalidCandidate, message)
}

pub fn invalid_config(message: impl Into<String>) -> PlannerError {
    PlannerError::new(PlannerErrorKind::InvalidConfig, message)
}

pub fn persistence_error(message: impl Into<String>) -> PlannerError {
    PlannerError::new(PlannerErrorKind::Persistence, message)
}
