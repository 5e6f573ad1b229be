// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Transient remote failure. Nothing is retried in place; the owning
    /// event or request stays pending and is picked up on the next poll.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401/403 from an authenticated call. Forces a local logout.
    #[error("Authentication rejected (status {0})")]
    Auth(u16),

    /// Downloaded content did not match the expected hash.
    #[error("Integrity check failed for {path}: expected {expected}, got {actual}")]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// A persisted file could not be read or parsed. Callers reset the
    /// affected state to defaults instead of propagating this.
    #[error("Corrupt state: {0}")]
    CorruptState(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// True for 401/403 responses, which must invalidate the local session.
    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
