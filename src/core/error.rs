//=========================================================================
// Engine Errors
//=========================================================================
//
// Error taxonomy shared by every engine subsystem.
//
// Nothing is retried: each error surfaces synchronously from the call
// that triggered it. Construction failures leave no usable engine;
// per-tick failures propagate out of `Engine::tick` and the host loop
// decides whether to continue.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use thiserror::Error;

//=== EngineError =========================================================

#[derive(Debug, Error)]
pub enum EngineError {
    /// A required file or setting is missing or malformed
    /// (no kernel plugin, unreadable plugin dir, bad config file).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A dynamic library failed to load or does not expose the
    /// expected symbols or ABI version.
    #[error("failed to load '{}': {message}", .path.display())]
    Load { path: PathBuf, message: String },

    /// A collaborator failed at runtime (null kernel, texture miss,
    /// canvas not set).
    #[error("runtime error: {0}")]
    Runtime(String),

    /// A translated event could not be reconstructed for dispatch.
    #[error("event dispatch failed: {0}")]
    Dispatch(String),
}

impl EngineError {
    pub(crate) fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result alias used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

//=========================================================================
// Unit Tests
//=========================================================================
