//! Error types for the site settings SDK.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// No settings record has been loaded yet.
    #[error("Settings not loaded yet")]
    NotReady,

    /// The settings store rejected a write or could not be reached.
    #[error("Failed to persist settings: {message}")]
    PersistenceFailure { message: String },

    /// The settings store could not be read.
    #[error("Failed to load settings: {message}")]
    LoadFailure { message: String },
}

impl SettingsError {
    #[must_use]
    pub fn not_ready() -> Self {
        Self::NotReady
    }

    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceFailure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn load(message: impl Into<String>) -> Self {
        Self::LoadFailure {
            message: message.into(),
        }
    }
}
