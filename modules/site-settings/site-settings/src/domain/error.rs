use site_settings_sdk::errors::SettingsError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Settings not loaded yet")]
    NotReady,

    #[error("Persisting settings failed: {message}")]
    PersistenceFailure { message: String },

    #[error("Loading settings failed: {message}")]
    LoadFailure { message: String },
}

impl DomainError {
    /// Store failures carry their whole `anyhow` chain into the message.
    #[must_use]
    pub fn persistence(err: &anyhow::Error) -> Self {
        Self::PersistenceFailure {
            message: format!("{err:#}"),
        }
    }

    #[must_use]
    pub fn load(err: &anyhow::Error) -> Self {
        Self::LoadFailure {
            message: format!("{err:#}"),
        }
    }
}

impl From<DomainError> for SettingsError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotReady => Self::not_ready(),
            DomainError::PersistenceFailure { message } => Self::persistence(message),
            DomainError::LoadFailure { message } => Self::load(message),
        }
    }
}
