use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use site_settings_sdk::flags::SettingsFlag;
use site_settings_sdk::models::{
    ConfigurationSummary, FlagControl, SaveNoticeKind, SettingsSnapshot, SiteMode, SiteSettings,
    SiteSettingsPatch,
};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::DomainError;
use super::repo::SettingsStore;
use super::state::{Outcome, SettingsState};

pub struct ServiceConfig {
    /// How long the "saved" notice stays up after a single-flag toggle.
    pub toggle_notice: Duration,
    /// How long the "saved" notice stays up after saving every flag.
    pub save_notice: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            toggle_notice: Duration::from_secs(2),
            save_notice: Duration::from_secs(3),
        }
    }
}

/// Domain service owning the settings state and driving the store.
///
/// The state lock is only held between awaits; store calls run unlocked so
/// several toggles can be in flight at once.
pub struct Service {
    store: Arc<dyn SettingsStore>,
    state: Mutex<SettingsState>,
    snapshots: watch::Sender<SettingsSnapshot>,
}

impl Service {
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>, config: ServiceConfig) -> Self {
        let (snapshots, _) = watch::channel(SettingsSnapshot::default());
        Self {
            store,
            state: Mutex::new(SettingsState::new(config.toggle_notice, config.save_notice)),
            snapshots,
        }
    }

    /// Fetches the record and makes it both confirmed and working.
    ///
    /// # Errors
    /// [`DomainError::LoadFailure`] when the store cannot be read.
    pub async fn load(&self) -> Result<SiteSettings, DomainError> {
        let ticket = self.update(SettingsState::begin_load);
        debug!(seq = ticket.seq(), "loading site settings");

        match self.store.fetch().await {
            Ok(record) => {
                let outcome =
                    self.update(|state| state.confirm(ticket, record.clone(), Instant::now()));
                if outcome == Outcome::Applied {
                    info!(mode = %record.mode(), "site settings loaded");
                }
                Ok(record)
            }
            Err(err) => {
                let error = DomainError::load(&err);
                warn!(error = %error, "failed to load site settings");
                self.update(|state| state.reject(ticket, error.clone()));
                Err(error)
            }
        }
    }

    /// Flips `flag` optimistically, persists it and rolls it back on failure.
    ///
    /// # Errors
    /// [`DomainError::NotReady`] before load, [`DomainError::PersistenceFailure`]
    /// when the store rejects the write.
    pub async fn toggle_flag(&self, flag: SettingsFlag) -> Result<SiteSettings, DomainError> {
        let (ticket, value) = self.update(|state| state.begin_toggle(flag))?;
        debug!(%flag, value, seq = ticket.seq(), "toggling settings flag");

        match self.store.patch(SiteSettingsPatch::single(flag, value)).await {
            Ok(record) => {
                let outcome =
                    self.update(|state| state.confirm(ticket, record.clone(), Instant::now()));
                match outcome {
                    Outcome::Applied => info!(%flag, value, "settings flag saved"),
                    Outcome::Stale => {
                        debug!(%flag, "settings flag saved, newer state already applied");
                    }
                }
                Ok(record)
            }
            Err(err) => {
                let error = DomainError::persistence(&err);
                let outcome = self.update(|state| state.reject(ticket, error.clone()));
                match outcome {
                    Outcome::Applied => {
                        warn!(%flag, error = %error, "failed to save settings flag, rolled back");
                    }
                    Outcome::Stale => {
                        debug!(%flag, error = %error, "superseded toggle failed");
                    }
                }
                Err(error)
            }
        }
    }

    /// Persists the whole working record in one write.
    ///
    /// # Errors
    /// [`DomainError::NotReady`] before load, [`DomainError::PersistenceFailure`]
    /// when the store rejects the write. The working record is kept either way.
    pub async fn save_all(&self) -> Result<SiteSettings, DomainError> {
        let (ticket, update) = self.update(SettingsState::begin_save_all)?;
        debug!(seq = ticket.seq(), "saving all site settings");

        match self.store.replace(update).await {
            Ok(record) => {
                let outcome =
                    self.update(|state| state.confirm(ticket, record.clone(), Instant::now()));
                if outcome == Outcome::Applied {
                    info!(mode = %record.mode(), "all site settings saved");
                }
                Ok(record)
            }
            Err(err) => {
                let error = DomainError::persistence(&err);
                warn!(error = %error, "failed to save site settings");
                self.update(|state| state.reject(ticket, error.clone()));
                Err(error)
            }
        }
    }

    /// # Errors
    /// [`DomainError::NotReady`] before load.
    pub fn stage_flag(&self, flag: SettingsFlag, value: bool) -> Result<(), DomainError> {
        self.update(|state| state.stage(flag, value))?;
        debug!(%flag, value, "staged settings flag");
        Ok(())
    }

    /// # Errors
    /// [`DomainError::NotReady`] before load.
    pub fn effective(&self, flag: SettingsFlag) -> Result<bool, DomainError> {
        self.state.lock().effective(flag)
    }

    /// # Errors
    /// [`DomainError::NotReady`] before load.
    pub fn mode(&self) -> Result<SiteMode, DomainError> {
        self.state.lock().working().map(SiteSettings::mode)
    }

    /// # Errors
    /// [`DomainError::NotReady`] before load.
    pub fn summary(&self) -> Result<ConfigurationSummary, DomainError> {
        self.state.lock().working().map(SiteSettings::summary)
    }

    /// # Errors
    /// [`DomainError::NotReady`] before load.
    pub fn controls(&self) -> Result<Vec<FlagControl>, DomainError> {
        self.state.lock().controls()
    }

    #[must_use]
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.state.lock().snapshot()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.snapshots.subscribe()
    }

    #[must_use]
    pub fn active_notice(&self) -> Option<SaveNoticeKind> {
        self.state.lock().active_notice(Instant::now())
    }

    pub fn clear_error(&self) {
        self.update(SettingsState::clear_error);
    }

    /// Runs `f` under the state lock and publishes the resulting snapshot
    /// before the lock is released.
    fn update<T>(&self, f: impl FnOnce(&mut SettingsState) -> T) -> T {
        let mut state = self.state.lock();
        let out = f(&mut state);
        self.snapshots.send_replace(state.snapshot());
        out
    }
}
