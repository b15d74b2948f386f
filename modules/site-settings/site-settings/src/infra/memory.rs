//! In-memory settings store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use site_settings_sdk::models::{SiteSettings, SiteSettingsPatch, SiteSettingsUpdate};
use time::OffsetDateTime;
use tracing::debug;

use crate::domain::repo::SettingsStore;

/// Settings store keeping the record in process memory.
///
/// Used when no endpoint is configured and as a scripted store in tests:
/// reads and writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    record: Mutex<SiteSettings>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemorySettingsStore {
    #[must_use]
    pub fn new(record: SiteSettings) -> Self {
        Self {
            record: Mutex::new(record),
            ..Self::default()
        }
    }

    /// Current stored record.
    #[must_use]
    pub fn record(&self) -> SiteSettings {
        self.record.lock().clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn write(&self, apply: impl FnOnce(&mut SiteSettings)) -> anyhow::Result<SiteSettings> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("in-memory store rejected the write");
        }
        let mut record = self.record.lock();
        apply(&mut record);
        record.last_updated = OffsetDateTime::now_utc();
        debug!(last_updated = %record.last_updated, "in-memory settings record written");
        Ok(record.clone())
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn fetch(&self) -> anyhow::Result<SiteSettings> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("in-memory store rejected the read");
        }
        Ok(self.record())
    }

    async fn patch(&self, patch: SiteSettingsPatch) -> anyhow::Result<SiteSettings> {
        self.write(|record| patch.apply_to(record))
    }

    async fn replace(&self, update: SiteSettingsUpdate) -> anyhow::Result<SiteSettings> {
        self.write(|record| update.apply_to(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_settings_sdk::flags::SettingsFlag;

    #[tokio::test]
    async fn test_patch_touches_only_present_fields_and_stamps() {
        let store = InMemorySettingsStore::default();

        let record = store
            .patch(SiteSettingsPatch::single(SettingsFlag::ShowPricesOnProjects, true))
            .await
            .unwrap();

        assert!(record.show_prices_on_projects);
        assert!(!record.marketplace_mode);
        assert!(record.last_updated > OffsetDateTime::UNIX_EPOCH);
        assert_eq!(store.fetch().await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_replace_overwrites_every_flag() {
        let store = InMemorySettingsStore::new(SiteSettings {
            email_notifications_enabled: true,
            ..SiteSettings::default()
        });

        let record = store
            .replace(SiteSettingsUpdate {
                marketplace_mode: true,
                ..SiteSettingsUpdate::default()
            })
            .await
            .unwrap();

        assert!(record.marketplace_mode);
        assert!(!record.email_notifications_enabled);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let store = InMemorySettingsStore::default();
        store.fail_reads(true);
        store.fail_writes(true);

        assert!(store.fetch().await.is_err());
        assert!(store.replace(SiteSettingsUpdate::default()).await.is_err());
        assert_eq!(store.record(), SiteSettings::default());

        store.fail_reads(false);
        assert!(store.fetch().await.is_ok());
    }
}
