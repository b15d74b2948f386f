use async_trait::async_trait;
use site_settings_sdk::models::{SiteSettings, SiteSettingsPatch, SiteSettingsUpdate};

/// Port to the external settings store.
///
/// Every write returns the full record as confirmed by the store, including
/// the `last_updated` it assigned.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<SiteSettings>;

    async fn patch(&self, patch: SiteSettingsPatch) -> anyhow::Result<SiteSettings>;

    async fn replace(&self, update: SiteSettingsUpdate) -> anyhow::Result<SiteSettings>;
}
