use async_trait::async_trait;
use site_settings_sdk::{
    ConfigurationSummary, FlagControl, SaveNoticeKind, SettingsError, SettingsFlag,
    SettingsSnapshot, SiteMode, SiteSettings, SiteSettingsApi,
};
use std::sync::Arc;

use crate::domain::service::Service;

pub struct LocalClient {
    service: Arc<Service>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SiteSettingsApi for LocalClient {
    async fn load(&self) -> Result<SiteSettings, SettingsError> {
        self.service.load().await.map_err(Into::into)
    }

    async fn toggle_flag(&self, flag: SettingsFlag) -> Result<SiteSettings, SettingsError> {
        self.service.toggle_flag(flag).await.map_err(Into::into)
    }

    async fn save_all(&self) -> Result<SiteSettings, SettingsError> {
        self.service.save_all().await.map_err(Into::into)
    }

    fn stage_flag(&self, flag: SettingsFlag, value: bool) -> Result<(), SettingsError> {
        self.service.stage_flag(flag, value).map_err(Into::into)
    }

    fn effective(&self, flag: SettingsFlag) -> Result<bool, SettingsError> {
        self.service.effective(flag).map_err(Into::into)
    }

    fn mode(&self) -> Result<SiteMode, SettingsError> {
        self.service.mode().map_err(Into::into)
    }

    fn summary(&self) -> Result<ConfigurationSummary, SettingsError> {
        self.service.summary().map_err(Into::into)
    }

    fn controls(&self) -> Result<Vec<FlagControl>, SettingsError> {
        self.service.controls().map_err(Into::into)
    }

    fn snapshot(&self) -> SettingsSnapshot {
        self.service.snapshot()
    }

    fn active_notice(&self) -> Option<SaveNoticeKind> {
        self.service.active_notice()
    }

    fn clear_error(&self) {
        self.service.clear_error();
    }
}
