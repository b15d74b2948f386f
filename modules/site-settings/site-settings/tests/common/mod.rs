#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for site-settings integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use site_settings::domain::repo::SettingsStore;
use site_settings::domain::service::ServiceConfig;
use site_settings::infra::memory::InMemorySettingsStore;
use site_settings::{
    SiteSettings, SiteSettingsApi, SiteSettingsModule, SiteSettingsPatch, SiteSettingsUpdate,
};
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};

pub fn stamp(seconds: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(seconds).unwrap()
}

/// Marketplace mode with payments and price display on.
pub fn marketplace_record() -> SiteSettings {
    SiteSettings {
        marketplace_mode: true,
        payment_processing_enabled: true,
        show_prices_on_projects: true,
        last_updated: stamp(1_000),
        ..SiteSettings::default()
    }
}

pub fn client_over(store: Arc<dyn SettingsStore>) -> Arc<dyn SiteSettingsApi> {
    let module = SiteSettingsModule::default();
    module.init_with_store(store, ServiceConfig::default());
    module.client().unwrap()
}

pub fn memory_client(
    record: SiteSettings,
) -> (Arc<InMemorySettingsStore>, Arc<dyn SiteSettingsApi>) {
    let store = Arc::new(InMemorySettingsStore::new(record));
    let client = client_over(store.clone());
    (store, client)
}

/// Write held by [`GatedStore`] until the test answers it.
pub struct PendingWrite {
    pub patch: Option<SiteSettingsPatch>,
    pub update: Option<SiteSettingsUpdate>,
    respond: oneshot::Sender<anyhow::Result<SiteSettings>>,
}

impl PendingWrite {
    pub fn succeed(self, record: SiteSettings) {
        self.respond.send(Ok(record)).unwrap();
    }

    pub fn fail(self, reason: &str) {
        self.respond
            .send(Err(anyhow::anyhow!(reason.to_owned())))
            .unwrap();
    }
}

/// Store whose reads answer at once and whose writes wait for the test,
/// so responses can be delivered in any order.
pub struct GatedStore {
    record: SiteSettings,
    fail_reads: AtomicBool,
    writes: mpsc::UnboundedSender<PendingWrite>,
}

impl GatedStore {
    pub fn new(record: SiteSettings) -> (Arc<Self>, mpsc::UnboundedReceiver<PendingWrite>) {
        let (writes, rx) = mpsc::unbounded_channel();
        let store = Self {
            record,
            fail_reads: AtomicBool::new(false),
            writes,
        };
        (Arc::new(store), rx)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    async fn hold(
        &self,
        patch: Option<SiteSettingsPatch>,
        update: Option<SiteSettingsUpdate>,
    ) -> anyhow::Result<SiteSettings> {
        let (respond, answer) = oneshot::channel();
        self.writes
            .send(PendingWrite {
                patch,
                update,
                respond,
            })
            .map_err(|_| anyhow::anyhow!("test dropped the write receiver"))?;
        answer.await?
    }
}

#[async_trait]
impl SettingsStore for GatedStore {
    async fn fetch(&self) -> anyhow::Result<SiteSettings> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(self.record.clone())
    }

    async fn patch(&self, patch: SiteSettingsPatch) -> anyhow::Result<SiteSettings> {
        self.hold(Some(patch), None).await
    }

    async fn replace(&self, update: SiteSettingsUpdate) -> anyhow::Result<SiteSettings> {
        self.hold(None, Some(update)).await
    }
}
