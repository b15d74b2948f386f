use std::sync::Arc;

use site_settings_sdk::{SettingsSnapshot, SiteSettingsApi};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::SiteSettingsConfig;
use crate::domain::repo::SettingsStore;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::http::HttpSettingsStore;
use crate::infra::memory::InMemorySettingsStore;
use crate::local_client::LocalClient;

/// Site settings module.
///
/// Owns the domain service once initialized and hands out clients to the
/// rest of the application.
#[derive(Default)]
pub struct SiteSettingsModule {
    service: arc_swap::ArcSwapOption<Service>,
}

impl SiteSettingsModule {
    /// Builds the store described by `config` and the service on top of it.
    ///
    /// # Errors
    /// Fails when the HTTP store cannot be built from the configured endpoint.
    pub fn init(&self, config: &SiteSettingsConfig) -> anyhow::Result<()> {
        info!("Initializing site settings module");

        let store: Arc<dyn SettingsStore> = if let Some(endpoint) = &config.endpoint {
            debug!(endpoint = %endpoint, "using HTTP settings store");
            Arc::new(HttpSettingsStore::from_config(config)?)
        } else {
            debug!("no endpoint configured, using in-memory settings store");
            Arc::new(InMemorySettingsStore::default())
        };

        self.init_with_store(store, config.service_config());
        Ok(())
    }

    /// Initializes the module over an already built store.
    pub fn init_with_store(&self, store: Arc<dyn SettingsStore>, config: ServiceConfig) {
        let service = Service::new(store, config);
        self.service.store(Some(Arc::new(service)));
        info!("Site settings module initialized");
    }

    /// # Errors
    /// Fails when called before [`SiteSettingsModule::init`].
    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// # Errors
    /// Fails when called before [`SiteSettingsModule::init`].
    pub fn client(&self) -> anyhow::Result<Arc<dyn SiteSettingsApi>> {
        let api: Arc<dyn SiteSettingsApi> = Arc::new(LocalClient::new(self.service()?));
        Ok(api)
    }

    /// # Errors
    /// Fails when called before [`SiteSettingsModule::init`].
    pub fn subscribe(&self) -> anyhow::Result<watch::Receiver<SettingsSnapshot>> {
        Ok(self.service()?.subscribe())
    }
}
