//! Site Settings Module Implementation
//!
//! The public API is defined in `site-settings-sdk` and re-exported here.

pub use site_settings_sdk::{
    ConfigurationSummary, FlagControl, SaveNoticeKind, SettingsError, SettingsFlag,
    SettingsSnapshot, SiteMode, SiteSettings, SiteSettingsApi, SiteSettingsPatch,
    SiteSettingsUpdate,
};

pub mod module;
pub use module::SiteSettingsModule;

pub mod config;
pub use config::SiteSettingsConfig;

pub mod local_client;

#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
