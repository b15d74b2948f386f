//! Site Settings SDK
//!
//! This crate provides the public API for the site settings module:
//! - `SiteSettingsApi` trait for consumers of the settings model
//! - Flag catalog (`SettingsFlag`) with mode-gating rules
//! - Model types (`SiteSettings`, `SiteSettingsPatch`, `SiteSettingsUpdate`, ...)
//! - Error type (`SettingsError`)

#![forbid(unsafe_code)]

pub mod api;
pub mod errors;
pub mod flags;
pub mod models;

pub use api::SiteSettingsApi;
pub use errors::SettingsError;
pub use flags::{FlagDescriptor, SettingsFlag, UnknownFlagError};
pub use models::{
    ConfigurationSummary, FlagControl, SaveNoticeKind, SettingsSnapshot, SiteMode, SiteSettings,
    SiteSettingsPatch, SiteSettingsUpdate,
};
