//! `SiteSettingsApi` trait definition.
//!
//! This trait defines the public API of the site settings module. The admin
//! settings surface drives the mutating operations; checkout, document
//! delivery, price display, and order confirmation only ever call
//! [`SiteSettingsApi::effective`].

use async_trait::async_trait;

use crate::errors::SettingsError;
use crate::flags::SettingsFlag;
use crate::models::{
    ConfigurationSummary, FlagControl, SaveNoticeKind, SettingsSnapshot, SiteMode, SiteSettings,
};

/// Public API trait for the site settings module.
///
/// Consumers obtain it from the module:
/// ```ignore
/// let client = module.client()?;
/// if client.effective(SettingsFlag::PaymentProcessingEnabled)? {
///     // offer checkout
/// }
/// ```
///
/// Every query fails with [`SettingsError::NotReady`] until the first
/// successful [`SiteSettingsApi::load`].
#[async_trait]
pub trait SiteSettingsApi: Send + Sync {
    /// Fetch the record from the store and make it both confirmed and working.
    async fn load(&self) -> Result<SiteSettings, SettingsError>;

    /// Flip one flag optimistically and persist it.
    /// Rolls the flag back to its confirmed value if the store rejects the write.
    async fn toggle_flag(&self, flag: SettingsFlag) -> Result<SiteSettings, SettingsError>;

    /// Persist the whole working record in one write.
    /// On failure the working record is kept so the save can be retried.
    async fn save_all(&self) -> Result<SiteSettings, SettingsError>;

    /// Edit the working record without persisting it.
    fn stage_flag(&self, flag: SettingsFlag, value: bool) -> Result<(), SettingsError>;

    /// Mode-aware value of a flag in the working record.
    fn effective(&self, flag: SettingsFlag) -> Result<bool, SettingsError>;

    fn mode(&self) -> Result<SiteMode, SettingsError>;

    fn summary(&self) -> Result<ConfigurationSummary, SettingsError>;

    /// One entry per flag, in panel order.
    fn controls(&self) -> Result<Vec<FlagControl>, SettingsError>;

    fn snapshot(&self) -> SettingsSnapshot;

    /// The "saved" notice currently visible, if any.
    fn active_notice(&self) -> Option<SaveNoticeKind>;

    /// Acknowledge the last error.
    fn clear_error(&self);
}
