//! Public models for the site settings module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the settings module and its consumers. Behavior-deciding code
//! must read flags through [`SiteSettings::effective`], never through the
//! raw fields, so that portfolio-mode suppression holds everywhere.

use std::fmt;

use time::OffsetDateTime;

use crate::errors::SettingsError;
use crate::flags::SettingsFlag;

/// The site-wide settings record.
///
/// `last_updated` is assigned by the persistence layer on every write.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub marketplace_mode: bool,
    pub payment_processing_enabled: bool,
    pub automatic_delivery_enabled: bool,
    pub show_prices_on_projects: bool,
    pub email_notifications_enabled: bool,
    pub order_auto_confirmation: bool,
    pub last_updated: OffsetDateTime,
}

impl Default for SiteSettings {
    /// Portfolio mode with every flag off, never written.
    fn default() -> Self {
        Self {
            marketplace_mode: false,
            payment_processing_enabled: false,
            automatic_delivery_enabled: false,
            show_prices_on_projects: false,
            email_notifications_enabled: false,
            order_auto_confirmation: false,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

impl SiteSettings {
    /// Stored value of a flag, ignoring mode gating.
    #[must_use]
    pub const fn get(&self, flag: SettingsFlag) -> bool {
        match flag {
            SettingsFlag::MarketplaceMode => self.marketplace_mode,
            SettingsFlag::PaymentProcessingEnabled => self.payment_processing_enabled,
            SettingsFlag::AutomaticDeliveryEnabled => self.automatic_delivery_enabled,
            SettingsFlag::ShowPricesOnProjects => self.show_prices_on_projects,
            SettingsFlag::EmailNotificationsEnabled => self.email_notifications_enabled,
            SettingsFlag::OrderAutoConfirmation => self.order_auto_confirmation,
        }
    }

    pub fn set(&mut self, flag: SettingsFlag, value: bool) {
        let slot = match flag {
            SettingsFlag::MarketplaceMode => &mut self.marketplace_mode,
            SettingsFlag::PaymentProcessingEnabled => &mut self.payment_processing_enabled,
            SettingsFlag::AutomaticDeliveryEnabled => &mut self.automatic_delivery_enabled,
            SettingsFlag::ShowPricesOnProjects => &mut self.show_prices_on_projects,
            SettingsFlag::EmailNotificationsEnabled => &mut self.email_notifications_enabled,
            SettingsFlag::OrderAutoConfirmation => &mut self.order_auto_confirmation,
        };
        *slot = value;
    }

    /// Mode-aware value of a flag.
    ///
    /// Dependent flags read as `false` while in portfolio mode whatever their
    /// stored value; every other flag reads as stored.
    #[must_use]
    pub const fn effective(&self, flag: SettingsFlag) -> bool {
        if flag.is_dependent() {
            self.marketplace_mode && self.get(flag)
        } else {
            self.get(flag)
        }
    }

    #[must_use]
    pub const fn is_marketplace_mode(&self) -> bool {
        self.marketplace_mode
    }

    #[must_use]
    pub const fn is_portfolio_mode(&self) -> bool {
        !self.marketplace_mode
    }

    #[must_use]
    pub const fn mode(&self) -> SiteMode {
        if self.marketplace_mode {
            SiteMode::Marketplace
        } else {
            SiteMode::Portfolio
        }
    }

    /// Effective configuration as shown on the "current configuration" panel.
    #[must_use]
    pub const fn summary(&self) -> ConfigurationSummary {
        ConfigurationSummary {
            mode: self.mode(),
            payments: self.effective(SettingsFlag::PaymentProcessingEnabled),
            automatic_delivery: self.effective(SettingsFlag::AutomaticDeliveryEnabled),
            show_prices: self.effective(SettingsFlag::ShowPricesOnProjects),
            order_auto_confirmation: self.effective(SettingsFlag::OrderAutoConfirmation),
            email_notifications: self.effective(SettingsFlag::EmailNotificationsEnabled),
            last_updated: self.last_updated,
        }
    }

    /// Full-replacement payload carrying every stored flag.
    #[must_use]
    pub const fn to_update(&self) -> SiteSettingsUpdate {
        SiteSettingsUpdate {
            marketplace_mode: self.marketplace_mode,
            payment_processing_enabled: self.payment_processing_enabled,
            automatic_delivery_enabled: self.automatic_delivery_enabled,
            show_prices_on_projects: self.show_prices_on_projects,
            email_notifications_enabled: self.email_notifications_enabled,
            order_auto_confirmation: self.order_auto_confirmation,
        }
    }
}

/// Operating mode derived from the master switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteMode {
    Marketplace,
    Portfolio,
}

impl fmt::Display for SiteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marketplace => f.write_str("Marketplace"),
            Self::Portfolio => f.write_str("Portfolio"),
        }
    }
}

/// Partial update data for the settings record (PATCH semantics).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SiteSettingsPatch {
    pub marketplace_mode: Option<bool>,
    pub payment_processing_enabled: Option<bool>,
    pub automatic_delivery_enabled: Option<bool>,
    pub show_prices_on_projects: Option<bool>,
    pub email_notifications_enabled: Option<bool>,
    pub order_auto_confirmation: Option<bool>,
}

impl SiteSettingsPatch {
    /// Patch touching a single flag.
    #[must_use]
    pub fn single(flag: SettingsFlag, value: bool) -> Self {
        let mut patch = Self::default();
        *patch.slot(flag) = Some(value);
        patch
    }

    #[must_use]
    pub const fn get(&self, flag: SettingsFlag) -> Option<bool> {
        match flag {
            SettingsFlag::MarketplaceMode => self.marketplace_mode,
            SettingsFlag::PaymentProcessingEnabled => self.payment_processing_enabled,
            SettingsFlag::AutomaticDeliveryEnabled => self.automatic_delivery_enabled,
            SettingsFlag::ShowPricesOnProjects => self.show_prices_on_projects,
            SettingsFlag::EmailNotificationsEnabled => self.email_notifications_enabled,
            SettingsFlag::OrderAutoConfirmation => self.order_auto_confirmation,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        SettingsFlag::ALL.into_iter().all(|f| self.get(f).is_none())
    }

    /// Writes every present field into `settings`. `last_updated` is left alone.
    pub fn apply_to(&self, settings: &mut SiteSettings) {
        for flag in SettingsFlag::ALL {
            if let Some(value) = self.get(flag) {
                settings.set(flag, value);
            }
        }
    }

    fn slot(&mut self, flag: SettingsFlag) -> &mut Option<bool> {
        match flag {
            SettingsFlag::MarketplaceMode => &mut self.marketplace_mode,
            SettingsFlag::PaymentProcessingEnabled => &mut self.payment_processing_enabled,
            SettingsFlag::AutomaticDeliveryEnabled => &mut self.automatic_delivery_enabled,
            SettingsFlag::ShowPricesOnProjects => &mut self.show_prices_on_projects,
            SettingsFlag::EmailNotificationsEnabled => &mut self.email_notifications_enabled,
            SettingsFlag::OrderAutoConfirmation => &mut self.order_auto_confirmation,
        }
    }
}

/// Full update data for the settings record (PUT semantics).
///
/// Unlike `SiteSettingsPatch`, every flag is present. `last_updated` is
/// absent because the store assigns it.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SiteSettingsUpdate {
    pub marketplace_mode: bool,
    pub payment_processing_enabled: bool,
    pub automatic_delivery_enabled: bool,
    pub show_prices_on_projects: bool,
    pub email_notifications_enabled: bool,
    pub order_auto_confirmation: bool,
}

impl SiteSettingsUpdate {
    pub fn apply_to(self, settings: &mut SiteSettings) {
        settings.marketplace_mode = self.marketplace_mode;
        settings.payment_processing_enabled = self.payment_processing_enabled;
        settings.automatic_delivery_enabled = self.automatic_delivery_enabled;
        settings.show_prices_on_projects = self.show_prices_on_projects;
        settings.email_notifications_enabled = self.email_notifications_enabled;
        settings.order_auto_confirmation = self.order_auto_confirmation;
    }
}

/// Effective configuration at a glance.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationSummary {
    pub mode: SiteMode,
    pub payments: bool,
    pub automatic_delivery: bool,
    pub show_prices: bool,
    pub order_auto_confirmation: bool,
    pub email_notifications: bool,
    pub last_updated: OffsetDateTime,
}

/// One row of the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagControl {
    pub flag: SettingsFlag,
    pub title: &'static str,
    pub description: &'static str,
    pub stored: bool,
    pub effective: bool,
    /// Advisory: the surface should not offer the toggle right now.
    pub locked: bool,
}

/// Kind of transient "saved" notice raised after a confirmed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveNoticeKind {
    FlagToggled,
    AllSaved,
}

/// Point-in-time view of the settings model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsSnapshot {
    /// Last record confirmed by the store.
    pub authoritative: Option<SiteSettings>,
    /// Record currently presented for editing, possibly ahead of the store.
    pub working: Option<SiteSettings>,
    /// A persistence request is in flight.
    pub pending: bool,
    pub last_error: Option<SettingsError>,
}

impl SettingsSnapshot {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.authoritative.is_some()
    }

    /// Working fields that differ from the confirmed record.
    #[must_use]
    pub fn unsaved_flags(&self) -> Vec<SettingsFlag> {
        match (&self.authoritative, &self.working) {
            (Some(confirmed), Some(working)) => SettingsFlag::ALL
                .into_iter()
                .filter(|f| confirmed.get(*f) != working.get(*f))
                .collect(),
            _ => Vec::new(),
        }
    }
}
