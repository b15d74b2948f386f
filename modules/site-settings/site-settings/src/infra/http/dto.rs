//! Wire representation of the settings record.

use serde::{Deserialize, Serialize};
use site_settings_sdk::models::{SiteSettings, SiteSettingsPatch, SiteSettingsUpdate};
use time::OffsetDateTime;

/// Record as returned by `GET`, `PATCH` and `PUT /settings`. Every field is required.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsDto {
    pub marketplace_mode: bool,
    pub payment_processing_enabled: bool,
    pub automatic_delivery_enabled: bool,
    pub show_prices_on_projects: bool,
    pub email_notifications_enabled: bool,
    pub order_auto_confirmation: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl From<SiteSettingsDto> for SiteSettings {
    fn from(dto: SiteSettingsDto) -> Self {
        Self {
            marketplace_mode: dto.marketplace_mode,
            payment_processing_enabled: dto.payment_processing_enabled,
            automatic_delivery_enabled: dto.automatic_delivery_enabled,
            show_prices_on_projects: dto.show_prices_on_projects,
            email_notifications_enabled: dto.email_notifications_enabled,
            order_auto_confirmation: dto.order_auto_confirmation,
            last_updated: dto.last_updated,
        }
    }
}

/// `PATCH /settings` body. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSiteSettingsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketplace_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_processing_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_delivery_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_prices_on_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_auto_confirmation: Option<bool>,
}

impl From<SiteSettingsPatch> for PatchSiteSettingsRequest {
    fn from(patch: SiteSettingsPatch) -> Self {
        Self {
            marketplace_mode: patch.marketplace_mode,
            payment_processing_enabled: patch.payment_processing_enabled,
            automatic_delivery_enabled: patch.automatic_delivery_enabled,
            show_prices_on_projects: patch.show_prices_on_projects,
            email_notifications_enabled: patch.email_notifications_enabled,
            order_auto_confirmation: patch.order_auto_confirmation,
        }
    }
}

/// `PUT /settings` body carrying every flag.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteSettingsRequest {
    pub marketplace_mode: bool,
    pub payment_processing_enabled: bool,
    pub automatic_delivery_enabled: bool,
    pub show_prices_on_projects: bool,
    pub email_notifications_enabled: bool,
    pub order_auto_confirmation: bool,
}

impl From<SiteSettingsUpdate> for UpdateSiteSettingsRequest {
    fn from(update: SiteSettingsUpdate) -> Self {
        Self {
            marketplace_mode: update.marketplace_mode,
            payment_processing_enabled: update.payment_processing_enabled,
            automatic_delivery_enabled: update.automatic_delivery_enabled,
            show_prices_on_projects: update.show_prices_on_projects,
            email_notifications_enabled: update.email_notifications_enabled,
            order_auto_confirmation: update.order_auto_confirmation,
        }
    }
}
