#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;
    use site_settings_sdk::flags::SettingsFlag;
    use site_settings_sdk::models::{SiteSettings, SiteSettingsPatch, SiteSettingsUpdate};
    use time::macros::datetime;

    #[test]
    fn test_record_from_camel_case_json() {
        let body = json!({
            "marketplaceMode": true,
            "paymentProcessingEnabled": true,
            "automaticDeliveryEnabled": false,
            "showPricesOnProjects": true,
            "emailNotificationsEnabled": true,
            "orderAutoConfirmation": false,
            "lastUpdated": "2024-05-01T12:30:00Z",
            "id": "site"
        });

        let dto: dto::SiteSettingsDto = serde_json::from_value(body).unwrap();
        let settings: SiteSettings = dto.into();

        assert!(settings.marketplace_mode);
        assert!(settings.payment_processing_enabled);
        assert!(!settings.automatic_delivery_enabled);
        assert!(settings.show_prices_on_projects);
        assert!(settings.email_notifications_enabled);
        assert!(!settings.order_auto_confirmation);
        assert_eq!(settings.last_updated, datetime!(2024-05-01 12:30:00 UTC));
    }

    #[test]
    fn test_record_with_offset_timestamp_is_normalized() {
        let body = json!({
            "marketplaceMode": false,
            "paymentProcessingEnabled": false,
            "automaticDeliveryEnabled": false,
            "showPricesOnProjects": false,
            "emailNotificationsEnabled": false,
            "orderAutoConfirmation": false,
            "lastUpdated": "2024-05-01T12:30:00+02:00"
        });

        let settings: SiteSettings = serde_json::from_value::<dto::SiteSettingsDto>(body)
            .unwrap()
            .into();

        assert!(settings.is_portfolio_mode());
        assert_eq!(settings.last_updated, datetime!(2024-05-01 10:30:00 UTC));
    }

    #[test]
    fn test_record_missing_a_flag_is_rejected() {
        let body = json!({
            "paymentProcessingEnabled": true,
            "automaticDeliveryEnabled": false,
            "showPricesOnProjects": true,
            "emailNotificationsEnabled": true,
            "orderAutoConfirmation": false,
            "lastUpdated": "2024-05-01T12:30:00Z"
        });

        let err = serde_json::from_value::<dto::SiteSettingsDto>(body).unwrap_err();
        assert!(err.to_string().contains("marketplaceMode"));
    }

    #[test]
    fn test_record_requires_last_updated() {
        let body = json!({ "marketplaceMode": true });
        assert!(serde_json::from_value::<dto::SiteSettingsDto>(body).is_err());
    }

    #[test]
    fn test_patch_request_only_carries_present_fields() {
        let patch = SiteSettingsPatch::single(SettingsFlag::ShowPricesOnProjects, false);
        let req: dto::PatchSiteSettingsRequest = patch.into();

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "showPricesOnProjects": false })
        );
    }

    #[test]
    fn test_update_request_carries_every_flag_without_timestamp() {
        let update = SiteSettingsUpdate {
            marketplace_mode: true,
            email_notifications_enabled: true,
            ..SiteSettingsUpdate::default()
        };
        let req: dto::UpdateSiteSettingsRequest = update.into();

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "marketplaceMode": true,
                "paymentProcessingEnabled": false,
                "automaticDeliveryEnabled": false,
                "showPricesOnProjects": false,
                "emailNotificationsEnabled": true,
                "orderAutoConfirmation": false
            })
        );
    }
}
