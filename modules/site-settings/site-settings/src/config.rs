//! Configuration for the site settings module.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::service::ServiceConfig;

/// Site settings module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettingsConfig {
    /// Base URL of the settings API (`{endpoint}/settings`).
    /// When unset the module keeps the record in memory.
    pub endpoint: Option<String>,

    /// Timeout for a single store request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Allow plain `http://` endpoints. Intended for local development.
    pub allow_insecure_http: bool,

    /// Maximum accepted response body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sent as `Authorization: Bearer <token>` when present.
    #[serde(serialize_with = "serialize_redacted")]
    pub auth_token: Option<SecretString>,

    /// How long the "saved" notice stays up after a toggle.
    #[serde(default = "default_toggle_notice", with = "humantime_serde")]
    pub toggle_notice: Duration,

    /// How long the "saved" notice stays up after saving every flag.
    #[serde(default = "default_save_notice", with = "humantime_serde")]
    pub save_notice: Duration,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_body_size() -> usize {
    64 * 1024
}

fn default_user_agent() -> String {
    concat!("site-settings/", env!("CARGO_PKG_VERSION")).to_owned()
}

fn default_toggle_notice() -> Duration {
    Duration::from_secs(2)
}

fn default_save_notice() -> Duration {
    Duration::from_secs(3)
}

#[allow(clippy::ref_option)] // signature fixed by `serialize_with`
fn serialize_redacted<S: Serializer>(
    token: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match token {
        Some(_) => serializer.serialize_some("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

impl Default for SiteSettingsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            request_timeout: default_request_timeout(),
            allow_insecure_http: false,
            max_body_size: default_max_body_size(),
            user_agent: default_user_agent(),
            auth_token: None,
            toggle_notice: default_toggle_notice(),
            save_notice: default_save_notice(),
        }
    }
}

impl SiteSettingsConfig {
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            toggle_notice: self.toggle_notice,
            save_notice: self.save_notice,
        }
    }
}
