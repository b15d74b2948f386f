//! Layered application configuration.
//!
//! Precedence, lowest first: defaults, YAML file, `SITE_SETTINGS__*`
//! environment, command-line overrides.

use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use site_settings::SiteSettingsConfig;

pub const ENV_PREFIX: &str = "SITE_SETTINGS__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub settings: SiteSettingsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            json: false,
        }
    }
}

/// Values given on the command line that take precedence over every layer.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub allow_insecure_http: bool,
    pub verbose: u8,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.settings.endpoint = Some(endpoint.clone());
        }
        if overrides.allow_insecure_http {
            self.settings.allow_insecure_http = true;
        }
        match overrides.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
    }

    /// Effective configuration as pretty JSON, secrets redacted.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to render configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_yaml_layer_overrides_defaults() {
        let file = yaml_file(
            r"
logging:
  level: debug
settings:
  endpoint: https://admin.example.com/api
  request_timeout: 3s
  auth_token: s3cr3t
",
        );

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
        assert_eq!(
            config.settings.endpoint.as_deref(),
            Some("https://admin.example.com/api")
        );
        assert_eq!(config.settings.request_timeout, Duration::from_secs(3));
        assert_eq!(config.settings.toggle_notice, Duration::from_secs(2));
        assert!(config.settings.auth_token.is_some());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/site-settings.yaml");
        let err = AppConfig::load(Some(missing)).unwrap_err();
        assert!(err.to_string().contains("config file does not exist"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let file = yaml_file("settings:\n  endpoit: https://typo.example.com\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let file = yaml_file("settings:\n  endpoint: https://from-file.example.com\n");
        let mut config = AppConfig::load(Some(file.path())).unwrap();

        config.apply_cli_overrides(&CliOverrides {
            endpoint: Some("http://localhost:8080".to_owned()),
            allow_insecure_http: true,
            verbose: 2,
        });

        assert_eq!(
            config.settings.endpoint.as_deref(),
            Some("http://localhost:8080")
        );
        assert!(config.settings.allow_insecure_http);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_printed_config_redacts_token() {
        let file = yaml_file("settings:\n  auth_token: s3cr3t\n");
        let config = AppConfig::load(Some(file.path())).unwrap();

        let rendered = config.to_json().unwrap();
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
