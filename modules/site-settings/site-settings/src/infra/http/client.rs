//! Settings store backed by the settings HTTP API.
//!
//! `GET /settings` reads the record, `PATCH /settings` writes a subset of
//! flags and `PUT /settings` replaces all of them. Every call answers with the
//! full record carrying the `lastUpdated` the server assigned.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use secrecy::ExposeSecret;
use serde::Serialize;
use site_settings_sdk::models::{SiteSettings, SiteSettingsPatch, SiteSettingsUpdate};
use tracing::debug;

use super::dto::{PatchSiteSettingsRequest, SiteSettingsDto, UpdateSiteSettingsRequest};
use super::error::HttpStoreError;
use crate::config::SiteSettingsConfig;
use crate::domain::repo::SettingsStore;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

const SETTINGS_PATH: &str = "settings";
const ERROR_BODY_PREVIEW_LIMIT: usize = 1024;

/// Settings store talking to `{endpoint}/settings`.
#[derive(Clone)]
pub struct HttpSettingsStore {
    client: HttpsClient,
    settings_uri: Uri,
    timeout: Duration,
    max_body_size: usize,
    user_agent: HeaderValue,
    authorization: Option<HeaderValue>,
}

impl HttpSettingsStore {
    /// # Errors
    /// Fails when no endpoint is configured, when the endpoint is not a valid
    /// `https://` URL (or `http://` with `allow_insecure_http`), or when the
    /// TLS connector cannot be built.
    pub fn from_config(config: &SiteSettingsConfig) -> Result<Self, HttpStoreError> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            HttpStoreError::InvalidEndpoint {
                url: String::new(),
                reason: "no endpoint configured".to_owned(),
            }
        })?;
        let settings_uri = settings_uri(endpoint, config.allow_insecure_http)?;

        let connector = build_https_connector(config.allow_insecure_http)?;
        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .build(connector);

        let user_agent = HeaderValue::from_str(&config.user_agent)?;
        let authorization = match &config.auth_token {
            Some(token) => {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            client,
            settings_uri,
            timeout: config.request_timeout,
            max_body_size: config.max_body_size,
            user_agent,
            authorization,
        })
    }

    #[must_use]
    pub fn settings_uri(&self) -> &Uri {
        &self.settings_uri
    }

    /// Sends one request and decodes the confirmed record.
    ///
    /// The timeout covers the whole exchange, body included.
    async fn send(
        &self,
        method: Method,
        body: Option<Bytes>,
    ) -> Result<SiteSettings, HttpStoreError> {
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(self.settings_uri.clone())
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, self.user_agent.clone());
        if let Some(authorization) = &self.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization.clone());
        }
        let request = match body {
            Some(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Full::new(bytes))?,
            None => builder.body(Full::new(Bytes::new()))?,
        };

        debug!(%method, uri = %self.settings_uri, "sending settings request");
        tokio::time::timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_elapsed| HttpStoreError::Timeout(self.timeout))?
    }

    async fn exchange(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<SiteSettings, HttpStoreError> {
        let response = self.client.request(request).await?;
        let status = response.status();
        debug!(%status, "settings response received");

        if !status.is_success() {
            let preview_limit = self.max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
            let body_preview = match read_body_limited(response.into_body(), preview_limit).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(HttpStoreError::BodyTooLarge { .. }) => {
                    "<body too large for preview>".to_owned()
                }
                Err(e) => return Err(e),
            };
            return Err(HttpStoreError::HttpStatus {
                status,
                body_preview,
            });
        }

        let bytes = read_body_limited(response.into_body(), self.max_body_size).await?;
        let dto: SiteSettingsDto = serde_json::from_slice(&bytes)?;
        Ok(dto.into())
    }
}

#[async_trait]
impl SettingsStore for HttpSettingsStore {
    async fn fetch(&self) -> anyhow::Result<SiteSettings> {
        Ok(self.send(Method::GET, None).await?)
    }

    async fn patch(&self, patch: SiteSettingsPatch) -> anyhow::Result<SiteSettings> {
        let body = json_body(&PatchSiteSettingsRequest::from(patch))?;
        Ok(self.send(Method::PATCH, Some(body)).await?)
    }

    async fn replace(&self, update: SiteSettingsUpdate) -> anyhow::Result<SiteSettings> {
        let body = json_body(&UpdateSiteSettingsRequest::from(update))?;
        Ok(self.send(Method::PUT, Some(body)).await?)
    }
}

fn json_body<T: Serialize>(value: &T) -> Result<Bytes, HttpStoreError> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

fn settings_uri(endpoint: &str, allow_insecure_http: bool) -> Result<Uri, HttpStoreError> {
    let url = format!("{}/{SETTINGS_PATH}", endpoint.trim_end_matches('/'));
    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| HttpStoreError::InvalidEndpoint {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    let Some(scheme) = uri.scheme_str() else {
        return Err(HttpStoreError::InvalidEndpoint {
            url,
            reason: "missing scheme".to_owned(),
        });
    };
    if scheme != "https" && scheme != "http" {
        return Err(HttpStoreError::InvalidScheme {
            scheme: scheme.to_owned(),
            reason: "only http and https are supported".to_owned(),
        });
    }
    if scheme == "http" && !allow_insecure_http {
        return Err(HttpStoreError::InvalidScheme {
            scheme: scheme.to_owned(),
            reason: "plain HTTP requires allow_insecure_http".to_owned(),
        });
    }
    if uri.authority().is_none() {
        return Err(HttpStoreError::InvalidEndpoint {
            url,
            reason: "missing host".to_owned(),
        });
    }
    Ok(uri)
}

fn build_https_connector(
    allow_insecure_http: bool,
) -> Result<HttpsConnector<HttpConnector>, HttpStoreError> {
    let provider = rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| std::sync::Arc::new(rustls::crypto::aws_lc_rs::default_provider()));
    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| HttpStoreError::Tls(Box::new(e)))?;
    let connector = if allow_insecure_http {
        builder.https_or_http().enable_all_versions().build()
    } else {
        builder.https_only().enable_all_versions().build()
    };
    Ok(connector)
}

async fn read_body_limited(body: Incoming, limit: usize) -> Result<Bytes, HttpStoreError> {
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(HttpStoreError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

#[cfg(test)]
mod tests {
    use super::{HttpSettingsStore, HttpStoreError, SettingsStore, SiteSettingsConfig};
    use httpmock::prelude::*;
    use secrecy::SecretString;
    use serde_json::json;
    use site_settings_sdk::flags::SettingsFlag;
    use site_settings_sdk::models::{SiteSettingsPatch, SiteSettingsUpdate};
    use std::time::Duration;

    fn record_json(marketplace: bool) -> serde_json::Value {
        json!({
            "marketplaceMode": marketplace,
            "paymentProcessingEnabled": true,
            "automaticDeliveryEnabled": false,
            "showPricesOnProjects": true,
            "emailNotificationsEnabled": true,
            "orderAutoConfirmation": false,
            "lastUpdated": "2024-05-01T12:30:00Z"
        })
    }

    fn test_store(server: &MockServer) -> HttpSettingsStore {
        let config = SiteSettingsConfig {
            endpoint: Some(server.base_url()),
            allow_insecure_http: true,
            ..SiteSettingsConfig::default()
        };
        HttpSettingsStore::from_config(&config).unwrap()
    }

    fn store_error(err: &anyhow::Error) -> &HttpStoreError {
        err.downcast_ref::<HttpStoreError>().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_decodes_record() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(Method::GET)
                .path("/settings")
                .header("accept", "application/json");
            then.status(200).json_body(record_json(true));
        });

        let record = test_store(&server).fetch().await.unwrap();

        m.assert();
        assert!(record.marketplace_mode);
        assert!(record.payment_processing_enabled);
        assert!(!record.automatic_delivery_enabled);
    }

    #[tokio::test]
    async fn test_patch_sends_only_the_toggled_flag() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(Method::PATCH)
                .path("/settings")
                .header("content-type", "application/json")
                .json_body(json!({ "marketplaceMode": false }));
            then.status(200).json_body(record_json(false));
        });

        let record = test_store(&server)
            .patch(SiteSettingsPatch::single(SettingsFlag::MarketplaceMode, false))
            .await
            .unwrap();

        m.assert();
        assert!(!record.marketplace_mode);
    }

    #[tokio::test]
    async fn test_replace_sends_every_flag() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(Method::PUT).path("/settings").json_body(json!({
                "marketplaceMode": true,
                "paymentProcessingEnabled": false,
                "automaticDeliveryEnabled": false,
                "showPricesOnProjects": false,
                "emailNotificationsEnabled": false,
                "orderAutoConfirmation": false
            }));
            then.status(200).json_body(record_json(true));
        });

        let update = SiteSettingsUpdate {
            marketplace_mode: true,
            ..SiteSettingsUpdate::default()
        };
        test_store(&server).replace(update).await.unwrap();

        m.assert();
    }

    #[tokio::test]
    async fn test_bearer_token_and_user_agent_are_sent() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(Method::GET)
                .path("/settings")
                .header("authorization", "Bearer s3cr3t")
                .header("user-agent", "settings-admin/1.0");
            then.status(200).json_body(record_json(true));
        });

        let config = SiteSettingsConfig {
            endpoint: Some(format!("{}/", server.base_url())),
            allow_insecure_http: true,
            user_agent: "settings-admin/1.0".to_owned(),
            auth_token: Some(SecretString::from("s3cr3t")),
            ..SiteSettingsConfig::default()
        };
        let store = HttpSettingsStore::from_config(&config).unwrap();
        store.fetch().await.unwrap();

        m.assert();
    }

    #[tokio::test]
    async fn test_non_2xx_returns_status_with_preview() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::PUT).path("/settings");
            then.status(503).body("maintenance");
        });

        let err = test_store(&server)
            .replace(SiteSettingsUpdate::default())
            .await
            .unwrap_err();

        match store_error(&err) {
            HttpStoreError::HttpStatus {
                status,
                body_preview,
            } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body_preview, "maintenance");
            }
            other => panic!("expected HttpStatus, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_record_is_a_json_error() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/settings");
            then.status(200).json_body(json!({ "marketplaceMode": "yes" }));
        });

        let err = test_store(&server).fetch().await.unwrap_err();
        assert!(matches!(store_error(&err), HttpStoreError::Json(_)));
    }

    #[tokio::test]
    async fn test_record_missing_a_flag_is_a_json_error() {
        let server = MockServer::start();
        let mut partial = record_json(true);
        partial.as_object_mut().unwrap().remove("marketplaceMode");
        let _m = server.mock(|when, then| {
            when.method(Method::PATCH).path("/settings");
            then.status(200).json_body(partial);
        });

        let err = test_store(&server)
            .patch(SiteSettingsPatch::single(SettingsFlag::ShowPricesOnProjects, true))
            .await
            .unwrap_err();
        assert!(matches!(store_error(&err), HttpStoreError::Json(_)));
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let server = MockServer::start();
        let large_body = "x".repeat(64 * 1024);
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/settings");
            then.status(200).body(&large_body);
        });

        let config = SiteSettingsConfig {
            endpoint: Some(server.base_url()),
            allow_insecure_http: true,
            max_body_size: 1024,
            ..SiteSettingsConfig::default()
        };
        let err = HttpSettingsStore::from_config(&config)
            .unwrap()
            .fetch()
            .await
            .unwrap_err();

        assert!(matches!(
            store_error(&err),
            HttpStoreError::BodyTooLarge { limit: 1024, .. }
        ));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(Method::GET).path("/settings");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(record_json(true));
        });

        let config = SiteSettingsConfig {
            endpoint: Some(server.base_url()),
            allow_insecure_http: true,
            request_timeout: Duration::from_millis(100),
            ..SiteSettingsConfig::default()
        };
        let err = HttpSettingsStore::from_config(&config)
            .unwrap()
            .fetch()
            .await
            .unwrap_err();

        assert!(matches!(store_error(&err), HttpStoreError::Timeout(_)));
    }

    #[test]
    fn test_plain_http_rejected_without_opt_in() {
        let config = SiteSettingsConfig {
            endpoint: Some("http://settings.example.com".to_owned()),
            ..SiteSettingsConfig::default()
        };

        match HttpSettingsStore::from_config(&config) {
            Err(HttpStoreError::InvalidScheme { scheme, .. }) => assert_eq!(scheme, "http"),
            Err(other) => panic!("expected InvalidScheme, got: {other}"),
            Ok(_) => panic!("expected InvalidScheme, got a store"),
        }
    }

    #[test]
    fn test_endpoint_path_is_joined() {
        let config = SiteSettingsConfig {
            endpoint: Some("https://api.example.com/v1/".to_owned()),
            ..SiteSettingsConfig::default()
        };

        let store = HttpSettingsStore::from_config(&config).unwrap();
        assert_eq!(
            store.settings_uri().to_string(),
            "https://api.example.com/v1/settings"
        );
    }

    #[test]
    fn test_missing_endpoint_is_rejected() {
        let result = HttpSettingsStore::from_config(&SiteSettingsConfig::default());
        assert!(matches!(
            result,
            Err(HttpStoreError::InvalidEndpoint { .. })
        ));
    }
}
