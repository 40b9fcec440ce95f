// File: src/client/core.rs

use crate::client::cert::AcceptAnyCert;
use crate::client::{ApiError, EVENTS_PATH, EventApi};
use crate::config::Config;
use crate::model::{DataEnvelope, Event, EventDraft, EventId};

use async_trait::async_trait;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Uri};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use std::sync::Arc;

type HttpsClient =
    Client<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>, String>;

const JSON: &str = "application/json";

#[derive(Clone, Debug)]
pub struct RestClient {
    http: HttpsClient,
    base_url: String,
    auth: Option<HeaderValue>,
}

impl RestClient {
    pub fn new(base_url: &str, api_token: Option<&str>, insecure: bool) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let events_url = format!("{}{}", base_url, EVENTS_PATH);
        let uri: Uri = events_url.parse().map_err(|source| ApiError::InvalidUrl {
            url: events_url.clone(),
            source,
        })?;

        let https_connector = if insecure {
            let builder = rustls::ClientConfig::builder();
            let verifier =
                AcceptAnyCert::new(builder.crypto_provider().signature_verification_algorithms);
            let tls_config = builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(verifier))
                .with_no_client_auth();
            HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_or_http()
                .enable_http1()
                .build()
        } else {
            let mut root_store = rustls::RootCertStore::empty();
            let result = rustls_native_certs::load_native_certs();
            root_store.add_parsable_certificates(result.certs);
            // Plain http servers (the local default) don't need any roots
            if root_store.is_empty() && uri.scheme_str() == Some("https") {
                return Err(ApiError::Tls(
                    "No valid system certificates found.".to_string(),
                ));
            }
            let tls_config = rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();
            HttpsConnectorBuilder::new()
                .with_tls_config(tls_config)
                .https_or_http()
                .enable_http1()
                .build()
        };

        let auth = match api_token {
            Some(token) if !token.is_empty() => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(http::Error::from)?;
                value.set_sensitive(true);
                Some(value)
            }
            _ => None,
        };

        let http = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            config.api_token.as_deref(),
            config.allow_insecure_certs,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn uri(&self, id: Option<&EventId>) -> Result<Uri, ApiError> {
        let url = match id {
            // Text ids may hold reserved characters; keep them inside one segment
            Some(id) => format!(
                "{}{}/{}",
                self.base_url,
                EVENTS_PATH,
                urlencoding::encode(&id.to_string())
            ),
            None => format!("{}{}", self.base_url, EVENTS_PATH),
        };
        url.parse()
            .map_err(|source| ApiError::InvalidUrl { url, source })
    }

    /// Sends one request and returns the raw body of a 2xx response.
    async fn send(
        &self,
        method: Method,
        uri: Uri,
        body: Option<String>,
    ) -> Result<Vec<u8>, ApiError> {
        log::debug!("{} {}", method, uri);

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .header(ACCEPT, JSON);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, JSON);
        }
        if let Some(auth) = &self.auth {
            builder = builder.header(AUTHORIZATION, auth.clone());
        }
        let request = builder.body(body.unwrap_or_default())?;

        let response = self.http.request(request).await?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Body(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            log::debug!("{} {} -> {}", method, uri, status);
            return Err(ApiError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: Uri,
        body: Option<String>,
    ) -> Result<T, ApiError> {
        let bytes = self.send(method, uri, body).await?;
        let envelope: DataEnvelope<T> = serde_json::from_slice(&bytes)?;
        Ok(envelope.into_inner())
    }

    fn draft_body(draft: &EventDraft) -> Result<String, ApiError> {
        Ok(serde_json::to_string(&DataEnvelope::new(draft))?)
    }
}

#[async_trait]
impl EventApi for RestClient {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        self.send_json(Method::GET, self.uri(None)?, None).await
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        let body = Self::draft_body(draft)?;
        self.send_json(Method::POST, self.uri(None)?, Some(body))
            .await
    }

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> Result<Event, ApiError> {
        let body = Self::draft_body(draft)?;
        self.send_json(Method::PUT, self.uri(Some(id))?, Some(body))
            .await
    }

    async fn delete_event(&self, id: &EventId) -> Result<(), ApiError> {
        self.send(Method::DELETE, self.uri(Some(id))?, None).await?;
        Ok(())
    }
}
