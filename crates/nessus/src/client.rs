//! Nessus REST API client.
//!
//! [`NessusClient`] wraps a `reqwest::Client` with the authentication headers
//! the scanner expects and implements [`PluginCatalog`] so the enumerator can
//! drive it directly.
//!
//! # Authentication
//!
//! Three header sources are combined on every request when present:
//!
//! - `X-Cookie: token=<t>` after a successful [`NessusClient::login`]
//! - `X-ApiKeys: accessKey=<a>; secretKey=<s>` when API keys are configured
//! - `X-API-Token: <uuid>` after [`NessusClient::fetch_api_token`]
//!
//! # Examples
//!
//! ```ignore
//! use std::sync::Arc;
//! use ironscan_nessus::{NessusClient, NessusClientConfigBuilder};
//!
//! let config = NessusClientConfigBuilder::new()
//!     .api_url("https://scanner.internal:8834")
//!     .api_keys(access, secret)
//!     .build()?;
//! let client = Arc::new(NessusClient::new(config)?);
//!
//! let families = client.plugin_families().await?;
//! ```

use std::time::Duration;

use metrics::counter;
use regex::Regex;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};

use ironscan_core::catalog::PluginCatalog;
use ironscan_core::error::CatalogError;
use ironscan_core::metrics as names;
use ironscan_core::types::{FamilyRef, PluginRecord, PluginRef};

use crate::config::NessusClientConfig;
use crate::error::NessusError;
use crate::models::{
    FamilyDetails, LoginRequest, LoginResponse, PluginDetails, PluginFamilies, PluginFamily,
    ServerProperties, ServerStatus, Session,
};

/// Script served by the web UI that embeds the API token.
pub const API_TOKEN_SCRIPT: &str = "/nessus6.js";

const API_TOKEN_PATTERN: &str =
    "([0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12})";

#[derive(Debug, Default)]
struct AuthState {
    session_token: Option<String>,
    api_token: Option<String>,
}

/// Nessus REST API client
///
/// All methods take `&self`; session state lives behind an async lock so one
/// client can be shared across enumeration workers through an `Arc`.
pub struct NessusClient {
    http: Client,
    base_url: Url,
    config: NessusClientConfig,
    auth: RwLock<AuthState>,
}

impl NessusClient {
    /// Builds a client from a validated configuration.
    ///
    /// Loads the extra CA root when `ca_cert_path` is set. No request is sent.
    pub fn new(config: NessusClientConfig) -> Result<Self, NessusError> {
        config.validate()?;

        let base_url = Url::parse(&config.api_url).map_err(|e| NessusError::InvalidUrl {
            url: config.api_url.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path).map_err(|e| {
                NessusError::Tls(format!("failed to read CA certificate {}: {e}", path.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                NessusError::Tls(format!("invalid CA certificate {}: {e}", path.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if config.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| NessusError::Tls(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            config,
            auth: RwLock::new(AuthState::default()),
        })
    }

    pub fn config(&self) -> &NessusClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current session token, if logged in.
    pub async fn session_token(&self) -> Option<String> {
        self.auth.read().await.session_token.clone()
    }

    /// API token discovered by [`fetch_api_token`](Self::fetch_api_token), if any.
    pub async fn api_token(&self) -> Option<String> {
        self.auth.read().await.api_token.clone()
    }

    /// Resolves `resource` against the base URL.
    ///
    /// The resource replaces the base path. A `?query` suffix becomes the query string.
    pub fn resource_url(&self, resource: &str) -> Url {
        let mut url = self.base_url.clone();
        match resource.split_once('?') {
            Some((path, query)) => {
                url.set_path(path);
                url.set_query(Some(query));
            }
            None => {
                url.set_path(resource);
                url.set_query(None);
            }
        }
        url
    }

    /// Sends one request and checks the status against `want_status`.
    ///
    /// # Errors
    ///
    /// - `NessusError::Transport` when the request cannot be sent
    /// - `NessusError::UnexpectedStatus` when the status is not in `want_status`
    pub async fn request<B>(
        &self,
        method: Method,
        resource: &str,
        body: Option<&B>,
        want_status: &[StatusCode],
    ) -> Result<reqwest::Response, NessusError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resource_url(resource);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json");

        {
            let auth = self.auth.read().await;
            if let Some(token) = &auth.session_token {
                request = request.header("X-Cookie", format!("token={token}"));
            }
            if let Some(token) = &auth.api_token {
                request = request.header("X-API-Token", token.as_str());
            }
        }
        if let Some(keys) = &self.config.api_keys {
            request = request.header(
                "X-ApiKeys",
                format!(
                    "accessKey={}; secretKey={}",
                    keys.access_key, keys.secret_key
                ),
            );
        }

        if let Some(body) = body {
            let encoded =
                serde_json::to_vec(body).map_err(|e| NessusError::Encode(e.to_string()))?;
            request = request.body(encoded);
        }

        if self.config.verbose {
            debug!(method = %method, url = %url, "sending nessus request");
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                record_request(&method, "error");
                return Err(NessusError::Transport(format!("{method} {url}: {e}")));
            }
        };

        let status = response.status();
        if self.config.verbose {
            debug!(method = %method, url = %url, status = status.as_u16(), "received nessus response");
        }

        if !want_status.contains(&status) {
            record_request(&method, "error");
            let body = response.text().await.unwrap_or_default();
            return Err(NessusError::UnexpectedStatus {
                status: status.as_u16(),
                expected: want_status.iter().map(StatusCode::as_u16).collect(),
                body,
            });
        }

        record_request(&method, "ok");
        Ok(response)
    }

    /// Sends a request and decodes the JSON response body.
    async fn request_json<B, T>(
        &self,
        method: Method,
        resource: &str,
        body: Option<&B>,
        want_status: &[StatusCode],
    ) -> Result<(StatusCode, T), NessusError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, resource, body, want_status).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NessusError::Transport(format!("failed to read body of {resource}: {e}")))?;
        let decoded = serde_json::from_str(&text).map_err(|e| NessusError::Decode {
            resource: resource.to_owned(),
            reason: e.to_string(),
        })?;
        Ok((status, decoded))
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str) -> Result<T, NessusError> {
        let (_, decoded) = self
            .request_json::<(), T>(Method::GET, resource, None, &[StatusCode::OK])
            .await?;
        Ok(decoded)
    }

    /// Scrapes the API token from the web UI script and stores it.
    ///
    /// Returns `None` when the script carries no token. Needed by some upgraded
    /// servers that reject API-key requests without `X-API-Token`.
    pub async fn fetch_api_token(&self) -> Result<Option<String>, NessusError> {
        let url = self.resource_url(API_TOKEN_SCRIPT);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| NessusError::Transport(format!("GET {url}: {e}")))?;
        let script = response
            .text()
            .await
            .map_err(|e| NessusError::Transport(format!("failed to read {url}: {e}")))?;

        let pattern = Regex::new(API_TOKEN_PATTERN).map_err(|e| NessusError::Config {
            field: "api_token_pattern".to_owned(),
            reason: e.to_string(),
        })?;
        let token = pattern.find(&script).map(|m| m.as_str().to_owned());

        match &token {
            Some(_) => debug!("discovered nessus api token"),
            None => debug!("no api token found in {}", API_TOKEN_SCRIPT),
        }

        self.auth.write().await.api_token = token.clone();
        Ok(token)
    }

    /// Logs in with a username and password and keeps the session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), NessusError> {
        if self.config.verbose {
            debug!(url = %self.base_url, username, "logging into nessus");
        }

        let body = LoginRequest { username, password };
        let (_, reply): (_, LoginResponse) = self
            .request_json(Method::POST, "/session", Some(&body), &[StatusCode::OK])
            .await?;

        self.auth.write().await.session_token = Some(reply.token);
        info!(username, "nessus session established");
        Ok(())
    }

    /// Logs in with the credentials from the configuration, if any.
    ///
    /// Returns `false` when no credentials are configured.
    pub async fn login_with_config(&self) -> Result<bool, NessusError> {
        match &self.config.credentials {
            Some(creds) => {
                self.login(&creds.username, &creds.password).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Invalidates the current session token. No-op when not logged in.
    pub async fn logout(&self) -> Result<(), NessusError> {
        if self.auth.read().await.session_token.is_none() {
            debug!("not logged in, nothing to do to logout");
            return Ok(());
        }

        self.request::<()>(Method::DELETE, "/session", None, &[StatusCode::OK])
            .await?;
        self.auth.write().await.session_token = None;
        info!("nessus session closed");
        Ok(())
    }

    /// Details of the current session.
    pub async fn session(&self) -> Result<Session, NessusError> {
        self.get_json("/session").await
    }

    /// Server properties (version, plugin set, platform).
    pub async fn server_properties(&self) -> Result<ServerProperties, NessusError> {
        self.get_json("/server/properties").await
    }

    /// Server status. A 503 answer is accepted and flags the session for destruction.
    pub async fn server_status(&self) -> Result<ServerStatus, NessusError> {
        let (status, mut reply): (_, ServerStatus) = self
            .request_json::<(), _>(
                Method::GET,
                "/server/status",
                None,
                &[StatusCode::OK, StatusCode::SERVICE_UNAVAILABLE],
            )
            .await?;
        if status == StatusCode::SERVICE_UNAVAILABLE {
            reply.must_destroy_session = true;
        }
        Ok(reply)
    }

    /// All plugin families.
    pub async fn plugin_families(&self) -> Result<Vec<PluginFamily>, NessusError> {
        let reply: PluginFamilies = self.get_json("/plugins/families").await?;
        Ok(reply.families)
    }

    /// One family with its member plugins.
    pub async fn family_details(&self, family_id: i64) -> Result<FamilyDetails, NessusError> {
        self.get_json(&format!("/plugins/families/{family_id}"))
            .await
    }

    /// Full details of one plugin.
    pub async fn plugin_details(&self, plugin_id: i64) -> Result<PluginDetails, NessusError> {
        self.get_json(&format!("/plugins/plugin/{plugin_id}"))
            .await
    }

    /// Request timeout in effect.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }
}

impl std::fmt::Debug for NessusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NessusClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish()
    }
}

fn record_request(method: &Method, result: &'static str) {
    counter!(
        names::NESSUS_REQUESTS_TOTAL,
        names::LABEL_METHOD => method.as_str().to_owned(),
        names::LABEL_RESULT => result
    )
    .increment(1);
}

impl PluginCatalog for NessusClient {
    async fn list_families(&self) -> Result<Vec<FamilyRef>, CatalogError> {
        let families = self.plugin_families().await?;
        Ok(families.into_iter().map(FamilyRef::from).collect())
    }

    async fn family_plugins(&self, family_id: i64) -> Result<Vec<PluginRef>, CatalogError> {
        let details = self.family_details(family_id).await?;
        Ok(details.plugin_refs())
    }

    async fn plugin_details(&self, plugin_id: i64) -> Result<PluginRecord, CatalogError> {
        let details = NessusClient::plugin_details(self, plugin_id).await?;
        Ok(details.into())
    }
}
