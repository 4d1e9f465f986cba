// # INWX Zone Provider
//
// This crate provides the INWX DomRobot implementation of `ZoneProvider`.
//
// ## Behaviour
//
// - One JSON-RPC request per trait call; no retries (the engine decides what
//   to do with failures)
// - Session cookie obtained by `account.login`, released by `account.logout`
// - Two-factor accounts are unlocked with a TOTP code (`account.unlock`)
// - HTTP timeout of 30 seconds
// - Dry-run mode: lookups are sent, mutations are only logged
//
// ## Security Requirements
//
// - Password and 2FA secret NEVER appear in logs or `Debug` output
// - Credentials come from the environment only
//
// ## API Reference
//
// - DomRobot JSON-RPC: https://www.inwx.com/en/help/apidoc
// - Zone lookup: `nameserver.info {domain}` / `nameserver.info {roId}`
// - Records: `nameserver.createRecord`, `nameserver.updateRecord`,
//   `nameserver.deleteRecord`
// - Zones: `nameserver.delete {domain}`

pub mod totp;
mod wire;

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};
use wire::{Reply, Request};
use zonesync_core::config::{Environment, ProviderConfig};
use zonesync_core::record::{ExistingRecord, NormalizedRecord, RecordId, ZoneId};
use zonesync_core::traits::{ProviderResponse, ZoneProvider, ZoneProviderFactory};
use zonesync_core::{Error, Result};

pub use wire::SUCCESS_CODE;

/// Production DomRobot endpoint
pub const INWX_LIVE_ENDPOINT: &str = "https://api.domrobot.com/jsonrpc/";

/// Operational test environment (sandbox) endpoint
pub const INWX_OTE_ENDPOINT: &str = "https://api.ote.domrobot.com/jsonrpc/";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Language requested for provider messages
const LOGIN_LANGUAGE: &str = "en";

/// Name used in logs and errors
const PROVIDER_NAME: &str = "inwx";

/// DomRobot endpoint for an environment
pub fn endpoint_for(environment: Environment) -> &'static str {
    match environment {
        Environment::Live => INWX_LIVE_ENDPOINT,
        Environment::Ote => INWX_OTE_ENDPOINT,
    }
}

/// INWX zone provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Log in and perform all lookups (`nameserver.info`)
/// - Log the intended mutation with its parameters
/// - **NOT** send it, reporting success instead
///
/// # Security
///
/// The Debug implementation does NOT expose the password or 2FA secret.
pub struct InwxProvider {
    /// Account user name
    username: String,

    /// Account password
    /// ⚠️ NEVER log this value
    password: String,

    /// Base32 TOTP secret for 2FA accounts
    /// ⚠️ NEVER log this value
    shared_secret: Option<String>,

    /// JSON-RPC endpoint URL
    endpoint: String,

    /// HTTP client; its cookie store carries the session
    client: reqwest::Client,

    /// Dry-run mode: if true, perform lookups but skip mutations
    dry_run: bool,
}

// Custom Debug implementation that hides credentials
impl std::fmt::Debug for InwxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InwxProvider")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("shared_secret", &self.shared_secret.as_ref().map(|_| "<REDACTED>"))
            .field("endpoint", &self.endpoint)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl InwxProvider {
    /// Create a new INWX provider
    ///
    /// # Parameters
    ///
    /// - `username`, `password`: Account credentials
    /// - `shared_secret`: Base32 TOTP secret, required for 2FA accounts
    /// - `environment`: Live or OTE endpoint
    /// - `dry_run`: If true, perform lookups but skip mutations
    ///
    /// # Errors
    ///
    /// `Error::Config` for empty credentials, `Error::Http` if the HTTP client
    /// cannot be built.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        shared_secret: Option<String>,
        environment: Environment,
        dry_run: bool,
    ) -> Result<Self> {
        let username = username.into();
        let password = password.into();

        if username.is_empty() || password.is_empty() {
            return Err(Error::config("INWX username and password are required"));
        }

        // Cookie store keeps the DomRobot session between calls
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            username,
            password,
            shared_secret: shared_secret.filter(|secret| !secret.trim().is_empty()),
            endpoint: endpoint_for(environment).to_string(),
            client,
            dry_run,
        })
    }

    /// Point the provider at another endpoint (tests, proxies)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The JSON-RPC endpoint in use
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether mutations are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Issue one JSON-RPC call
    ///
    /// `Err` means no verdict was obtained: transport failure, HTTP error
    /// status or an undecodable body.
    async fn call(&self, method: &str, params: Value) -> Result<Reply> {
        debug!("INWX call: {}", method);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&Request { method, params })
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", method, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status.as_u16() {
                429 => Error::provider(
                    PROVIDER_NAME,
                    format!("Rate limit exceeded on {}. Status: {}", method, status),
                ),
                500..=599 => Error::provider(
                    PROVIDER_NAME,
                    format!("INWX server error on {}: {} - {}", method, status, error_text),
                ),
                _ => Error::provider(
                    PROVIDER_NAME,
                    format!("{} failed: {} - {}", method, status, error_text),
                ),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{} response unreadable: {}", method, e)))?;
        let reply: Reply = serde_json::from_str(&body)?;

        debug!("INWX {} -> {}", method, reply.describe());
        Ok(reply)
    }

    /// Issue a mutating call, or only log it in dry-run mode
    async fn mutate(&self, method: &str, params: Value) -> Result<ProviderResponse<()>> {
        if self.dry_run {
            info!("[DRY-RUN] Would call {} with {}", method, params);
            return Ok(ProviderResponse::ok(Some(SUCCESS_CODE), ()));
        }

        Ok(self.call(method, params).await?.verdict(|_| Some(())))
    }

    /// Second login step for 2FA accounts
    async fn unlock(&self) -> Result<()> {
        let secret = self.shared_secret.as_deref().ok_or_else(|| {
            Error::auth("account requires two-factor authentication but no 2FA secret is configured")
        })?;

        let tan = totp::current(secret).map_err(|e| Error::auth(format!("cannot compute 2FA code: {}", e)))?;

        let reply = self
            .call("account.unlock", json!({ "tan": tan }))
            .await
            .map_err(|e| Error::auth(format!("unlock failed: {}", e)))?;

        if !reply.is_success() {
            return Err(Error::auth(format!("unlock rejected: {}", reply.describe())));
        }
        Ok(())
    }
}

#[async_trait]
impl ZoneProvider for InwxProvider {
    /// Log in, unlocking with a TOTP code when the account requires it
    ///
    /// ```json
    /// {"method": "account.login", "params": {"user": "...", "pass": "...", "lang": "en"}}
    /// {"method": "account.unlock", "params": {"tan": "123456"}}
    /// ```
    async fn open_session(&self) -> Result<()> {
        let reply = self
            .call(
                "account.login",
                json!({
                    "user": self.username,
                    "pass": self.password,
                    "lang": LOGIN_LANGUAGE,
                }),
            )
            .await
            .map_err(|e| Error::auth(format!("login failed: {}", e)))?;

        if !reply.is_success() {
            return Err(Error::auth(format!("login rejected: {}", reply.describe())));
        }

        if reply.requires_second_factor() {
            debug!("INWX account requires a second factor");
            self.unlock().await?;
        }

        info!(
            "Logged in to INWX as {} [endpoint: {}] [mode: {}]",
            self.username,
            self.endpoint,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );
        Ok(())
    }

    async fn close_session(&self) -> Result<()> {
        let reply = self.call("account.logout", json!({})).await?;
        if !reply.is_success() {
            warn!("INWX logout returned non-success: {}", reply.describe());
        }
        Ok(())
    }

    async fn lookup_zone(&self, name: &str) -> Result<ProviderResponse<ZoneId>> {
        Ok(self
            .call("nameserver.info", json!({ "domain": name }))
            .await?
            .verdict(wire::zone_id))
    }

    async fn delete_zone(&self, name: &str) -> Result<ProviderResponse<()>> {
        self.mutate("nameserver.delete", json!({ "domain": name })).await
    }

    async fn zone_records(&self, zone_id: &ZoneId) -> Result<ProviderResponse<Vec<ExistingRecord>>> {
        Ok(self
            .call("nameserver.info", json!({ "roId": wire::id_param(&zone_id.0) }))
            .await?
            .verdict(|res_data| Some(wire::zone_records(res_data))))
    }

    async fn create_record(
        &self,
        zone_id: &ZoneId,
        record: &NormalizedRecord,
    ) -> Result<ProviderResponse<()>> {
        let mut params = wire::record_params(record);
        params.insert("roId".to_string(), wire::id_param(&zone_id.0));
        self.mutate("nameserver.createRecord", Value::Object(params)).await
    }

    async fn update_record(
        &self,
        id: &RecordId,
        record: &NormalizedRecord,
    ) -> Result<ProviderResponse<()>> {
        let mut params = wire::record_params(record);
        params.insert("id".to_string(), wire::id_param(&id.0));
        self.mutate("nameserver.updateRecord", Value::Object(params)).await
    }

    async fn delete_record(&self, id: &RecordId) -> Result<ProviderResponse<()>> {
        self.mutate("nameserver.deleteRecord", json!({ "id": wire::id_param(&id.0) }))
            .await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating INWX providers
pub struct InwxFactory;

impl ZoneProviderFactory for InwxFactory {
    fn create(&self, config: &ProviderConfig, dry_run: bool) -> Result<Box<dyn ZoneProvider>> {
        match config {
            ProviderConfig::Inwx {
                username,
                password,
                shared_secret,
                environment,
            } => {
                if dry_run {
                    warn!("INWX provider running in DRY-RUN mode - no changes will be made");
                }

                Ok(Box::new(InwxProvider::new(
                    username.clone(),
                    password.clone(),
                    shared_secret.clone(),
                    *environment,
                    dry_run,
                )?))
            }
            _ => Err(Error::config("Invalid config for INWX provider")),
        }
    }
}

/// Register the INWX provider with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonesync_provider_inwx::register(&registry);
/// assert!(registry.has_provider("inwx"));
/// ```
pub fn register(registry: &zonesync_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(InwxFactory));
}
