//! Configuration types for zone synchronization
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// TTL applied when neither the record nor the zone's SOA carries one
pub const DEFAULT_TTL: u32 = 3600;

/// Main synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Whether synchronization is enabled at all
    ///
    /// A disabled dispatcher skips every instruction without calling the
    /// provider.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Fallback TTL for zones without an SOA TTL
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Dry-run mode: perform lookups, log mutations instead of sending them
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the sync event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl SyncConfig {
    /// Create a new configuration with defaults for the given provider
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            enabled: default_enabled(),
            default_ttl: default_ttl(),
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Enable or disable synchronization
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the fallback TTL
    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Validate the configuration
    ///
    /// Missing credentials are not a validation failure; see
    /// [`ProviderConfig::has_credentials`].
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.default_ttl == 0 {
            return Err(crate::Error::config("Default TTL must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        self.provider.validate()
    }
}

/// Provider environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production endpoint
    Live,
    /// Operational test environment (sandbox)
    #[default]
    Ote,
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// INWX DomRobot API
    Inwx {
        /// Account user name
        username: String,
        /// Account password
        password: String,
        /// Base32 TOTP secret, when the account has 2FA enabled
        #[serde(default)]
        shared_secret: Option<String>,
        /// Live or sandbox endpoint
        #[serde(default)]
        environment: Environment,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Inwx { shared_secret, .. } => {
                if shared_secret.as_deref().is_some_and(|s| s.trim().is_empty()) {
                    return Err(crate::Error::config(
                        "INWX 2FA secret must be omitted rather than empty",
                    ));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Whether enough credentials are present to attempt a login
    pub fn has_credentials(&self) -> bool {
        match self {
            ProviderConfig::Inwx {
                username, password, ..
            } => !username.is_empty() && !password.is_empty(),
            ProviderConfig::Custom { .. } => true,
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Inwx { .. } => "inwx",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Custom Debug implementation that hides credentials
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Inwx {
                username,
                shared_secret,
                environment,
                ..
            } => f
                .debug_struct("Inwx")
                .field("username", username)
                .field("password", &"<REDACTED>")
                .field("shared_secret", &shared_secret.as_ref().map(|_| "<REDACTED>"))
                .field("environment", environment)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_event_channel_capacity() -> usize {
    1000
}
