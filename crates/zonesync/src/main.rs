// # zonesync - panel DNS zone synchronizer
//
// This binary is a THIN integration layer: all reconciliation logic lives in
// zonesync-core, all provider logic in the provider crates.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Reading the JSON instruction array from stdin
// 3. Registering providers and opening the provider session
// 4. Running the dispatcher and mapping its outcome to an exit code
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Provider
// - `INWX_USERNAME`, `INWX_PASSWORD`: Account credentials
// - `INWX_2FA_SECRET`: Base32 TOTP secret (optional)
// - `INWX_LIVE`: `1` for the production endpoint, otherwise the OTE sandbox
//
// ### Synchronization
// - `ZONESYNC_ENABLED`: `0` disables the tool (exit 0 without reading input)
// - `ZONESYNC_MODE`: `dry-run` to log mutations instead of sending them
// - `ZONESYNC_DEFAULT_TTL`: TTL for zones without an SOA TTL (default 3600)
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Exit Codes
//
// - 0: Success, tool disabled, credentials missing, or login rejected
// - 255: Malformed input, configuration error, or any zone/record failure
//
// ## Example
//
// ```bash
// export INWX_USERNAME=panel
// export INWX_PASSWORD=secret
// echo '[{"command":"update","zone":{"name":"example.com.","rr":[]}}]' | zonesync
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tokio::io::AsyncRead;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::{DEFAULT_TTL, Environment, ProviderConfig, SyncConfig};
use zonesync_core::dispatch::{Dispatcher, read_instructions};
use zonesync_core::ProviderRegistry;

/// Exit codes understood by the calling panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZonesyncExitCode {
    /// Nothing went wrong, or there was deliberately nothing to do
    Success = 0,
    /// Malformed input, bad configuration, or a failed zone/record operation
    Failure = 255,
}

impl From<ZonesyncExitCode> for ExitCode {
    fn from(code: ZonesyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    enabled: bool,
    username: String,
    password: String,
    shared_secret: Option<String>,
    live: bool,
    dry_run: bool,
    default_ttl: u32,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default_ttl = match lookup("ZONESYNC_DEFAULT_TTL").filter(|s| !s.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("ZONESYNC_DEFAULT_TTL must be a positive integer. Got: {}", raw))?,
            None => DEFAULT_TTL,
        };

        Ok(Self {
            enabled: lookup("ZONESYNC_ENABLED").is_none_or(|v| v.trim() != "0"),
            username: lookup("INWX_USERNAME").unwrap_or_default(),
            password: lookup("INWX_PASSWORD").unwrap_or_default(),
            shared_secret: lookup("INWX_2FA_SECRET").filter(|s| !s.trim().is_empty()),
            live: lookup("INWX_LIVE").is_some_and(|v| v.trim() == "1"),
            dry_run: lookup("ZONESYNC_MODE").is_some_and(|v| v.trim().eq_ignore_ascii_case("dry-run")),
            default_ttl,
            log_level: lookup("ZONESYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.sync_config()
            .validate()
            .context("Invalid synchronization settings")?;

        Ok(())
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Library configuration for this run
    fn sync_config(&self) -> SyncConfig {
        let provider = ProviderConfig::Inwx {
            username: self.username.clone(),
            password: self.password.clone(),
            shared_secret: self.shared_secret.clone(),
            environment: if self.live {
                Environment::Live
            } else {
                Environment::Ote
            },
        };

        SyncConfig::new(provider)
            .with_enabled(self.enabled)
            .with_default_ttl(self.default_ttl)
            .with_dry_run(self.dry_run)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ZonesyncExitCode::Failure.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return ZonesyncExitCode::Failure.into();
    }

    // Initialize tracing; stdout is reserved for the panel
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonesyncExitCode::Failure.into();
    }

    if !config.enabled {
        info!("zonesync is disabled (ZONESYNC_ENABLED=0); nothing to do");
        return ZonesyncExitCode::Success.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonesyncExitCode::Failure.into();
        }
    };

    let result = rt.block_on(async {
        match run(config).await {
            Ok(code) => code,
            Err(e) => {
                error!("zonesync failed: {:#}", e);
                ZonesyncExitCode::Failure
            }
        }
    });

    result.into()
}

/// Process one batch of instructions from stdin
async fn run(config: Config) -> Result<ZonesyncExitCode> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "inwx")]
    {
        debug!("Registering INWX provider");
        zonesync_provider_inwx::register(&registry);
    }

    synchronize(tokio::io::stdin(), &config.sync_config(), &registry).await
}

/// Decode the instructions in `input` and apply them through the configured provider
///
/// Maps the run to the exit code the panel sees. Only a malformed payload or
/// a recorded zone/record failure is a failure; missing credentials and a
/// rejected login skip synchronization.
async fn synchronize<R>(
    input: R,
    sync_config: &SyncConfig,
    registry: &ProviderRegistry,
) -> Result<ZonesyncExitCode>
where
    R: AsyncRead + Unpin,
{
    let instructions = match read_instructions(input).await {
        Ok(instructions) => instructions,
        Err(e) => {
            error!("{}", e);
            return Ok(ZonesyncExitCode::Failure);
        }
    };
    debug!("Decoded {} instruction(s)", instructions.len());

    // Missing credentials must not block the panel
    if !sync_config.provider.has_credentials() {
        warn!("Provider credentials are not configured. Skipping any DNS synchronization.");
        return Ok(ZonesyncExitCode::Success);
    }

    let provider = registry
        .create_provider(sync_config)
        .context("Failed to create provider")?;

    if let Err(e) = provider.open_session().await {
        error!("{}", e);
        warn!("{} client unavailable; skipping synchronization.", provider.provider_name());
        return Ok(ZonesyncExitCode::Success);
    }

    let (dispatcher, mut events) = Dispatcher::new(provider, sync_config)?;

    let observer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "sync event");
        }
    });

    let report = dispatcher.run(instructions).await;

    if let Err(e) = dispatcher.provider().close_session().await {
        debug!("Ignoring logout failure: {}", e);
    }

    // Closing the channel lets the observer finish
    drop(dispatcher);
    if let Err(e) = observer.await {
        debug!("Event observer ended abnormally: {}", e);
    }

    if report.had_errors {
        warn!("Synchronization finished with errors");
        Ok(ZonesyncExitCode::Failure)
    } else {
        info!("Synchronization finished");
        Ok(ZonesyncExitCode::Success)
    }
}
