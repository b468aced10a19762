//! Command handlers -- one module per subcommand

pub mod config;
pub mod families;
pub mod plugin;
pub mod plugins;
pub mod server;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use ironscan_core::config::{IronscanConfig, NessusConfig};
use ironscan_core::error::{ConfigError, IronscanError};
use ironscan_nessus::{NessusClient, NessusClientConfig};

use crate::error::CliError;

/// Load the effective configuration for a remote command.
///
/// A missing file falls back to defaults plus env overrides. `log_level`
/// from the command line wins over both.
pub async fn load_config(
    path: &Path,
    log_level: Option<&str>,
) -> Result<IronscanConfig, CliError> {
    let mut config = match IronscanConfig::load(path).await {
        Ok(config) => config,
        Err(IronscanError::Config(ConfigError::FileNotFound { .. })) => {
            let mut config = IronscanConfig::default();
            config.apply_env_overrides();
            config
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(level) = log_level {
        config.general.log_level = level.to_owned();
    }
    config.validate()?;
    Ok(config)
}

/// An authenticated client for the duration of one command.
pub struct ScannerSession {
    client: Arc<NessusClient>,
    logged_in: bool,
}

impl ScannerSession {
    /// Build the client, discover the API token and log in when credentials are set.
    pub async fn open(config: &NessusConfig) -> Result<Self, CliError> {
        let client = NessusClient::new(NessusClientConfig::from_core(config))?;

        if let Err(e) = client.fetch_api_token().await {
            debug!(error = %e, "api token discovery failed, continuing without it");
        }

        let logged_in = client.login_with_config().await?;
        Ok(Self {
            client: Arc::new(client),
            logged_in,
        })
    }

    pub fn client(&self) -> Arc<NessusClient> {
        Arc::clone(&self.client)
    }

    /// Close the session opened by `open`. Failures are only logged.
    pub async fn close(self) {
        if self.logged_in
            && let Err(e) = self.client.logout().await
        {
            warn!(error = %e, "failed to close nessus session");
        }
    }
}
