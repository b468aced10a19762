//! `ironscan config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use ironscan_core::config::IronscanConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const REDACTED: &str = "***REDACTED***";
const SECTIONS: &[&str] = &["general", "nessus", "enumeration"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file.
///
/// Unlike the remote commands, a missing file is reported as invalid.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match IronscanConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
///
/// Secrets are replaced with a fixed marker before rendering.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let mut config = IronscanConfig::load(config_path).await?;
    redact_secrets(&mut config);

    let report = ConfigReport::build(config_path, &config, section)?;
    writer.render(&report)?;
    Ok(())
}

/// Replace every non-empty secret with [`REDACTED`].
fn redact_secrets(config: &mut IronscanConfig) {
    for secret in [
        &mut config.nessus.access_key,
        &mut config.nessus.secret_key,
        &mut config.nessus.password,
    ] {
        if !secret.is_empty() {
            *secret = REDACTED.to_owned();
        }
    }
}

/// Configuration display report.
///
/// Text output renders `config_toml`; JSON output carries `config`.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: serde_json::Value,
    #[serde(skip)]
    pub config_toml: String,
}

impl ConfigReport {
    fn build(
        config_path: &Path,
        config: &IronscanConfig,
        section: Option<String>,
    ) -> Result<Self, CliError> {
        let (value, config_toml) = match section.as_deref() {
            None => section_payload(config)?,
            Some("general") => section_payload(&config.general)?,
            Some("nessus") => section_payload(&config.nessus)?,
            Some("enumeration") => section_payload(&config.enumeration)?,
            Some(other) => {
                return Err(CliError::Command(format!(
                    "unknown section: {} (expected: {})",
                    other,
                    SECTIONS.join(", ")
                )));
            }
        };

        Ok(Self {
            source: config_path.display().to_string(),
            section,
            config: value,
            config_toml,
        })
    }
}

fn section_payload<T: Serialize>(section: &T) -> Result<(serde_json::Value, String), CliError> {
    let value = serde_json::to_value(section)?;
    let config_toml = toml::to_string_pretty(section)
        .unwrap_or_else(|e| format!("(serialization error: {})", e));
    Ok((value, config_toml))
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{}]", section).bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// empty when valid
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for error in &self.errors {
                writeln!(w, "  - {}", error)?;
            }
        }
        Ok(())
    }
}
