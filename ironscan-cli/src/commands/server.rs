//! `ironscan server` command handler

use std::io::Write;

use serde::Serialize;

use ironscan_core::config::IronscanConfig;
use ironscan_nessus::{ServerProperties, ServerStatus};

use crate::commands::ScannerSession;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `server` command.
///
/// Properties are only requested once the scanner reports `ready`.
pub async fn execute(config: &IronscanConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let session = ScannerSession::open(&config.nessus).await?;
    let client = session.client();

    let result = async {
        let status = client.server_status().await?;
        let properties = if status.status == "ready" {
            Some(client.server_properties().await?)
        } else {
            None
        };
        Ok::<_, CliError>(ServerReport {
            api_url: client.base_url().to_string(),
            status,
            properties,
        })
    }
    .await;
    session.close().await;

    writer.render(&result?)?;
    Ok(())
}

/// Scanner status report.
#[derive(Serialize)]
pub struct ServerReport {
    pub api_url: String,
    pub status: ServerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ServerProperties>,
}

impl Render for ServerReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let status = if self.status.status == "ready" {
            self.status.status.green().bold()
        } else {
            self.status.status.yellow().bold()
        };
        writeln!(w, "Scanner: {}", self.api_url.bold())?;
        match self.status.progress {
            Some(progress) => writeln!(w, "  Status:   {} ({}%)", status, progress)?,
            None => writeln!(w, "  Status:   {}", status)?,
        }

        if let Some(props) = &self.properties {
            writeln!(
                w,
                "  Version:  {} (build {}, ui {})",
                props.server_version, props.server_build, props.nessus_ui_version
            )?;
            writeln!(w, "  Type:     {}", props.nessus_type)?;
            writeln!(w, "  Platform: {}", props.platform)?;
            writeln!(w, "  Feed:     {}", props.feed)?;
            writeln!(w, "  Plugins:  {}", props.loaded_plugin_set)?;
        }
        Ok(())
    }
}
