//! `ironscan plugin <id>` command handler

use std::io::Write;

use serde::Serialize;

use ironscan_core::config::IronscanConfig;
use ironscan_core::types::PluginRecord;

use crate::cli::PluginArgs;
use crate::commands::ScannerSession;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `plugin` command.
pub async fn execute(
    args: PluginArgs,
    config: &IronscanConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let session = ScannerSession::open(&config.nessus).await?;
    let result = session.client().plugin_details(args.id).await;
    session.close().await;

    let report = PluginReport {
        plugin: result?.into(),
    };
    writer.render(&report)?;
    Ok(())
}

/// Single plugin detail report.
#[derive(Serialize)]
#[serde(transparent)]
pub struct PluginReport {
    pub plugin: PluginRecord,
}

impl Render for PluginReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let plugin = &self.plugin;
        writeln!(w, "{} {}", format!("[{}]", plugin.id).bold(), plugin.name)?;
        writeln!(w, "  Family: {}", plugin.family_name)?;

        if plugin.attributes.is_empty() {
            return Ok(());
        }

        writeln!(w, "  Attributes:")?;
        let width = plugin
            .attributes
            .iter()
            .map(|a| a.name.len())
            .max()
            .unwrap_or(0);
        for attr in &plugin.attributes {
            // 여러 줄 값(description, solution 등)은 들여쓰기 유지
            let value = attr.value.replace('\n', &format!("\n    {:width$}  ", ""));
            writeln!(w, "    {:<width$}  {}", attr.name, value)?;
        }
        Ok(())
    }
}
