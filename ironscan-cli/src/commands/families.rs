//! `ironscan families` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use ironscan_core::config::IronscanConfig;
use ironscan_core::types::FamilyRef;

use crate::commands::ScannerSession;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `families` command.
pub async fn execute(config: &IronscanConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let session = ScannerSession::open(&config.nessus).await?;
    let result = session.client().plugin_families().await;
    session.close().await;

    let families: Vec<FamilyRef> = result?.into_iter().map(FamilyRef::from).collect();
    info!(count = families.len(), "listed plugin families");

    writer.render(&FamiliesReport::new(families))?;
    Ok(())
}

/// Family listing report.
#[derive(Serialize)]
pub struct FamiliesReport {
    pub total_families: usize,
    pub total_plugins: u64,
    pub families: Vec<FamilyRef>,
}

impl FamiliesReport {
    pub fn new(mut families: Vec<FamilyRef>) -> Self {
        families.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            total_families: families.len(),
            total_plugins: families.iter().map(|f| f.count).sum(),
            families,
        }
    }
}

impl Render for FamiliesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{:<8} {:<10} {}", "ID".bold(), "PLUGINS".bold(), "NAME".bold())?;
        for family in &self.families {
            writeln!(w, "{:<8} {:<10} {}", family.id, family.count, family.name)?;
        }
        writeln!(w)?;
        writeln!(
            w,
            "{} families, {} plugins",
            self.total_families, self.total_plugins
        )?;
        Ok(())
    }
}
