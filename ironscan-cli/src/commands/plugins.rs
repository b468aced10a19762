//! `ironscan plugins` command handler
//!
//! Streams every plugin record of the remote catalog as it is fetched.
//! JSON output is one record per line, followed by a summary line.

use std::io::Write;

use serde::Serialize;
use tracing::{info, warn};

use ironscan_core::config::IronscanConfig;
use ironscan_core::types::PluginRecord;
use ironscan_enumerator::{EnumeratorConfig, PluginEnumerator, PluginStream, StatsSnapshot};

use crate::cli::PluginsArgs;
use crate::commands::ScannerSession;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `plugins` command.
pub async fn execute(
    args: PluginsArgs,
    config: &IronscanConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if args.limit == Some(0) {
        return Err(CliError::Command("--limit must be greater than 0".to_owned()));
    }
    let enumerator_config = enumerator_config(&args, config);

    let session = ScannerSession::open(&config.nessus).await?;
    let result = async {
        let enumerator = PluginEnumerator::with_catalog(session.client(), enumerator_config)?;
        let stream = enumerator.enumerate().await?;
        stream_records(stream, args.limit, writer).await
    }
    .await;
    session.close().await;

    let summary = result?;
    writer.render_line(&summary)?;
    Ok(())
}

/// Merge command-line overrides into the `[enumeration]` section.
fn enumerator_config(args: &PluginsArgs, config: &IronscanConfig) -> EnumeratorConfig {
    let mut enumerator_config = EnumeratorConfig::from_core(&config.enumeration);
    if let Some(workers) = args.workers {
        enumerator_config.workers = workers;
    }
    if let Some(limit) = args.family_concurrency {
        enumerator_config.family_concurrency = limit;
    }
    enumerator_config
}

async fn stream_records(
    mut stream: PluginStream,
    limit: Option<usize>,
    writer: &OutputWriter,
) -> Result<EnumerationSummary, CliError> {
    let mut emitted = 0usize;
    let mut outcome = RunOutcome::Complete;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let record = tokio::select! {
            record = stream.recv() => record,
            _ = &mut ctrl_c => {
                warn!(run_id = %stream.run_id(), "interrupted, cancelling enumeration");
                outcome = RunOutcome::Interrupted;
                None
            }
        };
        let Some(record) = record else {
            break;
        };

        writer.render_line(&record)?;
        emitted += 1;

        if limit.is_some_and(|limit| emitted >= limit) {
            info!(limit = emitted, "plugin limit reached, cancelling enumeration");
            outcome = RunOutcome::LimitReached;
            break;
        }
    }

    let run_id = stream.run_id().to_owned();
    let stats = stream.finish().await;
    Ok(EnumerationSummary {
        run_id,
        emitted,
        outcome,
        stats,
    })
}

impl Render for PluginRecord {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}\t{}\t{}", self.id, self.family_name, self.name)
    }
}

/// How the record loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// the stream ended on its own
    Complete,
    /// `--limit` records were printed; the catalog may hold more
    LimitReached,
    /// Ctrl-C
    Interrupted,
}

/// Trailing summary of one enumeration run.
#[derive(Debug, Serialize)]
pub struct EnumerationSummary {
    pub run_id: String,
    pub emitted: usize,
    pub outcome: RunOutcome,
    pub stats: StatsSnapshot,
}

impl Render for EnumerationSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let state = match self.outcome {
            RunOutcome::Complete => "complete".green(),
            RunOutcome::LimitReached => "limit reached".yellow(),
            RunOutcome::Interrupted => "interrupted".red(),
        };
        writeln!(w)?;
        writeln!(
            w,
            "{} plugins emitted ({}), run {}",
            self.emitted, state, self.run_id
        )?;
        writeln!(
            w,
            "  families: {} listed, {} failed",
            self.stats.families_listed, self.stats.families_failed
        )?;
        writeln!(
            w,
            "  plugins:  {} queued, {} failed",
            self.stats.plugins_queued, self.stats.plugins_failed
        )?;
        Ok(())
    }
}
