//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Ironscan -- bulk enumeration of a Nessus plugin catalog.
///
/// Use `ironscan <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "ironscan", version, about, long_about = None)]
pub struct Cli {
    /// Path to the ironscan.toml configuration file.
    #[arg(short, long, default_value = "ironscan.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON (one object per line for streamed records).
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List plugin families.
    Families,

    /// Enumerate every plugin of every family.
    Plugins(PluginsArgs),

    /// Show the details of a single plugin.
    Plugin(PluginArgs),

    /// Show scanner status and properties.
    Server,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- plugins ----

/// Enumerate the whole plugin catalog.
#[derive(Args, Debug, Default)]
pub struct PluginsArgs {
    /// Number of concurrent plugin detail fetches.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Maximum concurrent family fetches (0 = unbounded).
    #[arg(long)]
    pub family_concurrency: Option<usize>,

    /// Stop after this many records.
    #[arg(long)]
    pub limit: Option<usize>,
}

// ---- plugin ----

#[derive(Args, Debug)]
pub struct PluginArgs {
    /// Plugin ID.
    pub id: i64,
}

// ---- config ----

/// Manage ironscan configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, nessus, enumeration).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_families_defaults() {
        let cli = Cli::try_parse_from(["ironscan", "families"]).expect("parse succeeded");
        assert!(matches!(cli.command, Commands::Families));
        assert_eq!(cli.config, PathBuf::from("ironscan.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_parse_plugins_with_overrides() {
        let cli = Cli::try_parse_from([
            "ironscan",
            "plugins",
            "--workers",
            "32",
            "--family-concurrency",
            "4",
            "--limit",
            "100",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Plugins(args) => {
                assert_eq!(args.workers, Some(32));
                assert_eq!(args.family_concurrency, Some(4));
                assert_eq!(args.limit, Some(100));
            }
            _ => panic!("expected Plugins command"),
        }
    }

    #[test]
    fn test_cli_parse_plugins_without_overrides() {
        let cli = Cli::try_parse_from(["ironscan", "plugins"]).expect("parse succeeded");
        match cli.command {
            Commands::Plugins(args) => {
                assert!(args.workers.is_none());
                assert!(args.family_concurrency.is_none());
                assert!(args.limit.is_none());
            }
            _ => panic!("expected Plugins command"),
        }
    }

    #[test]
    fn test_cli_parse_plugin_id() {
        let cli = Cli::try_parse_from(["ironscan", "plugin", "19506"]).expect("parse succeeded");
        match cli.command {
            Commands::Plugin(args) => assert_eq!(args.id, 19506),
            _ => panic!("expected Plugin command"),
        }
    }

    #[test]
    fn test_cli_parse_plugin_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["ironscan", "plugin", "abc"]).is_err());
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ironscan",
            "-c",
            "/etc/ironscan/ironscan.toml",
            "server",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert!(matches!(cli.command, Commands::Server));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, PathBuf::from("/etc/ironscan/ironscan.toml"));
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["ironscan", "config", "show", "--section", "nessus"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("nessus")),
            _ => panic!("expected Config Show command"),
        }
    }

    #[test]
    fn test_cli_parse_invalid_output_format() {
        assert!(Cli::try_parse_from(["ironscan", "families", "--output", "yaml"]).is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["ironscan"]).is_err());
    }
}
