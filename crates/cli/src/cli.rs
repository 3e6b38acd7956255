use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::output::OutputFormat;
use uidriver_protocol::options::{DEFAULT_HOST, DEFAULT_PORT, HOST_ENV_VAR, PORT_ENV_VAR};
use uidriver_protocol::ScreenshotFormat;

#[derive(Parser, Debug)]
#[command(name = "uidriver")]
#[command(about = "Remote-control debuggable GUI application windows from the command line")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
    pub format: CliOutputFormat,

    /// Discovery host (default: $UIDRIVER_HOST, then localhost)
    #[arg(long, global = true, value_name = "HOST")]
    pub host: Option<String>,

    /// Discovery port (default: $UIDRIVER_PORT, then 9222)
    #[arg(long, global = true, value_name = "PORT")]
    pub port: Option<u16>,

    /// Per-request deadline in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolves the discovery endpoint: flag, then environment, then
    /// the built-in default.
    pub fn endpoint(&self) -> (String, u16) {
        let host = self
            .host
            .clone()
            .or_else(|| std::env::var(HOST_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = self
            .port
            .or_else(|| std::env::var(PORT_ENV_VAR).ok()?.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        (host, port)
    }
}

/// CLI output format (clap-compatible enum)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CliOutputFormat {
    /// JSON output (default, best for agents)
    #[default]
    Json,
    /// Newline-delimited JSON (streaming)
    Ndjson,
    /// Human-readable text
    Text,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Ndjson => OutputFormat::Ndjson,
            CliOutputFormat::Text => OutputFormat::Text,
        }
    }
}

/// Screenshot encoding (clap-compatible enum)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CliScreenshotFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl From<CliScreenshotFormat> for ScreenshotFormat {
    fn from(format: CliScreenshotFormat) -> Self {
        match format {
            CliScreenshotFormat::Png => ScreenshotFormat::Png,
            CliScreenshotFormat::Jpeg => ScreenshotFormat::Jpeg,
            CliScreenshotFormat::Webp => ScreenshotFormat::Webp,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discoverable targets
    #[command(alias = "ls")]
    Targets,

    /// Open a session with a target (first page target when omitted)
    Connect {
        /// Target id from `uidriver targets`
        target_id: Option<String>,
    },

    /// Fetch the full document tree of the connected target
    #[command(alias = "dom")]
    Document,

    /// Resolve the first node matching a selector
    #[command(alias = "q")]
    Query {
        /// CSS selector
        selector: String,
    },

    /// Resolve every node matching a selector
    QueryAll {
        /// CSS selector
        selector: String,
    },

    /// Show an element's attributes
    #[command(alias = "attrs")]
    Attributes {
        /// Node id from a previous query
        node_id: i64,
    },

    /// Show an element's outer HTML
    Html {
        /// Node id from a previous query
        node_id: i64,
    },

    /// Evaluate a script expression inside the target
    Eval {
        /// Expression to evaluate
        expression: String,
    },

    /// Capture the target's visual output
    #[command(alias = "ss")]
    Screenshot {
        /// Image format
        #[arg(long, value_enum, default_value = "png")]
        format: CliScreenshotFormat,

        /// Compression quality 0-100 (lossy formats only)
        #[arg(long)]
        quality: Option<u8>,

        /// Decode the payload and write it to a file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Targets => "targets",
            Commands::Connect { .. } => "connect",
            Commands::Document => "document",
            Commands::Query { .. } => "query",
            Commands::QueryAll { .. } => "query-all",
            Commands::Attributes { .. } => "attributes",
            Commands::Html { .. } => "html",
            Commands::Eval { .. } => "eval",
            Commands::Screenshot { .. } => "screenshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_command() {
        let cli = Cli::try_parse_from(["uidriver", "query", "#app"]).unwrap();
        match cli.command {
            Commands::Query { selector } => assert_eq!(selector, "#app"),
            _ => panic!("expected Query command"),
        }
    }

    #[test]
    fn parse_eval_with_endpoint_overrides() {
        let cli = Cli::try_parse_from([
            "uidriver",
            "--host",
            "10.0.0.5",
            "--port",
            "9229",
            "eval",
            "document.title",
        ])
        .unwrap();
        let (host, port) = cli.endpoint();
        assert_eq!(host, "10.0.0.5");
        assert_eq!(port, 9229);
        match cli.command {
            Commands::Eval { expression } => assert_eq!(expression, "document.title"),
            _ => panic!("expected Eval command"),
        }
    }

    #[test]
    fn parse_screenshot_command() {
        let cli = Cli::try_parse_from([
            "uidriver",
            "screenshot",
            "--format",
            "jpeg",
            "--quality",
            "80",
            "-o",
            "/tmp/shot.jpg",
        ])
        .unwrap();
        match cli.command {
            Commands::Screenshot {
                format,
                quality,
                output,
            } => {
                assert_eq!(format, CliScreenshotFormat::Jpeg);
                assert_eq!(quality, Some(80));
                assert_eq!(output, Some(PathBuf::from("/tmp/shot.jpg")));
            }
            _ => panic!("expected Screenshot command"),
        }
    }

    #[test]
    fn aliases_resolve() {
        assert!(matches!(
            Cli::try_parse_from(["uidriver", "ls"]).unwrap().command,
            Commands::Targets
        ));
        assert!(matches!(
            Cli::try_parse_from(["uidriver", "dom"]).unwrap().command,
            Commands::Document
        ));
        assert!(matches!(
            Cli::try_parse_from(["uidriver", "attrs", "7"])
                .unwrap()
                .command,
            Commands::Attributes { node_id: 7 }
        ));
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::try_parse_from(["uidriver", "-vv", "targets"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn invalid_command_fails() {
        assert!(Cli::try_parse_from(["uidriver", "frobnicate"]).is_err());
    }

    #[test]
    fn command_names_match_subcommands() {
        assert_eq!(
            Cli::try_parse_from(["uidriver", "query-all", "button"])
                .unwrap()
                .command
                .name(),
            "query-all"
        );
        assert_eq!(
            Cli::try_parse_from(["uidriver", "targets"])
                .unwrap()
                .command
                .name(),
            "targets"
        );
    }
}
