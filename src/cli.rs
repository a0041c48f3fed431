//! CLI argument parsing for abverdict

use crate::classify::RowSignals;
use crate::stat_record::{CorrectionPolicy, MetricDescriptor, RowKind, StatRecord, StatsEngine};
use crate::tooltip::{LayoutX, VerticalAlign};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Output format for verdicts, reports and placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "abverdict")]
#[command(version)]
#[command(about = "Classify A/B test results and lay out their tooltips", long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// TOML file with classifier and tooltip settings
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a single metric/variation row
    Classify {
        /// JSON file describing the row
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Classify every row of an experiment snapshot
    Report {
        /// JSON file with the experiment definition
        #[arg(short, long, value_name = "FILE")]
        experiment: PathBuf,

        /// Directory laid out as experiment/{id}/snapshot/{phase}[/{dimension}].json
        #[arg(short, long, value_name = "DIR")]
        snapshots: PathBuf,

        /// Phase index (defaults to the most recent phase)
        #[arg(long, value_name = "N")]
        phase: Option<usize>,

        /// Dimension the snapshot is split by
        #[arg(long, value_name = "DIMENSION")]
        dimension: Option<String>,

        /// Dimension value to report on (defaults to the first one)
        #[arg(long = "value", value_name = "VALUE")]
        value: Option<String>,
    },

    /// Compute tooltip placement for an anchor point
    Place {
        /// Anchor x coordinate
        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        /// Anchor y coordinate
        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// Horizontal layout relative to the anchor
        #[arg(long, value_enum, default_value = "center")]
        layout: LayoutArg,

        /// Whether the popup opens below (top) or above (bottom) the anchor
        #[arg(long, value_enum, default_value = "top")]
        align: AlignArg,

        #[arg(long = "viewport-width", value_name = "PX")]
        viewport_width: f64,

        #[arg(long = "viewport-height", value_name = "PX", default_value = "800")]
        viewport_height: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Arrow centred under the anchor
    Center,
    /// Popup extends to the left of the anchor
    Left,
    /// Popup extends to the right of the anchor
    Right,
}

impl From<LayoutArg> for LayoutX {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Center => LayoutX::ElementCenter,
            LayoutArg::Left => LayoutX::ElementLeft,
            LayoutArg::Right => LayoutX::ElementRight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignArg {
    Top,
    Bottom,
}

impl From<AlignArg> for VerticalAlign {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Top => VerticalAlign::Top,
            AlignArg::Bottom => VerticalAlign::Bottom,
        }
    }
}

/// Row description read by `abverdict classify`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyInput {
    pub metric: MetricDescriptor,
    pub baseline: StatRecord,
    pub variation: StatRecord,
    #[serde(default)]
    pub engine: StatsEngine,
    #[serde(default)]
    pub correction: Option<CorrectionPolicy>,
    #[serde(default)]
    pub kind: RowKind,
    #[serde(default)]
    pub signals: RowSignals,
    #[serde(default = "default_baseline_name")]
    pub baseline_name: String,
    #[serde(default = "default_variation_name")]
    pub variation_name: String,
}

fn default_baseline_name() -> String {
    "Control".to_string()
}

fn default_variation_name() -> String {
    "Variation".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_classify() {
        let cli = Cli::parse_from(["abverdict", "classify", "--input", "row.json"]);
        assert_eq!(cli.format, OutputFormat::Text);
        match cli.command {
            Command::Classify { input } => assert_eq!(input, PathBuf::from("row.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "abverdict",
            "classify",
            "-i",
            "row.json",
            "--format",
            "json",
            "--debug",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::parse_from([
            "abverdict",
            "--config",
            "abverdict.toml",
            "classify",
            "-i",
            "row.json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("abverdict.toml")));
    }

    #[test]
    fn test_cli_report_defaults() {
        let cli = Cli::parse_from([
            "abverdict",
            "report",
            "--experiment",
            "exp.json",
            "--snapshots",
            "snapshots",
        ]);
        match cli.command {
            Command::Report {
                phase,
                dimension,
                value,
                ..
            } => {
                assert!(phase.is_none());
                assert!(dimension.is_none());
                assert!(value.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_place_layout() {
        let cli = Cli::parse_from([
            "abverdict",
            "place",
            "--x",
            "-20",
            "--y",
            "100",
            "--layout",
            "left",
            "--align",
            "bottom",
            "--viewport-width",
            "1280",
        ]);
        match cli.command {
            Command::Place {
                x,
                layout,
                align,
                viewport_height,
                ..
            } => {
                assert_eq!(x, -20.0);
                assert_eq!(LayoutX::from(layout), LayoutX::ElementLeft);
                assert_eq!(VerticalAlign::from(align), VerticalAlign::Bottom);
                assert_eq!(viewport_height, 800.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_classify_input_defaults() {
        let json = r#"{
            "metric": {"id": "signup", "name": "Signups"},
            "baseline": {"users": 1000},
            "variation": {"expected": 0.1, "users": 1000}
        }"#;
        let input: ClassifyInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.engine, StatsEngine::Bayesian);
        assert_eq!(input.kind, RowKind::Standard);
        assert!(input.correction.is_none());
        assert_eq!(input.baseline_name, "Control");
    }
}
