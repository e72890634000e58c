//! CLI argument definitions for the `rates` tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use rates_map::{ConfidenceThresholds, DuplicatePolicy, MatchOptions, SimilarityAlgorithm};

#[derive(Parser)]
#[command(
    name = "rates",
    version,
    about = "Classify composite rate catalogs against the NRM1/NRM2 crosswalk",
    long_about = "Classify composite construction rates against the NRM1 level-4 to NRM2 \
                  work-section crosswalk.\n\n\
                  Rates are enriched in place, stamped with the crosswalk fingerprint, and \
                  summarised in an optional Markdown QA report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Enrich every `group_*.json` catalog in a directory.
    Enrich(EnrichArgs),

    /// Load a crosswalk and list its level-2 groups.
    Crosswalk(CrosswalkArgs),

    /// Show every candidate score for one rate.
    Explain(ExplainArgs),
}

#[derive(Parser)]
pub struct EnrichArgs {
    /// Directory holding the rate catalogs.
    #[arg(value_name = "RATES_DIR")]
    pub rates_dir: PathBuf,

    /// Crosswalk CSV (one row per level-4 element).
    #[arg(long = "crosswalk", value_name = "CSV")]
    pub crosswalk: PathBuf,

    /// TOML file with manual overrides and hint routes.
    #[arg(long = "overrides", value_name = "TOML")]
    pub overrides: Option<PathBuf>,

    /// Write the Markdown QA report here.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Classify and report without rewriting catalogs.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Score rates on all cores.
    #[arg(long = "parallel")]
    pub parallel: bool,

    #[command(flatten)]
    pub matching: MatchArgs,
}

#[derive(Parser)]
pub struct CrosswalkArgs {
    /// Crosswalk CSV to inspect.
    #[arg(value_name = "CSV")]
    pub crosswalk: PathBuf,

    /// How to treat a level-4 code listed twice.
    #[arg(long = "duplicates", value_enum, default_value = "reject")]
    pub duplicates: DuplicatesArg,
}

#[derive(Parser)]
pub struct ExplainArgs {
    #[arg(value_name = "RATES_DIR")]
    pub rates_dir: PathBuf,

    #[arg(long = "crosswalk", value_name = "CSV")]
    pub crosswalk: PathBuf,

    /// Rate code to explain.
    #[arg(long = "code")]
    pub code: String,

    #[arg(long = "overrides", value_name = "TOML")]
    pub overrides: Option<PathBuf>,

    #[command(flatten)]
    pub matching: MatchArgs,
}

/// Scoring knobs shared by `enrich` and `explain`.
#[derive(Args)]
pub struct MatchArgs {
    /// Description similarity measure.
    #[arg(long = "similarity", value_enum, default_value = "indel")]
    pub similarity: SimilarityArg,

    /// Named confidence threshold set.
    #[arg(long = "thresholds", value_enum, default_value = "default")]
    pub thresholds: ThresholdPreset,

    /// Minimum total score for High (overrides the preset).
    #[arg(long = "high", value_name = "SCORE")]
    pub high: Option<f64>,

    /// Minimum total score for Medium (overrides the preset).
    #[arg(long = "medium", value_name = "SCORE")]
    pub medium: Option<f64>,

    /// How to treat a level-4 code listed twice.
    #[arg(long = "duplicates", value_enum, default_value = "reject")]
    pub duplicates: DuplicatesArg,
}

impl MatchArgs {
    pub fn options(&self) -> MatchOptions {
        let mut thresholds = match self.thresholds {
            ThresholdPreset::Default => ConfidenceThresholds::default(),
            ThresholdPreset::Strict => ConfidenceThresholds::strict(),
            ThresholdPreset::Relaxed => ConfidenceThresholds::relaxed(),
        };
        if let Some(high) = self.high {
            thresholds.high = high;
        }
        if let Some(medium) = self.medium {
            thresholds.medium = medium;
        }
        MatchOptions::default()
            .with_thresholds(thresholds)
            .with_similarity(self.similarity.into())
            .with_duplicates(self.duplicates.into())
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SimilarityArg {
    Indel,
    JaroWinkler,
}

impl From<SimilarityArg> for SimilarityAlgorithm {
    fn from(value: SimilarityArg) -> Self {
        match value {
            SimilarityArg::Indel => SimilarityAlgorithm::Indel,
            SimilarityArg::JaroWinkler => SimilarityAlgorithm::JaroWinkler,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThresholdPreset {
    Default,
    Strict,
    Relaxed,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DuplicatesArg {
    Reject,
    LastWriteWins,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(value: DuplicatesArg) -> Self {
        match value {
            DuplicatesArg::Reject => DuplicatePolicy::Reject,
            DuplicatesArg::LastWriteWins => DuplicatePolicy::LastWriteWins,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
