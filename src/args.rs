use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// The path to the flow log file (space-delimited, one record per line)
    #[clap(long = "flow_log_file")]
    pub flow_log_file: PathBuf,

    /// The path to the CSV lookup table mapping port/protocol pairs to tags
    #[clap(long = "lookup_table_csv")]
    pub lookup_table_csv: PathBuf,

    /// Existing directory into which the report file is written
    #[clap(long = "output_path")]
    pub output_path: PathBuf,

    /// Skip malformed version-2 records instead of aborting the run
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub lenient: bool,

    /// Optional configuration file with parser defaults
    #[clap(long = "config_file")]
    pub config_file: Option<PathBuf>,
}

/// Parser defaults loadable from a configuration file.
/// Explicit CLI flags take precedence over these values.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Skip malformed version-2 records instead of aborting the run
    pub lenient: bool,
}
