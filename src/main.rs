mod aggregate;
mod args;
mod error;
mod lookup;
mod protocol;
mod report;
mod tests;

use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use anyhow::Context;
use args::{Cli, ConfigFile};
use clap::Parser;
use log::{error, info};

use crate::aggregate::{aggregate, MalformedPolicy};
use crate::error::ParseError;
use crate::lookup::LookupTable;
use crate::protocol::ProtocolNameResolver;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // A config file supplies parser defaults; explicit CLI flags win.
    let lenient = match &cli.config_file {
        Some(config_path) => {
            let config: ConfigFile = confy::load_path(config_path).with_context(|| {
                format!("error loading configuration file {}", config_path.display())
            })?;
            cli.lenient || config.lenient
        }
        None => cli.lenient,
    };
    let policy = if lenient {
        MalformedPolicy::Lenient
    } else {
        MalformedPolicy::Strict
    };

    let start = Instant::now();

    let lookup = LookupTable::load(&cli.lookup_table_csv)?;

    let flow_log = File::open(&cli.flow_log_file).map_err(|source| ParseError::MissingSource {
        kind: "flow log",
        path: cli.flow_log_file.clone(),
        source,
    })?;

    let mut resolver = ProtocolNameResolver::new();
    let counts = aggregate(BufReader::new(flow_log), &lookup, &mut resolver, policy)?;

    let report_path = report::write_report(&cli.output_path, &counts)
        .with_context(|| format!("failed to write report to {}", cli.output_path.display()))?;

    info!(
        "Processed {} version-2 records ({} skipped): {} tags, {} port/protocol pairs",
        counts.records_processed,
        counts.records_skipped,
        counts.tag_counts.len(),
        counts.port_protocol_counts.len()
    );
    info!("Report written to {}", report_path.display());
    info!(
        "Duration: {:.4} seconds",
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
