use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::debug;

use crate::aggregate::FlowCounts;
use crate::error::ParseError;

/// Serializes the two count tables as a two-section plain-text report.
/// Entries appear in table iteration order; no sorting is applied.
pub fn render<W: Write>(counts: &FlowCounts, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Tag Counts:")?;
    writeln!(writer, "Tag,Count")?;
    for (tag, count) in counts.tag_counts.iter() {
        writeln!(writer, "{},{}", tag, count)?;
    }

    writeln!(writer, "Port/Protocol Combination Counts:")?;
    writeln!(writer, "Port,Protocol,Count")?;
    for (key, count) in counts.port_protocol_counts.iter() {
        // The key is already "port,protocol", so this is plain interpolation.
        writeln!(writer, "{},{}", key, count)?;
    }

    Ok(())
}

/// Report file name carrying the run's wall-clock timestamp.
pub fn report_file_name(timestamp: DateTime<Local>) -> String {
    format!("output_{}.txt", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Writes the report into `output_dir` as `output_<YYYYMMDD_HHMMSS>.txt`.
///
/// The report is rendered in memory and written to a temp sibling that
/// is renamed into place, so a failure never leaves a partial report.
pub fn write_report(output_dir: &Path, counts: &FlowCounts) -> Result<PathBuf, ParseError> {
    let path = output_dir.join(report_file_name(Local::now()));

    let mut rendered = Vec::new();
    render(counts, &mut rendered)?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &rendered)?;
    fs::rename(&temp_path, &path)?;

    debug!("Report written to {}", path.display());
    Ok(path)
}
