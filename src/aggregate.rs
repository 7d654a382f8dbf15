use std::collections::HashMap;
use std::io::BufRead;

use log::warn;

use crate::error::ParseError;
use crate::lookup::LookupTable;
use crate::protocol::ProtocolNameResolver;

/// Reserved tag for records whose port/protocol key has no lookup entry.
pub const UNTAGGED: &str = "untagged";

/// Key component for protocol numbers without an IANA keyword.
/// Capitalized so it can never equal a lowercased lookup protocol name,
/// which keeps such records out of every lookup entry.
const UNKNOWN_PROTOCOL: &str = "Unknown";

/// Flow log version this tool processes; other versions are skipped.
const SUPPORTED_VERSION: &str = "2";

/// How to treat a version-2 line that is too short or carries a
/// non-integer protocol field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Abort the run with the offending line number.
    Strict,
    /// Log a warning, skip the record, keep counting.
    Lenient,
}

/// Count table preserving first-seen insertion order, so the rendered
/// report is deterministic and mirrors the order of the input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// Returns the count for `key`, zero when the key was never seen.
    pub fn get(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map_or(0, |&position| self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The two frequency tables produced by one aggregation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlowCounts {
    pub tag_counts: CountTable,
    pub port_protocol_counts: CountTable,
    pub records_processed: u64,
    pub records_skipped: u64,
}

/// Streams flow-log lines and accumulates tag and port/protocol counts.
///
/// Lines whose version field is not "2" are skipped silently. For each
/// version-2 line the destination port (field 6, kept verbatim) and the
/// protocol number (field 7) form the key `"{port},{protocol-name}"`;
/// the port/protocol count is bumped unconditionally and the tag count
/// goes to the lookup hit or to "untagged".
pub fn aggregate<R: BufRead>(
    reader: R,
    lookup: &LookupTable,
    resolver: &mut ProtocolNameResolver,
    policy: MalformedPolicy,
) -> Result<FlowCounts, ParseError> {
    let mut counts = FlowCounts::default();

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_index as u64 + 1;

        let fields: Vec<&str> = line.split(' ').collect();
        if fields.first() != Some(&SUPPORTED_VERSION) {
            continue;
        }

        let (dst_port, protocol_field) = match (fields.get(6), fields.get(7)) {
            (Some(&port), Some(&protocol)) => (port, protocol),
            _ => {
                handle_malformed(policy, line_number, "fewer than 8 fields", &mut counts)?;
                continue;
            }
        };

        let protocol_number: u16 = match protocol_field.parse() {
            Ok(number) => number,
            Err(_) => {
                let reason = format!("protocol field '{}' is not an integer", protocol_field);
                handle_malformed(policy, line_number, &reason, &mut counts)?;
                continue;
            }
        };

        let protocol_name = resolver.resolve(protocol_number).unwrap_or(UNKNOWN_PROTOCOL);
        let key = format!("{},{}", dst_port, protocol_name);

        counts.port_protocol_counts.increment(&key);
        match lookup.get(&key) {
            Some(tag) => counts.tag_counts.increment(tag),
            None => counts.tag_counts.increment(UNTAGGED),
        }
        counts.records_processed += 1;
    }

    Ok(counts)
}

fn handle_malformed(
    policy: MalformedPolicy,
    line: u64,
    reason: &str,
    counts: &mut FlowCounts,
) -> Result<(), ParseError> {
    match policy {
        MalformedPolicy::Strict => Err(ParseError::MalformedRecord {
            line,
            reason: reason.to_string(),
        }),
        MalformedPolicy::Lenient => {
            warn!("Skipping malformed record at line {}: {}", line, reason);
            counts.records_skipped += 1;
            Ok(())
        }
    }
}
