use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::ParseError;

const REQUIRED_COLUMNS: [&str; 3] = ["dstport", "protocol", "tag"];

#[derive(Debug, Deserialize)]
struct LookupRow {
    dstport: String,
    protocol: String,
    tag: String,
}

/// Read-only mapping from a `"port,protocol"` key to its tag.
///
/// Keys are built exactly the way the aggregator builds them from log
/// lines: the port token verbatim, the protocol lowercased. The two
/// construction paths must stay byte-identical for matching to work.
#[derive(Debug, Default)]
pub struct LookupTable {
    entries: HashMap<String, String>,
}

impl LookupTable {
    /// Loads the lookup table from a CSV file with a header row naming
    /// at least `dstport`, `protocol` and `tag` (case-sensitive).
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::MissingSource {
            kind: "lookup table",
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        debug!(
            "Loaded {} lookup entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Builds the table from any CSV source. Extra columns are
    /// tolerated; duplicate keys follow last-row-wins.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParseError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(ParseError::MalformedRow(column));
            }
        }

        let mut entries = HashMap::new();
        for row in csv_reader.deserialize::<LookupRow>() {
            let row = row?;
            let key = format!("{},{}", row.dstport, row.protocol.to_lowercase());
            entries.insert(key, row.tag);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
