//! Delimited-text dataset loading.
//!
//! The production dataset is a semicolon-separated file with one row per
//! region and month. This module turns it into a [`SeriesRepository`];
//! nothing downstream of it touches files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::calendar::parse_month_label;
use crate::error::LoadError;
use crate::repository::{Record, SeriesRepository};
use tracing::{debug, info};

/// Column layout of the source file.
#[derive(Debug, Clone)]
pub struct CsvSchema {
    /// Field delimiter
    pub delimiter: u8,
    /// Header of the region identifier column
    pub region_column: String,
    /// Header of the month label column
    pub month_column: String,
    /// Header of the consumption column
    pub value_column: String,
}

impl Default for CsvSchema {
    fn default() -> Self {
        Self {
            delimiter: b';',
            region_column: "Territoire".to_string(),
            month_column: "Mois".to_string(),
            value_column: "Consommation totale".to_string(),
        }
    }
}

/// Load a repository from a file on disk.
pub fn load_csv(path: impl AsRef<Path>, schema: &CsvSchema) -> Result<SeriesRepository, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let repo = read_csv(file, schema)?;
    info!(
        path = %path.display(),
        regions = repo.len(),
        "Loaded consumption dataset"
    );
    Ok(repo)
}

/// Load a repository from any reader producing delimited text.
pub fn read_csv<R: Read>(reader: R, schema: &CsvSchema) -> Result<SeriesRepository, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(schema.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    let region_idx = column(&schema.region_column)?;
    let month_idx = column(&schema.month_column)?;
    let value_idx = column(&schema.value_column)?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let region = row.get(region_idx).unwrap_or_default();
        let month_label = row.get(month_idx).unwrap_or_default();
        let value_label = row.get(value_idx).unwrap_or_default();

        let month = parse_month_label(month_label).ok_or_else(|| LoadError::InvalidMonth {
            line,
            value: month_label.to_string(),
        })?;
        let value = value_label
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LoadError::InvalidValue {
                line,
                value: value_label.to_string(),
            })?;

        records.push(Record::new(region, month, value));
    }

    debug!(rows = records.len(), "Parsed dataset rows");
    SeriesRepository::from_records(records)
}
