//! CSV input rows and CSV/JSON result export.

use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::TableError;
use crate::models::ground_truth::{parse_category, parse_flag, GroundTruthSize, StructuredGroundTruth};
use crate::pipeline::OutputRow;

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

pub const PATIENT_ID: &str = "patient_id";
pub const REPORT_TEXT: &str = "report_text";

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    PATIENT_ID,
    REPORT_TEXT,
    "structured_laterality",
    "structured_quadrant",
    "structured_finding",
    "structured_microcalcifications",
    "structured_size_mm",
];

/// Header positions of the required columns.
struct Columns([usize; 7]);

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let mut positions = [0; 7];
        let mut missing = Vec::new();

        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h.trim() == name) {
                Some(index) => *slot = index,
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self(positions))
        } else {
            Err(TableError::MissingColumns(missing))
        }
    }

    fn row(&self, record: &csv::StringRecord) -> StructuredGroundTruth {
        let cell = |i: usize| record.get(self.0[i]).unwrap_or("");

        StructuredGroundTruth {
            patient_id: cell(0).to_string(),
            report_text: cell(1).to_string(),
            laterality: parse_category(cell(2)),
            quadrant: parse_category(cell(3)),
            finding: parse_category(cell(4)),
            microcalcifications: parse_flag(cell(5)),
            size_mm: GroundTruthSize::from_cell(cell(6)),
        }
    }
}

/// Read input rows from CSV with a header row. Extra columns are ignored.
pub fn read_input_rows<R: Read>(reader: R) -> Result<Vec<StructuredGroundTruth>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let columns = Columns::locate(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        rows.push(columns.row(&record?));
    }

    debug!("Read {} input rows", rows.len());
    Ok(rows)
}

/// Read input rows from a CSV file.
pub fn read_input_file(path: &Path) -> Result<Vec<StructuredGroundTruth>> {
    let file = std::fs::File::open(path)?;
    read_input_rows(file)
}

/// Write result rows as CSV with a header row.
pub fn write_output_csv<W: Write>(writer: W, rows: &[OutputRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    if rows.is_empty() {
        wtr.write_record(OUTPUT_COLUMNS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write result rows as a pretty-printed JSON array.
pub fn write_output_json<W: Write>(mut writer: W, rows: &[OutputRow]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    Ok(())
}

/// Output header, in [`OutputRow`] field order.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    PATIENT_ID,
    "extracted_laterality",
    "extracted_quadrant",
    "extracted_finding",
    "extracted_microcalcifications",
    "extracted_size_mm",
    "mismatch_count",
    "mismatches",
    REPORT_TEXT,
    "error",
];
