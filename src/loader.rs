//! Reads a POS transaction export into typed [`TransactionLine`] rows.
//!
//! The header row is resolved into a [`Schema`] exactly once; every data row
//! is then read by column index. Delimited text is read through `csv`, with
//! paths ending in `.gz` decompressed on the fly. Spreadsheet exports
//! (`.xlsx`, `.xls`, `.ods`...) are read from their first sheet and go through
//! the same schema.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::errors::LoadError;
use crate::transaction::TransactionLine;

/// Normalized header names every export must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "pos_name",
    "tran_no",
    "item_name",
    "qty",
    "rate",
    "item_total",
    "tran_date",
];

const BARCODE_COLUMN: &str = "barcode";

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Reader settings for the export file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pos_name: usize,
    tran_no: usize,
    item_name: usize,
    qty: usize,
    rate: usize,
    item_total: usize,
    tran_date: usize,
    barcode: Option<usize>,
}

impl Schema {
    /// Resolves required columns by normalized name, reporting all absent
    /// columns at once.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        // Every lookup below succeeds: the missing list was empty.
        let idx = |wanted: &str| find(wanted).unwrap_or_default();
        Ok(Self {
            pos_name: idx("pos_name"),
            tran_no: idx("tran_no"),
            item_name: idx("item_name"),
            qty: idx("qty"),
            rate: idx("rate"),
            item_total: idx("item_total"),
            tran_date: idx("tran_date"),
            barcode: find(BARCODE_COLUMN),
        })
    }

    fn read_line(
        &self,
        row: usize,
        record: &StringRecord,
        delimiter: u8,
    ) -> Result<TransactionLine, LoadError> {
        let cell = |i: usize| record.get(i).unwrap_or("").to_string();
        let key = |i: usize, column: &'static str| {
            let value = cell(i);
            if value.is_empty() {
                return Err(LoadError::EmptyValue { row, column });
            }
            Ok(value)
        };
        let number = |i: usize, column| parse_number(record.get(i), row, column, delimiter);

        Ok(TransactionLine {
            row,
            terminal: key(self.pos_name, "pos_name")?,
            bill_no: key(self.tran_no, "tran_no")?,
            item_name: key(self.item_name, "item_name")?,
            barcode: self.barcode.map(cell).filter(|b| !b.is_empty()),
            qty: number(self.qty, "qty")?,
            rate: number(self.rate, "rate")?,
            line_total: number(self.item_total, "item_total")?,
            timestamp: cell(self.tran_date),
        })
    }
}

/// Trims, lowercases and snake-cases a header name (`" Item Name"` -> `item_name`).
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Parses a numeric cell into a finite number.
///
/// In comma-delimited files a comma inside a quoted cell can only be a
/// thousands separator, so it is dropped. With any other delimiter the cell is
/// parsed as written and `1,5` is rejected rather than guessed at.
fn parse_number(
    cell: Option<&str>,
    row: usize,
    column: &'static str,
    delimiter: u8,
) -> Result<f64, LoadError> {
    let raw = cell.unwrap_or("");
    let parsed = if delimiter == b',' {
        raw.replace(',', "").parse::<f64>()
    } else {
        raw.parse::<f64>()
    };

    parsed
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LoadError::InvalidValue {
            row,
            column,
            value: raw.to_string(),
        })
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Loads transaction lines from a file on disk.
///
/// # Errors
///
/// Returns [`LoadError`] if the file is missing, unreadable, lacks a required
/// column, has a blank terminal, bill number or item name, or contains a
/// non-numeric quantity, rate or total.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Vec<TransactionLine>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    if is_workbook(path) {
        debug!("Opening workbook");
        let lines = load_workbook(open_workbook_auto(path)?)?;
        info!(lines = lines.len(), "Export loaded");
        return Ok(lines);
    }

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(gzipped, "Opened export");

    let lines = if gzipped {
        load_reader(GzDecoder::new(file), options)?
    } else {
        load_reader(file, options)?
    };

    info!(lines = lines.len(), "Export loaded");
    Ok(lines)
}

/// Loads transaction lines from any reader producing delimited text.
pub fn load_reader<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<Vec<TransactionLine>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let records = rdr.records().map(|r| r.map_err(LoadError::from));
    read_records(&headers, records, options.delimiter)
}

/// Loads transaction lines from the first sheet of an opened workbook.
pub fn load_workbook<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
) -> Result<Vec<TransactionLine>, LoadError> {
    let range = workbook.worksheet_range_at(0).ok_or(LoadError::NoSheets)??;
    read_range(&range)
}

fn read_range(range: &Range<Data>) -> Result<Vec<TransactionLine>, LoadError> {
    let mut rows = range
        .rows()
        .map(|cells| cells.iter().map(cell_text).collect::<StringRecord>());
    let headers = rows.next().unwrap_or_else(StringRecord::new);
    // Text cells such as `1,200.50` follow the comma-delimited rules.
    read_records(&headers, rows.map(Ok), b',')
}

/// Renders a spreadsheet cell the way it would appear in a CSV export.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        other => other.to_string(),
    }
}

fn read_records<I>(
    headers: &StringRecord,
    records: I,
    delimiter: u8,
) -> Result<Vec<TransactionLine>, LoadError>
where
    I: IntoIterator<Item = Result<StringRecord, LoadError>>,
{
    let schema = Schema::from_headers(headers)?;

    let mut lines = Vec::new();
    for (idx, result) in records.into_iter().enumerate() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        lines.push(schema.read_line(idx + 1, &record, delimiter)?);
    }

    Ok(lines)
}
