//! Spreadsheet loader.
//!
//! The workbook is read into a RawTable first; all column resolution,
//! date parsing and numeric coercion happen in parse_table so the
//! rules can be exercised without a workbook on disk.
//!
//! RULES:
//!   - A missing column or an unparseable date fails the whole load.
//!   - A metric cell that is not a number becomes 0. Never an error.

use crate::{
    error::{DashError, DashResult},
    geo,
    record::{
        Dataset, Metric, Record, BANK_COLUMN, DATE_COLUMN, METRIC_COUNT, MUNICIPALITY_COLUMN,
        STATE_COLUMN,
    },
    rng::JitterRng,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// A single spreadsheet cell, independent of the workbook backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Excel serial date (days since 1899-12-30, fraction = time of day).
    DateTime(f64),
    Error,
}

impl From<&calamine::Data> for Cell {
    fn from(data: &calamine::Data) -> Self {
        use calamine::Data;
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::Error(_) => Cell::Error,
        }
    }
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Lenient numeric coercion: anything that is not a finite number is 0.
    pub fn to_number(&self) -> f64 {
        let value = match self {
            Cell::Int(i) => *i as f64,
            Cell::Float(f) | Cell::DateTime(f) => *f,
            Cell::Bool(b) => f64::from(u8::from(*b)),
            Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Cell::Empty | Cell::Error => 0.0,
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    /// Trimmed display text for categorical columns.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty | Cell::Error => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Float(f) | Cell::DateTime(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }

    /// Calendar date of this cell, if it holds one.
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::DateTime(serial) | Cell::Float(serial) => serial_to_date(*serial),
            Cell::Int(serial) => serial_to_date(*serial as f64),
            Cell::Text(s) => parse_date_text(s.trim()),
            Cell::Empty | Cell::Bool(_) | Cell::Error => None,
        }
    }
}

/// Excel serial number to date. Time-of-day is discarded.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    // 9999-12-31 is the last date Excel can represent.
    if !serial.is_finite() || !(0.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(chrono::Days::new(serial.floor() as u64))
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Sheet contents: trimmed header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table, trimming every header.
    pub fn new<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<Cell>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().trim().to_string()).collect(),
            rows,
        }
    }

    fn column(&self, name: &str) -> DashResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DashError::MissingColumn {
                column: name.to_string(),
            })
    }
}

/// Read one sheet of a workbook (xlsx, xls, xlsb or ods).
pub fn read_sheet(path: &Path, sheet_name: &str) -> DashResult<RawTable> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(DashError::SheetNotFound {
            name: sheet_name.to_string(),
        });
    }
    let range = workbook.worksheet_range(sheet_name)?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(DashError::EmptySheet)?;
    let headers: Vec<String> = header_row.iter().map(|c| Cell::from(c).to_text()).collect();
    let rows = rows
        .map(|row| row.iter().map(Cell::from).collect())
        .collect();

    Ok(RawTable::new(&headers, rows))
}

struct ColumnIndex {
    date: usize,
    state: usize,
    municipality: usize,
    bank: usize,
    metrics: [usize; METRIC_COUNT],
}

impl ColumnIndex {
    fn resolve(table: &RawTable) -> DashResult<Self> {
        let mut metrics = [0usize; METRIC_COUNT];
        for metric in Metric::ALL {
            metrics[metric as usize] = table.column(metric.header())?;
        }
        Ok(Self {
            date: table.column(DATE_COLUMN)?,
            state: table.column(STATE_COLUMN)?,
            municipality: table.column(MUNICIPALITY_COLUMN)?,
            bank: table.column(BANK_COLUMN)?,
            metrics,
        })
    }
}

/// Turn a raw table into records.
pub fn parse_table(table: &RawTable, jitter_std: f64, rng: &mut JitterRng) -> DashResult<Dataset> {
    static MISSING: Cell = Cell::Empty;

    let columns = ColumnIndex::resolve(table)?;
    let mut records = Vec::with_capacity(table.rows.len());

    for (i, row) in table.rows.iter().enumerate() {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or(&MISSING);

        // +1 for the header row, +1 for 1-based numbering.
        let sheet_row = i + 2;
        let date_cell = cell(columns.date);
        if date_cell.is_empty() {
            log::warn!("row {sheet_row} has no date; skipped");
            continue;
        }
        let date = date_cell.to_date().ok_or_else(|| DashError::InvalidDate {
            row: sheet_row,
            value: date_cell.to_text(),
        })?;

        let mut record = Record::new(
            date,
            cell(columns.state).to_text(),
            cell(columns.municipality).to_text(),
            cell(columns.bank).to_text(),
        );
        for metric in Metric::ALL {
            record.set_metric(metric, cell(columns.metrics[metric as usize]).to_number());
        }
        let (lat, lon) = geo::jittered(&record.state, jitter_std, rng);
        record.latitude = lat;
        record.longitude = lon;

        records.push(record);
    }

    Ok(Dataset::new(records))
}

/// Read and parse a sheet in one step.
pub fn load_dataset(
    path: &Path,
    sheet_name: &str,
    jitter_std: f64,
    jitter_seed: Option<u64>,
) -> DashResult<Dataset> {
    let table = read_sheet(path, sheet_name)?;
    let mut rng = JitterRng::from_option(jitter_seed);
    let dataset = parse_table(&table, jitter_std, &mut rng)?;
    log::info!(
        "loaded {} records from {} (sheet '{}')",
        dataset.len(),
        path.display(),
        sheet_name
    );
    Ok(dataset)
}
