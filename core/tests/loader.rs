use desembolso_core::{
    loader::{parse_table, read_sheet, Cell, RawTable},
    record::{BANK_COLUMN, DATE_COLUMN, MUNICIPALITY_COLUMN, STATE_COLUMN},
    rng::JitterRng,
    DashError, Metric,
};
use chrono::NaiveDate;
use std::path::Path;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn headers() -> Vec<String> {
    let mut h = vec![
        DATE_COLUMN.to_string(),
        STATE_COLUMN.to_string(),
        MUNICIPALITY_COLUMN.to_string(),
        BANK_COLUMN.to_string(),
    ];
    h.extend(Metric::ALL.iter().map(|m| m.header().to_string()));
    h
}

/// A data row: date, state, municipality, bank, then the 11 metrics
/// (credit first, the rest zero unless overridden).
fn row(date: &str, state: &str, municipality: &str, bank: &str, credit: Cell) -> Vec<Cell> {
    let mut r = vec![
        Cell::Text(date.into()),
        Cell::Text(state.into()),
        Cell::Text(municipality.into()),
        Cell::Text(bank.into()),
        credit,
    ];
    r.extend((1..Metric::ALL.len()).map(|_| Cell::Int(0)));
    r
}

fn table(rows: Vec<Vec<Cell>>) -> RawTable {
    RawTable::new(&headers(), rows)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Headers with stray whitespace still resolve after trimming.
#[test]
fn padded_headers_are_trimmed() {
    let padded: Vec<String> = headers().into_iter().map(|h| format!("  {h}\t")).collect();
    let raw = RawTable::new(
        &padded,
        vec![row("2024-01-15", "BA", "Salvador", "BancoX", Cell::Int(100))],
    );
    let mut rng = JitterRng::seeded(1);
    let dataset = parse_table(&raw, 0.1, &mut rng).expect("trimmed headers resolve");
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records()[0].metric(Metric::TotalCredit), 100.0);
}

/// "N/A" in the credit column is coerced to 0 and does not fail the load.
#[test]
fn non_numeric_metric_becomes_zero() {
    let raw = table(vec![
        row("2024-01-15", "BA", "Salvador", "BancoX", Cell::Text("N/A".into())),
        row("2024-01-16", "BA", "Salvador", "BancoX", Cell::Float(250.5)),
        row("2024-01-17", "BA", "Salvador", "BancoX", Cell::Empty),
    ]);
    let mut rng = JitterRng::seeded(1);
    let dataset = parse_table(&raw, 0.1, &mut rng).unwrap();

    let credits: Vec<f64> = dataset
        .records()
        .iter()
        .map(|r| r.metric(Metric::TotalCredit))
        .collect();
    assert_eq!(credits, vec![0.0, 250.5, 0.0]);
}

/// A renamed column fails the load with the missing header named.
#[test]
fn missing_column_fails_load() {
    let mut h = headers();
    h.retain(|c| c != Metric::CurrencyTrust.header());
    let raw = RawTable::new(&h, Vec::new());
    let mut rng = JitterRng::seeded(1);

    match parse_table(&raw, 0.1, &mut rng) {
        Err(DashError::MissingColumn { column }) => {
            assert_eq!(column, Metric::CurrencyTrust.header())
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

/// One malformed date anywhere fails the whole load; there is no partial dataset.
#[test]
fn malformed_date_fails_whole_load() {
    let raw = table(vec![
        row("2024-01-15", "BA", "Salvador", "BancoX", Cell::Int(1)),
        row("not a date", "BA", "Salvador", "BancoX", Cell::Int(1)),
    ]);
    let mut rng = JitterRng::seeded(1);

    match parse_table(&raw, 0.1, &mut rng) {
        Err(DashError::InvalidDate { row, value }) => {
            assert_eq!(row, 3, "header is row 1, bad record is row 3");
            assert_eq!(value, "not a date");
        }
        other => panic!("expected InvalidDate, got {other:?}"),
    }
}

/// A row whose date cell is blank is dropped; the rest of the sheet loads.
#[test]
fn blank_date_row_is_skipped() {
    let mut blank = row("", "BA", "Salvador", "BancoX", Cell::Int(5));
    blank[0] = Cell::Empty;
    let raw = table(vec![
        row("2024-01-15", "BA", "Salvador", "BancoX", Cell::Int(100)),
        blank,
        row("   ", "CE", "Fortaleza", "BancoY", Cell::Int(7)),
    ]);
    let mut rng = JitterRng::seeded(1);
    let dataset = parse_table(&raw, 0.1, &mut rng).expect("blank dates do not fail the load");

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records()[0].metric(Metric::TotalCredit), 100.0);
    let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(dataset.date_bounds(), Some((day, day)));
}

/// Native spreadsheet dates and text dates land on the same calendar day.
#[test]
fn serial_and_text_dates_agree() {
    let mut serial = row("", "BA", "Salvador", "BancoX", Cell::Int(0));
    serial[0] = Cell::DateTime(45306.0);
    let raw = table(vec![
        serial,
        row("2024-01-15", "BA", "Salvador", "BancoX", Cell::Int(0)),
    ]);
    let mut rng = JitterRng::seeded(1);
    let dataset = parse_table(&raw, 0.1, &mut rng).unwrap();

    let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert!(dataset.records().iter().all(|r| r.date == expected));
}

/// Blank rows at the end of a sheet are skipped rather than failing on the date.
#[test]
fn blank_rows_are_skipped() {
    let blank: Vec<Cell> = headers().iter().map(|_| Cell::Empty).collect();
    let raw = table(vec![
        row("2024-01-15", "BA", "Salvador", "BancoX", Cell::Int(1)),
        blank,
    ]);
    let mut rng = JitterRng::seeded(1);
    assert_eq!(parse_table(&raw, 0.1, &mut rng).unwrap().len(), 1);
}

/// Known states sit near their centroid (lookup is case-insensitive);
/// unknown states sit near the origin.
#[test]
fn coordinates_follow_state_centroids() {
    let raw = table(vec![
        row("2024-01-15", "ba", "Salvador", "BancoX", Cell::Int(0)),
        row("2024-01-15", "ZZ", "Lugar", "BancoY", Cell::Int(0)),
    ]);
    let mut rng = JitterRng::seeded(42);
    let dataset = parse_table(&raw, 0.1, &mut rng).unwrap();
    let [ba, unknown] = dataset.records() else {
        panic!("expected two records");
    };

    assert!((ba.latitude - -12.9777).abs() < 1.0);
    assert!((ba.longitude - -38.5016).abs() < 1.0);
    assert!(unknown.latitude.abs() < 1.0);
    assert!(unknown.longitude.abs() < 1.0);
}

/// Noise on unknown states averages out to the origin.
#[test]
fn unknown_state_jitter_has_zero_mean() {
    let rows: Vec<Vec<Cell>> = (0..5000)
        .map(|_| row("2024-01-15", "??", "Lugar", "BancoY", Cell::Int(0)))
        .collect();
    let mut rng = JitterRng::seeded(2024);
    let dataset = parse_table(&table(rows), 0.1, &mut rng).unwrap();

    let n = dataset.len() as f64;
    let mean_lat = dataset.records().iter().map(|r| r.latitude).sum::<f64>() / n;
    let mean_lon = dataset.records().iter().map(|r| r.longitude).sum::<f64>() / n;
    assert!(mean_lat.abs() < 0.01, "latitude mean {mean_lat}");
    assert!(mean_lon.abs() < 0.01, "longitude mean {mean_lon}");
}

/// Same seed → same marker positions; zero std → exact centroids.
#[test]
fn seeded_jitter_is_reproducible() {
    let raw = table(vec![
        row("2024-01-15", "SP", "São Paulo", "BancoX", Cell::Int(0)),
        row("2024-01-16", "SP", "São Paulo", "BancoX", Cell::Int(0)),
    ]);

    let a = parse_table(&raw, 0.1, &mut JitterRng::seeded(7)).unwrap();
    let b = parse_table(&raw, 0.1, &mut JitterRng::seeded(7)).unwrap();
    assert_eq!(a, b);

    let exact = parse_table(&raw, 0.0, &mut JitterRng::seeded(7)).unwrap();
    for r in exact.records() {
        assert_eq!((r.latitude, r.longitude), (-23.5505, -46.6333));
    }
}

/// A workbook that does not exist is a load error, not a panic.
#[test]
fn missing_workbook_is_an_error() {
    let result = read_sheet(Path::new("/nonexistent/bancos_com_dados.xlsx"), "DADOS REAIS");
    assert!(result.is_err());
}
