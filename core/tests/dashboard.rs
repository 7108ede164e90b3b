use desembolso_core::{
    cache::DatasetCache,
    dashboard::LoaderFn,
    Choice, Dashboard, DashboardConfig, DashError, DataStatus, Dataset, Metric, Record,
};
use chrono::NaiveDate;
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn sample() -> Dataset {
    Dataset::new(vec![
        Record::new(d(1, 10), "BA", "Salvador", "Banco Palmas")
            .with_metric(Metric::TotalCredit, 1_500_000.0)
            .with_metric(Metric::ActiveMerchants, 1200.0),
        Record::new(d(2, 10), "CE", "Fortaleza", "Banco Conjunto")
            .with_metric(Metric::TotalCredit, 500_000.0)
            .with_metric(Metric::ActiveMerchants, 300.0),
    ])
}

fn counting_loader(calls: Rc<Cell<u32>>) -> LoaderFn {
    Box::new(move |_path: &Path| {
        calls.set(calls.get() + 1);
        Ok(sample())
    })
}

fn failing_loader() -> LoaderFn {
    Box::new(|path: &Path| {
        Err(DashError::SheetNotFound {
            name: format!("DADOS REAIS in {}", path.display()),
        })
    })
}

fn dashboard(loader: LoaderFn) -> Dashboard {
    Dashboard::with_loader(DashboardConfig::default(), loader)
}

// ── Cache ────────────────────────────────────────────────────────────────────

/// The same path returns the same shared dataset without re-reading.
#[test]
fn repeated_access_hits_cache() {
    let calls = Rc::new(Cell::new(0));
    let mut cache = DatasetCache::new(counting_loader(calls.clone()));
    let path = Path::new("a.xlsx");

    let first = cache.get_or_load(path);
    let second = cache.get_or_load(path);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.get(), 1);
    assert_eq!(cache.load_count(), 1);
}

/// Each distinct path is loaded once.
#[test]
fn cache_is_keyed_by_path() {
    let calls = Rc::new(Cell::new(0));
    let mut cache = DatasetCache::new(counting_loader(calls.clone()));

    cache.get_or_load(Path::new("a.xlsx"));
    cache.get_or_load(Path::new("b.xlsx"));
    cache.get_or_load(Path::new("a.xlsx"));

    assert_eq!(calls.get(), 2);
}

/// invalidate() forces the next access to read again.
#[test]
fn invalidate_forces_reload() {
    let calls = Rc::new(Cell::new(0));
    let mut cache = DatasetCache::new(counting_loader(calls.clone()));
    let path = Path::new("a.xlsx");

    let first = cache.get_or_load(path);
    assert!(cache.invalidate(path));
    assert!(!cache.invalidate(path), "second invalidate has nothing to drop");
    let second = cache.get_or_load(path);

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(calls.get(), 2);
}

/// A failed load caches an empty dataset and records the failure.
#[test]
fn failed_load_yields_empty_dataset() {
    let mut cache = DatasetCache::new(failing_loader());
    let path = Path::new("missing.xlsx");

    let dataset = cache.get_or_load(path);
    assert!(dataset.is_empty());
    let failure = cache.failure(path).expect("failure recorded");
    assert!(failure.message.contains("DADOS REAIS"));

    // Stays failed without retrying.
    cache.get_or_load(path);
    assert_eq!(cache.load_count(), 1);
}

// ── Dashboard pass ───────────────────────────────────────────────────────────

/// First pass shows the full range with every dropdown on All.
#[test]
fn first_view_covers_everything() {
    let mut dash = dashboard(counting_loader(Rc::new(Cell::new(0))));
    let view = dash.view();

    assert_eq!(view.status, DataStatus::Loaded { records: 2 });
    assert_eq!(view.bounds, Some((d(1, 10), d(2, 10))));
    assert_eq!(view.row_count, 2);
    assert_eq!(view.kpis.total_credit, 2_000_000.0);
    assert_eq!(view.cards[2].value, "R$ 2.00 Mi");
    assert_eq!(view.cards[4].value, "1,500");
    assert_eq!(view.credit_by_bank[0].bank, "Banco Conjunto");
    assert_eq!(view.monthly.len(), 2);
    assert_eq!(view.map.len(), 2);
}

/// Every pass re-derives from the cached dataset; the file is read once.
#[test]
fn passes_reuse_cached_dataset() {
    let calls = Rc::new(Cell::new(0));
    let mut dash = dashboard(counting_loader(calls.clone()));

    dash.view();
    dash.select_state(Choice::only("CE"));
    let view = dash.view();

    assert_eq!(calls.get(), 1);
    assert_eq!(view.row_count, 1);
    assert_eq!(view.municipalities, vec![Choice::All, Choice::only("Fortaleza")]);
}

/// Moving the start date past the selected state's records resets the state.
#[test]
fn date_change_resets_stale_state() {
    let mut dash = dashboard(counting_loader(Rc::new(Cell::new(0))));
    dash.view();
    dash.select_state(Choice::only("BA"));
    assert_eq!(dash.view().row_count, 1);

    dash.set_date_start(d(2, 1));
    let view = dash.view();

    assert_eq!(view.selection.as_ref().unwrap().state, Choice::All);
    assert_eq!(dash.selection().unwrap().state, Choice::All);
    assert_eq!(view.row_count, 1);
}

/// Dates outside the data are clamped back into range.
#[test]
fn out_of_range_dates_are_clamped() {
    let mut dash = dashboard(counting_loader(Rc::new(Cell::new(0))));
    dash.view();
    dash.set_date_end(d(12, 31));
    let view = dash.view();
    assert_eq!(view.selection.unwrap().date_end, d(2, 10));
}

/// A load failure leaves the dashboard running in the empty state.
#[test]
fn load_failure_is_degraded_not_fatal() {
    let mut dash = dashboard(failing_loader());
    let view = dash.view();

    assert!(view.load_failed());
    assert!(view.is_empty());
    assert_eq!(view.kpis.avg_trust, 0.0);
    assert_eq!(view.states, vec![Choice::All]);
    assert!(dash.load_failure().is_some());
}

/// reload() re-reads the file on the next pass.
#[test]
fn reload_rereads_file() {
    let calls = Rc::new(Cell::new(0));
    let mut dash = dashboard(counting_loader(calls.clone()));
    dash.view();
    dash.reload();
    dash.view();
    assert_eq!(calls.get(), 2);
}

/// reset_filters() goes back to the full range and All everywhere.
#[test]
fn reset_filters_restores_defaults() {
    let mut dash = dashboard(counting_loader(Rc::new(Cell::new(0))));
    dash.view();
    dash.select_bank(Choice::only("Banco Palmas"));
    assert_eq!(dash.view().row_count, 1);

    dash.reset_filters();
    assert_eq!(dash.view().row_count, 2);
}

/// The view serializes for the headless JSON output.
#[test]
fn view_serializes_to_json() {
    let mut dash = dashboard(counting_loader(Rc::new(Cell::new(0))));
    let json = serde_json::to_value(dash.view()).unwrap();
    assert_eq!(json["status"]["status"], "loaded");
    assert_eq!(json["row_count"], 2);
}
