//! The dashboard pass: load, filter, aggregate, in that order, every time.
//!
//! EXECUTION ORDER (fixed):
//!   1. Dataset from the cache (read from disk only on first access)
//!   2. Cascading filter with the current selection
//!   3. KPIs
//!   4. Chart aggregations
//!
//! RULES:
//!   - Interaction methods only touch the selection or the cache.
//!   - view() re-derives everything from scratch; nothing is carried over
//!     between passes except the selection and the cached dataset.

use crate::{
    cache::{DatasetCache, LoadFailure},
    charts::{self, BankTotal, MapPoint, MonthBucket},
    config::DashboardConfig,
    error::DashResult,
    filter::{self, Selection},
    kpi::{KpiCard, Kpis},
    loader,
    record::Dataset,
    types::{Choice, DateRange},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub type LoaderFn = Box<dyn FnMut(&Path) -> DashResult<Dataset>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataStatus {
    Loaded { records: usize },
    LoadFailed { message: String },
}

/// Everything one render needs. Owned, so it can outlive the pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub status: DataStatus,
    pub bounds: Option<DateRange>,
    pub selection: Option<Selection>,
    pub states: Vec<Choice>,
    pub municipalities: Vec<Choice>,
    pub banks: Vec<Choice>,
    pub row_count: usize,
    pub kpis: Kpis,
    pub cards: Vec<KpiCard>,
    pub credit_by_bank: Vec<BankTotal>,
    pub monthly: Vec<MonthBucket>,
    pub map: Vec<MapPoint>,
}

impl DashboardView {
    /// True when the filtered set is empty (charts show a placeholder).
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn load_failed(&self) -> bool {
        matches!(self.status, DataStatus::LoadFailed { .. })
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    data_path: PathBuf,
    cache: DatasetCache<LoaderFn>,
    selection: Option<Selection>,
}

impl Dashboard {
    /// Dashboard reading the workbook named in `config`.
    pub fn new(config: DashboardConfig) -> Self {
        let sheet = config.sheet_name.clone();
        let jitter_std = config.jitter_std;
        let seed = config.jitter_seed;
        let read: LoaderFn = Box::new(move |path: &Path| {
            loader::load_dataset(path, &sheet, jitter_std, seed)
        });
        Self::with_loader(config, read)
    }

    /// Dashboard with a custom loader. Used in tests and tooling.
    pub fn with_loader(config: DashboardConfig, loader: LoaderFn) -> Self {
        Self {
            data_path: PathBuf::from(&config.data_path),
            config,
            cache: DatasetCache::new(loader),
            selection: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &DatasetCache<LoaderFn> {
        &self.cache
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn dataset(&mut self) -> std::sync::Arc<Dataset> {
        self.cache.get_or_load(&self.data_path)
    }

    pub fn load_failure(&self) -> Option<&LoadFailure> {
        self.cache.failure(&self.data_path)
    }

    // ── Interaction ─────────────────────────────────────────────────────────

    pub fn set_date_start(&mut self, date: NaiveDate) {
        if let Some(sel) = self.selection.as_mut() {
            sel.date_start = date;
        }
    }

    pub fn set_date_end(&mut self, date: NaiveDate) {
        if let Some(sel) = self.selection.as_mut() {
            sel.date_end = date;
        }
    }

    pub fn select_state(&mut self, state: Choice) {
        if let Some(sel) = self.selection.as_mut() {
            sel.state = state;
        }
    }

    pub fn select_municipality(&mut self, municipality: Choice) {
        if let Some(sel) = self.selection.as_mut() {
            sel.municipality = municipality;
        }
    }

    pub fn select_bank(&mut self, bank: Choice) {
        if let Some(sel) = self.selection.as_mut() {
            sel.bank = bank;
        }
    }

    /// Back to the full date range with every dropdown on All.
    pub fn reset_filters(&mut self) {
        self.selection = None;
    }

    /// Forget the cached dataset so the next pass reads the file again.
    pub fn reload(&mut self) {
        self.cache.invalidate(&self.data_path);
    }

    // ── Pass ────────────────────────────────────────────────────────────────

    /// Run one full pass and return what to render.
    pub fn view(&mut self) -> DashboardView {
        let dataset = self.dataset();
        let status = match self.load_failure() {
            Some(failure) => DataStatus::LoadFailed {
                message: failure.message.clone(),
            },
            None => DataStatus::Loaded {
                records: dataset.len(),
            },
        };

        let bounds = dataset.date_bounds();
        let Some(bounds) = bounds else {
            self.selection = None;
            return self.empty_view(status);
        };

        let mut requested = self
            .selection
            .take()
            .unwrap_or_else(|| Selection::new(bounds.0, bounds.1));
        requested.clamp_dates(bounds);

        let cascade = filter::cascade(dataset.records(), &requested);
        let rows = &cascade.rows;
        let kpis = Kpis::compute(rows);

        let view = DashboardView {
            title: self.config.title.clone(),
            status,
            bounds: Some(bounds),
            selection: Some(cascade.selection.clone()),
            states: cascade.states.clone(),
            municipalities: cascade.municipalities.clone(),
            banks: cascade.banks.clone(),
            row_count: rows.len(),
            cards: kpis.cards().to_vec(),
            kpis,
            credit_by_bank: charts::credit_by_bank(rows),
            monthly: charts::circulation_by_month(rows),
            map: charts::map_points(rows),
        };
        self.selection = Some(cascade.selection);
        view
    }

    fn empty_view(&self, status: DataStatus) -> DashboardView {
        let kpis = Kpis::default();
        DashboardView {
            title: self.config.title.clone(),
            status,
            bounds: None,
            selection: None,
            states: vec![Choice::All],
            municipalities: vec![Choice::All],
            banks: vec![Choice::All],
            row_count: 0,
            cards: kpis.cards().to_vec(),
            kpis,
            credit_by_bank: Vec::new(),
            monthly: Vec::new(),
            map: Vec::new(),
        }
    }
}
