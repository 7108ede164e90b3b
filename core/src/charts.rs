//! Grouped aggregations that feed the three charts.

use crate::{
    kpi::brl_millions,
    record::{Metric, Record},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Credit per bank ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTotal {
    pub bank: String,
    pub total_credit: f64,
}

impl BankTotal {
    pub fn label(&self) -> String {
        brl_millions(self.total_credit)
    }
}

/// Total credit per community bank, smallest first (ties by name).
pub fn credit_by_bank(rows: &[&Record]) -> Vec<BankTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows {
        *totals.entry(r.community_bank.as_str()).or_insert(0.0) += r.metric(Metric::TotalCredit);
    }
    let mut out: Vec<BankTotal> = totals
        .into_iter()
        .map(|(bank, total_credit)| BankTotal {
            bank: bank.to_string(),
            total_credit,
        })
        .collect();
    // BTreeMap order makes the sort stable by name for equal totals.
    out.sort_by(|a, b| a.total_credit.total_cmp(&b.total_credit));
    out
}

// ── Currency in circulation per month ───────────────────────────────────────

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// "Jan 2024"
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// Last day of the month this bucket covers.
    pub month_end: NaiveDate,
    pub label: String,
    /// (bank, social currency in circulation), sorted by bank.
    pub by_bank: Vec<(String, f64)>,
}

impl MonthBucket {
    pub fn total(&self) -> f64 {
        self.by_bank.iter().map(|(_, v)| v).sum()
    }
}

/// Social currency in circulation summed per (month, bank), oldest month first.
pub fn circulation_by_month(rows: &[&Record]) -> Vec<MonthBucket> {
    let mut grid: BTreeMap<NaiveDate, BTreeMap<&str, f64>> = BTreeMap::new();
    for r in rows {
        *grid
            .entry(month_end(r.date))
            .or_default()
            .entry(r.community_bank.as_str())
            .or_insert(0.0) += r.metric(Metric::CurrencyInCirculation);
    }
    grid.into_iter()
        .map(|(end, banks)| MonthBucket {
            month_end: end,
            label: month_label(end),
            by_bank: banks
                .into_iter()
                .map(|(bank, v)| (bank.to_string(), v))
                .collect(),
        })
        .collect()
}

/// Every bank that appears in any bucket, sorted. Gives each bank a
/// stable series index (colour) across months.
pub fn series_names(buckets: &[MonthBucket]) -> Vec<String> {
    let mut names: Vec<String> = buckets
        .iter()
        .flat_map(|b| b.by_bank.iter().map(|(bank, _)| bank.clone()))
        .collect();
    names.sort();
    names.dedup();
    names
}

// ── Map markers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub total_credit: f64,
    pub bank: String,
    pub municipality: String,
}

/// One marker per row.
pub fn map_points(rows: &[&Record]) -> Vec<MapPoint> {
    rows.iter()
        .map(|r| MapPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            total_credit: r.metric(Metric::TotalCredit),
            bank: r.community_bank.clone(),
            municipality: r.municipality.clone(),
        })
        .collect()
}

/// Marker size in [min_radius, max_radius], area proportional to credit.
pub fn marker_radius(credit: f64, max_credit: f64, min_radius: f64, max_radius: f64) -> f64 {
    if max_credit <= 0.0 || credit <= 0.0 {
        return min_radius;
    }
    let share = (credit / max_credit).clamp(0.0, 1.0).sqrt();
    min_radius + (max_radius - min_radius) * share
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_end_boundaries() {
        assert_eq!(month_end(d(2024, 1, 15)), d(2024, 1, 31));
        assert_eq!(month_end(d(2024, 2, 1)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 12, 31)), d(2023, 12, 31));
    }

    #[test]
    fn labels_use_abbreviated_month() {
        assert_eq!(month_label(d(2024, 1, 31)), "Jan 2024");
        assert_eq!(month_label(d(2023, 9, 30)), "Sep 2023");
    }

    #[test]
    fn marker_radius_scales_with_credit() {
        assert_eq!(marker_radius(0.0, 100.0, 0.2, 1.0), 0.2);
        assert_eq!(marker_radius(100.0, 100.0, 0.2, 1.0), 1.0);
        let quarter = marker_radius(25.0, 100.0, 0.0, 1.0);
        assert!((quarter - 0.5).abs() < 1e-12);
    }
}
