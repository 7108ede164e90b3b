//! Cascading filter: date range → state → municipality → community bank.
//!
//! RULES:
//!   - Each stage narrows the output of the previous stage, never the base set.
//!   - The options offered at a level come from the rows that survived
//!     every level above it.
//!   - A selection missing from its level's options is reset to All before
//!     filtering, so a selection is never stale relative to its list.

use crate::{
    record::{Dataset, Record},
    types::{Choice, DateRange},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The five user selections that drive the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub state: Choice,
    pub municipality: Choice,
    pub bank: Choice,
}

impl Selection {
    pub fn new(date_start: NaiveDate, date_end: NaiveDate) -> Self {
        Self {
            date_start,
            date_end,
            state: Choice::All,
            municipality: Choice::All,
            bank: Choice::All,
        }
    }

    /// Whole date range of the dataset with every dropdown on All.
    /// None for an empty dataset.
    pub fn full_range(dataset: &Dataset) -> Option<Self> {
        dataset
            .date_bounds()
            .map(|(start, end)| Self::new(start, end))
    }

    /// Keep both pickers inside `bounds`, as date inputs with
    /// min/max values do.
    pub fn clamp_dates(&mut self, bounds: DateRange) {
        let (lo, hi) = bounds;
        self.date_start = self.date_start.clamp(lo, hi);
        self.date_end = self.date_end.clamp(lo, hi);
    }

    pub fn with_state(mut self, state: Choice) -> Self {
        self.state = state;
        self
    }

    pub fn with_municipality(mut self, municipality: Choice) -> Self {
        self.municipality = municipality;
        self
    }

    pub fn with_bank(mut self, bank: Choice) -> Self {
        self.bank = bank;
        self
    }
}

/// Result of one pass through the cascade.
#[derive(Debug, Clone)]
pub struct Cascade<'a> {
    /// Options per level, each starting with `Choice::All`.
    pub states: Vec<Choice>,
    pub municipalities: Vec<Choice>,
    pub banks: Vec<Choice>,
    /// Rows that survived the date filter (stage 1).
    pub in_period: Vec<&'a Record>,
    /// Final filtered rows.
    pub rows: Vec<&'a Record>,
    /// The selection actually applied, after resets.
    pub selection: Selection,
}

impl Cascade<'_> {
    /// True when any dropdown had to be reset to All.
    pub fn was_reset(&self, requested: &Selection) -> bool {
        self.selection != *requested
    }
}

/// Stage 1: inclusive date filter.
pub fn filter_by_date(records: &[Record], start: NaiveDate, end: NaiveDate) -> Vec<&Record> {
    records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .collect()
}

/// Sorted distinct values of one field, prefixed with All.
pub fn options<'a, F>(rows: &[&'a Record], field: F) -> Vec<Choice>
where
    F: Fn(&'a Record) -> &'a str,
{
    let distinct: BTreeSet<&str> = rows.iter().map(|r| field(*r)).collect();
    std::iter::once(Choice::All)
        .chain(distinct.into_iter().map(Choice::only))
        .collect()
}

/// Reset `choice` to All when the level no longer offers it.
fn reconcile(choice: &Choice, available: &[Choice], level: &str) -> Choice {
    if available.contains(choice) {
        choice.clone()
    } else {
        log::debug!("cascade: {level} selection '{choice}' no longer available, reset to All");
        Choice::All
    }
}

fn narrow<'a, F>(rows: Vec<&'a Record>, choice: &Choice, field: F) -> Vec<&'a Record>
where
    F: Fn(&Record) -> &str,
{
    match choice {
        Choice::All => rows,
        Choice::Only(_) => rows.into_iter().filter(|r| choice.admits(field(*r))).collect(),
    }
}

/// Run the full cascade over `records`.
pub fn cascade<'a>(records: &'a [Record], requested: &Selection) -> Cascade<'a> {
    let in_period = filter_by_date(records, requested.date_start, requested.date_end);

    let states = options(&in_period, |r| r.state.as_str());
    let state = reconcile(&requested.state, &states, "state");
    let by_state = narrow(in_period.clone(), &state, |r| r.state.as_str());

    let municipalities = options(&by_state, |r| r.municipality.as_str());
    let municipality = reconcile(&requested.municipality, &municipalities, "municipality");
    let by_municipality = narrow(by_state, &municipality, |r| r.municipality.as_str());

    let banks = options(&by_municipality, |r| r.community_bank.as_str());
    let bank = reconcile(&requested.bank, &banks, "bank");
    let rows = narrow(by_municipality, &bank, |r| r.community_bank.as_str());

    Cascade {
        states,
        municipalities,
        banks,
        in_period,
        rows,
        selection: Selection {
            date_start: requested.date_start,
            date_end: requested.date_end,
            state,
            municipality,
            bank,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn rows() -> Vec<Record> {
        vec![
            Record::new(d(1), "BA", "Salvador", "Banco Palmas"),
            Record::new(d(2), "BA", "Ilhéus", "Banco Ilhéus"),
            Record::new(d(3), "CE", "Fortaleza", "Banco Palmas"),
            Record::new(d(4), "CE", "Fortaleza", "Banco Conjunto"),
        ]
    }

    #[test]
    fn options_are_sorted_and_prefixed_with_all() {
        let data = rows();
        let all: Vec<&Record> = data.iter().collect();
        let banks = options(&all, |r| r.community_bank.as_str());
        assert_eq!(
            banks,
            vec![
                Choice::All,
                Choice::only("Banco Conjunto"),
                Choice::only("Banco Ilhéus"),
                Choice::only("Banco Palmas"),
            ]
        );
    }

    #[test]
    fn municipality_options_follow_state() {
        let data = rows();
        let sel = Selection::new(d(1), d(4)).with_state(Choice::only("CE"));
        let out = cascade(&data, &sel);
        assert_eq!(out.municipalities, vec![Choice::All, Choice::only("Fortaleza")]);
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn inverted_range_is_empty_not_an_error() {
        let data = rows();
        let out = cascade(&data, &Selection::new(d(4), d(1)));
        assert!(out.rows.is_empty());
        assert_eq!(out.states, vec![Choice::All]);
    }
}
