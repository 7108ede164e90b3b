use chrono::NaiveDate;
use desembolso_core::{dashboard::DashboardView, Choice, Dashboard};

/// The sidebar widget that currently receives key presses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Focus {
    DateStart,
    DateEnd,
    State,
    Municipality,
    Bank,
}

impl Focus {
    pub const ORDER: [Focus; 5] = [
        Focus::DateStart,
        Focus::DateEnd,
        Focus::State,
        Focus::Municipality,
        Focus::Bank,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Focus::DateStart    => "Data Início",
            Focus::DateEnd      => "Data Fim",
            Focus::State        => "Estado",
            Focus::Municipality => "Município",
            Focus::Bank         => "Banco Comunitário",
        }
    }

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }
}

pub struct App {
    pub dashboard: Dashboard,
    /// Result of the latest full pass. Rebuilt after every interaction.
    pub view: DashboardView,
    pub focus: Focus,
    pub should_quit: bool,
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(chrono::Duration::days(days))
        .unwrap_or(date)
}

/// Move `delta` steps through `options` starting from `current`,
/// stopping at either end.
fn step_choice(options: &[Choice], current: &Choice, delta: i64) -> Choice {
    if options.is_empty() {
        return Choice::All;
    }
    let idx = options.iter().position(|c| c == current).unwrap_or(0) as i64;
    let last = options.len() as i64 - 1;
    let next = (idx + delta).clamp(0, last) as usize;
    options[next].clone()
}

impl App {
    pub fn new(mut dashboard: Dashboard) -> Self {
        let view = dashboard.view();
        Self {
            dashboard,
            view,
            focus: Focus::DateStart,
            should_quit: false,
        }
    }

    /// One full load → filter → aggregate pass.
    pub fn refresh(&mut self) {
        self.view = self.dashboard.view();
    }

    pub fn next_focus(&mut self) {
        let i = (self.focus.position() + 1) % Focus::ORDER.len();
        self.focus = Focus::ORDER[i];
    }

    pub fn prev_focus(&mut self) {
        let len = Focus::ORDER.len();
        let i = (self.focus.position() + len - 1) % len;
        self.focus = Focus::ORDER[i];
    }

    fn options(&self, focus: Focus) -> &[Choice] {
        match focus {
            Focus::State        => &self.view.states,
            Focus::Municipality => &self.view.municipalities,
            Focus::Bank         => &self.view.banks,
            Focus::DateStart | Focus::DateEnd => &[],
        }
    }

    /// Change the focused widget by `delta` (days for dates, entries for lists).
    pub fn step(&mut self, delta: i64) {
        let Some(sel) = self.view.selection.clone() else {
            return;
        };
        match self.focus {
            Focus::DateStart => self.dashboard.set_date_start(shift_days(sel.date_start, delta)),
            Focus::DateEnd   => self.dashboard.set_date_end(shift_days(sel.date_end, delta)),
            Focus::State => {
                let next = step_choice(self.options(Focus::State), &sel.state, delta);
                self.dashboard.select_state(next);
            }
            Focus::Municipality => {
                let next = step_choice(self.options(Focus::Municipality), &sel.municipality, delta);
                self.dashboard.select_municipality(next);
            }
            Focus::Bank => {
                let next = step_choice(self.options(Focus::Bank), &sel.bank, delta);
                self.dashboard.select_bank(next);
            }
        }
        self.refresh();
    }

    /// Jump the focused widget to its first (or last) value.
    pub fn jump(&mut self, to_end: bool) {
        let Some((lo, hi)) = self.view.bounds else {
            return;
        };
        let target = if to_end { hi } else { lo };
        match self.focus {
            Focus::DateStart => self.dashboard.set_date_start(target),
            Focus::DateEnd   => self.dashboard.set_date_end(target),
            focus => {
                let options = self.options(focus);
                let choice = if to_end { options.last() } else { options.first() }
                    .cloned()
                    .unwrap_or(Choice::All);
                self.select(focus, choice);
            }
        }
        self.refresh();
    }

    /// Put the focused widget back to its default: All, or the data bound.
    pub fn reset_focused(&mut self) {
        let Some((lo, hi)) = self.view.bounds else {
            return;
        };
        match self.focus {
            Focus::DateStart => self.dashboard.set_date_start(lo),
            Focus::DateEnd   => self.dashboard.set_date_end(hi),
            focus => self.select(focus, Choice::All),
        }
        self.refresh();
    }

    pub fn reset_all(&mut self) {
        self.dashboard.reset_filters();
        self.refresh();
    }

    pub fn reload(&mut self) {
        self.dashboard.reload();
        self.refresh();
    }

    fn select(&mut self, focus: Focus, choice: Choice) {
        match focus {
            Focus::State        => self.dashboard.select_state(choice),
            Focus::Municipality => self.dashboard.select_municipality(choice),
            Focus::Bank         => self.dashboard.select_bank(choice),
            Focus::DateStart | Focus::DateEnd => {}
        }
    }

    /// Display value of a sidebar widget.
    pub fn value_of(&self, focus: Focus) -> String {
        let Some(sel) = self.view.selection.as_ref() else {
            return "-".to_string();
        };
        match focus {
            Focus::DateStart    => sel.date_start.format("%d/%m/%Y").to_string(),
            Focus::DateEnd      => sel.date_end.format("%d/%m/%Y").to_string(),
            Focus::State        => sel.state.to_string(),
            Focus::Municipality => sel.municipality.to_string(),
            Focus::Bank         => sel.bank.to_string(),
        }
    }

    /// Number of concrete options (excluding All) for list widgets.
    pub fn option_count(&self, focus: Focus) -> Option<usize> {
        match focus {
            Focus::DateStart | Focus::DateEnd => None,
            f => Some(self.options(f).len().saturating_sub(1)),
        }
    }
}
