pub mod app;
pub mod ui;

pub use ui::run_tui;
