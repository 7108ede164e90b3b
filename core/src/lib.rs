//! Community disbursement dashboard core.
//!
//! Loads the disbursement workbook once per path, runs the cascading
//! date → state → municipality → bank filter, and computes the KPIs and
//! chart series the terminal front end renders.

pub mod cache;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod geo;
pub mod kpi;
pub mod loader;
pub mod record;
pub mod rng;
pub mod types;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardView, DataStatus};
pub use error::{DashError, DashResult};
pub use record::{Dataset, Metric, Record};
pub use types::Choice;
