//! 수집기 작업 모듈.

pub mod backfill;
pub mod dashboard;
pub mod economy;
pub mod healthcheck;
pub mod historical;
pub mod merge;
pub mod news;
pub mod notify;
pub mod persist;
pub mod run;
pub mod stock;

pub use backfill::{run_backfill, BackfillOutcome};
pub use dashboard::{grafana_client, upload, upload_file, write_dashboard, DashboardKind};
pub use healthcheck::{run_healthcheck, HealthReport};
pub use historical::{run_historical, HistoryReport, HistoryWindow};
pub use merge::{run_merge, MergeStats};
pub use notify::send_test;
pub use run::{influx_opener, run_collection, Job};
