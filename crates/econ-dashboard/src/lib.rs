//! # Econ Dashboard
//!
//! Grafana 대시보드 생성 및 업로드.
//!
//! - [`model`]: 대시보드/패널 JSON 모델
//! - [`flux`]: Flux 쿼리 빌더
//! - [`market`]: 경제·주가 통합 대시보드
//! - [`health`]: 시스템 헬스 대시보드 (Telegraf)
//! - [`grafana`]: Grafana HTTP API 클라이언트

pub mod error;
pub mod flux;
pub mod grafana;
pub mod health;
pub mod market;
pub mod model;

pub use error::{DashboardError, Result};
pub use flux::FluxQuery;
pub use grafana::{DatasourceInfo, GrafanaClient, GrafanaHealth, OrgInfo, UploadResponse};
pub use health::{build_system_health_dashboard, SYSTEM_HEALTH_UID};
pub use market::build_market_dashboard;
pub use model::{Dashboard, DashboardDocument, Panel, PanelType};
