//! 경제·시장 데이터 수집기.
//!
//! 외부 타이머(cron/systemd)가 실행하는 단발성 바이너리를 위한 라이브러리입니다:
//! - 일일 수집 (뉴스, 주가, 경제지표) → CSV + InfluxDB + Telegram 보고
//! - 히스토리 수집, 병합, InfluxDB 백필
//! - Grafana 대시보드 생성/업로드, 헬스체크

pub mod catalog;
pub mod config;
pub mod error;
pub mod modules;

pub use config::{CollectorConfig, TimeSeriesCapability};
pub use error::{CollectorError, Result};
