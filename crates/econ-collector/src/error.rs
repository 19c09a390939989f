//! 에러 타입 정의.

use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("설정 오류: {0}")]
    Config(String),

    /// 데이터 소스/저장소 에러
    #[error(transparent)]
    Data(#[from] econ_data::DataError),

    /// 도메인 규칙 위반
    #[error(transparent)]
    Core(#[from] econ_core::CoreError),

    /// 대시보드 생성/업로드 에러
    #[error(transparent)]
    Dashboard(#[from] econ_dashboard::DashboardError),

    /// 알림 에러
    #[error(transparent)]
    Notification(#[from] econ_notification::NotificationError),

    /// 파일 I/O 에러
    #[error("파일 I/O 오류: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 에러
    #[error("JSON 오류: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
