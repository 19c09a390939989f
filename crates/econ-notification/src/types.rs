//! 알림 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use econ_core::RunSummary;
use serde::{Deserialize, Serialize};

/// 알림 이벤트 타입.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// 실행 전체 수집 결과
    CollectionReport {
        summary: RunSummary,
        dashboard_url: String,
    },
    /// 작업 오류 긴급 알림
    CollectionError { task_name: String, message: String },
    /// 연결 테스트
    Test,
}

/// 알림 메시지.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// 알림 이벤트
    pub event: NotificationEvent,
    /// 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// 새 알림을 생성합니다.
    pub fn new(event: NotificationEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }

    /// 수집 결과 알림.
    pub fn collection_report(summary: RunSummary, dashboard_url: impl Into<String>) -> Self {
        Self::new(NotificationEvent::CollectionReport {
            summary,
            dashboard_url: dashboard_url.into(),
        })
    }

    /// 작업 오류 알림.
    pub fn collection_error(task_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationEvent::CollectionError {
            task_name: task_name.into(),
            message: message.into(),
        })
    }
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 알림 전송기 trait.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 알림을 전송합니다.
    async fn send(&self, notification: &Notification) -> NotificationResult<()>;

    /// 전송기가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}
