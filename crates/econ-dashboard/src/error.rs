//! 대시보드 에러 타입.

use thiserror::Error;

/// 대시보드 생성/업로드 에러.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("HTTP 클라이언트 생성 실패: {0}")]
    ClientBuild(String),

    #[error("Grafana 요청 실패: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Grafana 응답 오류 (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    #[error("JSON 직렬화 실패: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("파일 I/O 실패: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// 상태 코드별 조치 안내.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Status { status: 401, .. } => {
                Some("Grafana 계정 확인 (GRAFANA_USER / GRAFANA_PASSWORD)")
            }
            Self::Status { status: 412, .. } => {
                Some("같은 이름의 대시보드가 있습니다. overwrite 설정을 확인하세요")
            }
            Self::Request(e) if e.is_connect() => {
                Some("Grafana 실행 여부 확인: systemctl status grafana-server")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
