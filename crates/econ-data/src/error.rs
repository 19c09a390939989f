//! 데이터 모듈 오류 타입.

use econ_core::FetchStatus;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 클라이언트 생성 실패
    #[error("HTTP client error: {0}")]
    ClientBuild(String),

    /// 요청 전송 실패 (연결, 타임아웃 등)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 2xx가 아닌 응답
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// CSV 읽기/쓰기 오류
    #[error("CSV error: {0}")]
    CsvError(String),

    /// 파일 입출력 오류
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 시계열 저장소 쓰기 오류
    #[error("Write error: {0}")]
    WriteError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DataError {
    /// 행에 기록할 수집 상태로 변환합니다.
    pub fn to_fetch_status(&self) -> FetchStatus {
        match self {
            Self::HttpStatus { status, .. } => FetchStatus::HttpError(*status),
            Self::FetchError(msg) | Self::ParseError(msg) => FetchStatus::transport(msg),
            other => FetchStatus::transport(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::ParseError(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::CsvError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

/// 응답 상태를 확인하고 2xx가 아니면 [`DataError::HttpStatus`]를 반환합니다.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DataError::HttpStatus {
        status: status.as_u16(),
        body: econ_core::text::truncate_chars(&body, 200),
    })
}

/// 지정한 타임아웃으로 HTTP 클라이언트를 생성합니다.
pub(crate) fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DataError::ClientBuild(format!("HTTP 클라이언트 생성 실패: {}", e)))
}
