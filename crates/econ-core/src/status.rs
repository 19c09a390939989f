//! 수집 상태 타입.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::text::truncate_chars;

/// CSV에 기록되는 전송 오류 메시지 최대 길이 (문자 수)
pub const STATUS_MESSAGE_MAX_CHARS: usize = 50;

/// 한 번의 조회 호출 결과 상태.
///
/// CSV 파일에는 `success`, `no_data`, `error_code_404`, `error: ...` 형태의
/// 문자열로 저장되며 같은 형태에서 다시 파싱됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// 정상 수집
    Success,
    /// 응답은 정상이나 데이터 없음
    NoData,
    /// 2xx가 아닌 HTTP 상태 코드
    HttpError(u16),
    /// 네트워크/타임아웃/파싱 오류
    TransportError(String),
}

impl FetchStatus {
    /// 전송 오류 상태를 생성합니다 (메시지는 50자로 잘림).
    pub fn transport(message: impl AsRef<str>) -> Self {
        Self::TransportError(truncate_chars(message.as_ref(), STATUS_MESSAGE_MAX_CHARS))
    }

    /// 시계열 포인트로 변환 가능한 상태인지 여부.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::NoData => write!(f, "no_data"),
            Self::HttpError(code) => write!(f, "error_code_{}", code),
            Self::TransportError(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl FromStr for FetchStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "no_data" => Ok(Self::NoData),
            _ => {
                if let Some(code) = s.strip_prefix("error_code_") {
                    return code
                        .parse::<u16>()
                        .map(Self::HttpError)
                        .map_err(|_| CoreError::Parse(format!("잘못된 상태 코드: {}", s)));
                }
                if let Some(msg) = s.strip_prefix("error:") {
                    return Ok(Self::TransportError(msg.trim_start().to_string()));
                }
                Err(CoreError::Parse(format!("알 수 없는 수집 상태: {}", s)))
            }
        }
    }
}

impl Serialize for FetchStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FetchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_csv_format() {
        assert_eq!(FetchStatus::Success.to_string(), "success");
        assert_eq!(FetchStatus::NoData.to_string(), "no_data");
        assert_eq!(FetchStatus::HttpError(404).to_string(), "error_code_404");
        assert_eq!(
            FetchStatus::TransportError("timeout".to_string()).to_string(),
            "error: timeout"
        );
    }

    #[test]
    fn test_parse_legacy_strings() {
        assert_eq!("success".parse::<FetchStatus>().unwrap(), FetchStatus::Success);
        assert_eq!(
            "error_code_500".parse::<FetchStatus>().unwrap(),
            FetchStatus::HttpError(500)
        );
        assert_eq!(
            "error: connection reset".parse::<FetchStatus>().unwrap(),
            FetchStatus::TransportError("connection reset".to_string())
        );
        assert!("error_code_abc".parse::<FetchStatus>().is_err());
        assert!("pending".parse::<FetchStatus>().is_err());
    }

    #[test]
    fn test_transport_message_truncated() {
        let long = "x".repeat(120);
        match FetchStatus::transport(&long) {
            FetchStatus::TransportError(msg) => assert_eq!(msg.chars().count(), 50),
            other => panic!("unexpected status: {:?}", other),
        }
        assert!(!FetchStatus::NoData.is_success());
    }
}
