//! 파이프라인 핵심 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// 잘못된 호출 순서 (예: `start()` 없이 `finish()`)
    #[error("잘못된 상태: {0}")]
    InvalidState(String),

    /// 문자열 파싱 실패
    #[error("파싱 에러: {0}")]
    Parse(String),
}

/// 행(row)을 시계열 포인트로 변환할 때의 실패.
///
/// 행 단위로 복구 가능한 실패이며, 배치 전체를 중단시키지 않습니다.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// 수집 상태가 success가 아닌 행
    #[error("성공 상태가 아닌 행: {0}")]
    NotSuccessful(String),

    /// 필드 값 타입 변환 실패
    #[error("필드 변환 실패 ({field}): {value:?}")]
    Coercion { field: String, value: String },

    /// 타임스탬프 해석 실패
    #[error("타임스탬프 변환 실패: {0}")]
    Timestamp(String),
}

/// 핵심 작업용 Result 타입.
pub type Result<T> = std::result::Result<T, CoreError>;
