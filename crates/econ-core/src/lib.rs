//! 경제/시장 데이터 파이프라인 핵심 도메인 타입.
//!
//! - [`status`]: 조회 결과 상태
//! - [`point`]: 시계열 포인트와 line protocol 직렬화
//! - [`row`]: 수집 행과 포인트 변환
//! - [`result`]: 작업별 수집 결과 집계
//! - [`summary`]: 실행 전체 요약
//! - [`merge`]: 히스토리 병합/중복 제거

pub mod error;
pub mod merge;
pub mod point;
pub mod result;
pub mod row;
pub mod status;
pub mod summary;
pub mod text;

pub use error::{CoreError, ProjectionError, Result};
pub use merge::{merge_rows, MergeKey, MergeOutcome};
pub use point::{FieldValue, TimeSeriesPoint, WritePrecision};
pub use result::{CollectionResult, ResultAggregator};
pub use row::{
    CollectedRow, EconomyRow, IndicatorObservation, IndicatorPeriod, NewsRow, PriceBar, StockRow,
    ToPoint,
};
pub use status::FetchStatus;
pub use summary::RunSummary;
