//! 데이터 Provider 모듈.
//!
//! 외부 API에서 원시 데이터를 가져오는 Provider들을 정의합니다.
//! 작업(job) 코드는 아래 trait에만 의존하므로 테스트에서 가짜 구현으로 대체할 수 있습니다.
//!
//! ## 뉴스
//! - `NaverNewsClient`: 네이버 검색 API (뉴스)
//!
//! ## 주가
//! - `YahooQuoteClient`: Yahoo Finance 일봉 (최근/기간)
//!
//! ## 경제지표
//! - `EcosClient`: 한국은행 ECOS 통계 검색
//! - `FredClient`: FRED 관측치

pub mod ecos;
pub mod fred;
pub mod naver;
pub mod yahoo;

pub use ecos::{EcosClient, EcosCycle, EcosQuery, EcosRow};
pub use fred::{FredClient, FredObservation};
pub use naver::NaverNewsClient;
pub use yahoo::YahooQuoteClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 뉴스 검색 결과 한 건 (HTML 태그 포함 원문).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

/// 일봉 한 개.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// 뉴스 검색 소스.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// 키워드로 뉴스를 검색합니다 (정확도순, 최대 `display`건).
    async fn search(&self, keyword: &str, display: u32) -> Result<Vec<NewsItem>>;
}

/// 주가 소스.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// 가장 최근 거래일 일봉. 데이터가 없으면 `None`.
    async fn latest_bar(&self, ticker: &str) -> Result<Option<DailyBar>>;

    /// `[start, end)` 구간 일봉 (날짜 오름차순).
    async fn history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>>;
}

/// 통계표 기반 지표 소스 (ECOS).
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// 조건에 맞는 통계 행을 조회합니다. 데이터가 없으면 빈 목록.
    async fn statistic_search(&self, query: &EcosQuery) -> Result<Vec<EcosRow>>;
}

/// 시리즈 ID 기반 관측치 소스 (FRED).
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// `[start, end]` 구간 관측치. 결측값은 제외됩니다.
    async fn observations(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FredObservation>>;
}
