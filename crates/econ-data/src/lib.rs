//! 외부 데이터 소스와 저장소.
//!
//! 이 crate는 다음을 제공합니다:
//! - 뉴스/주가/경제지표 Provider (네이버, Yahoo Finance, ECOS, FRED)
//! - CSV 행 저장소
//! - InfluxDB 쓰기 클라이언트와 배치 작성기

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use provider::{
    DailyBar, EcosClient, EcosCycle, EcosQuery, EcosRow, FredClient, FredObservation,
    IndicatorSource, NaverNewsClient, NewsItem, NewsSource, QuoteSource, SeriesSource,
    YahooQuoteClient,
};

pub use storage::{
    BatchProgress, BatchReport, BatchWriteError, BatchWriter, InfluxConfig, InfluxHealth,
    InfluxWriter, PointSink, DEFAULT_BATCH_SIZE,
};
