//! Yahoo Finance 일봉 조회.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api::YahooConnector;

use super::{DailyBar, QuoteSource};
use crate::error::{DataError, Result};

/// 최근 일봉 조회 시 사용하는 범위 (휴장일 대비)
const LATEST_RANGE: &str = "5d";
const DAILY_INTERVAL: &str = "1d";

/// Yahoo Finance 일봉 클라이언트.
pub struct YahooQuoteClient {
    connector: YahooConnector,
}

impl YahooQuoteClient {
    pub fn new() -> Result<Self> {
        let connector = YahooConnector::new()
            .map_err(|e| DataError::ClientBuild(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteClient {
    async fn latest_bar(&self, ticker: &str) -> Result<Option<DailyBar>> {
        debug!(ticker = ticker, range = LATEST_RANGE, "Yahoo Finance 최근 일봉 조회");

        let response = self
            .connector
            .get_quote_range(ticker, DAILY_INTERVAL, LATEST_RANGE)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", ticker, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        let mut bars = to_bars(&quotes);
        Ok(bars.pop())
    }

    async fn history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
        let start_at = naive_date_to_offset_datetime(start)?;
        let end_at = naive_date_to_offset_datetime(end)?;

        debug!(ticker = ticker, start = %start, end = %end, "Yahoo Finance 기간 일봉 조회");

        let response = self
            .connector
            .get_quote_history_interval(ticker, start_at, end_at, DAILY_INTERVAL)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", ticker, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        Ok(to_bars(&quotes))
    }
}

/// 시세 목록을 날짜 오름차순 일봉으로 변환합니다.
fn to_bars(quotes: &[yahoo_finance_api::Quote]) -> Vec<DailyBar> {
    let mut bars: Vec<DailyBar> = quotes
        .iter()
        .filter_map(|q| {
            let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
            Some(DailyBar {
                date,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
        })
        .collect();

    bars.sort_by_key(|b| b.date);
    bars
}

/// NaiveDate를 OffsetDateTime(자정 UTC)으로 변환.
fn naive_date_to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let month = time::Month::try_from(date.month() as u8)
        .map_err(|e| DataError::ParseError(format!("잘못된 월 ({}): {}", date, e)))?;
    let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
        .map_err(|e| DataError::ParseError(format!("잘못된 날짜 ({}): {}", date, e)))?;
    Ok(day.midnight().assume_utc())
}
