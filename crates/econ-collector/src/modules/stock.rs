//! 주가 수집 작업.
//!
//! 종목마다 가장 최근 일봉을 조회합니다. 데이터가 없으면 `no_data` 실패입니다.

use chrono::{DateTime, Utc};
use econ_core::{FetchStatus, ResultAggregator, RunSummary, StockRow};
use econ_data::QuoteSource;
use std::path::Path;
use tracing::{debug, info, warn};

use super::persist::{finish_job, Persistence};
use crate::error::Result;

pub const TASK_NAME: &str = "stock";

/// 종목별 최근 일봉을 조회해 행으로 만듭니다.
pub async fn fetch_stocks<'t, I>(
    source: &dyn QuoteSource,
    tickers: I,
    now: DateTime<Utc>,
    aggregator: &mut ResultAggregator,
) -> Vec<StockRow>
where
    I: IntoIterator<Item = &'t (&'t str, &'t str)>,
{
    let mut rows = Vec::new();

    for &(name, ticker) in tickers {
        let row = match source.latest_bar(ticker).await {
            Ok(Some(bar)) => {
                debug!(name, ticker, close = bar.close, "주가 수집");
                aggregator.add_success(1);
                StockRow::from_bar(
                    now, name, ticker, bar.open, bar.high, bar.low, bar.close, bar.volume,
                )
            }
            Ok(None) => {
                warn!(name, ticker, "주가 데이터 없음");
                aggregator.add_fail(1, Some(&format!("{}: no_data", name)));
                StockRow::failed(now, name, ticker, FetchStatus::NoData)
            }
            Err(e) => {
                let status = e.to_fetch_status();
                warn!(name, ticker, status = %status, "주가 수집 실패");
                aggregator.add_fail(1, Some(&format!("{}: {}", name, status)));
                StockRow::failed(now, name, ticker, status)
            }
        };
        rows.push(row);
    }

    info!(
        success = aggregator.success_count(),
        fail = aggregator.fail_count(),
        "주가 조회 완료"
    );
    rows
}

/// 주가 작업 전체를 실행합니다.
pub async fn run_stock_job<'t, I>(
    source: &dyn QuoteSource,
    tickers: I,
    csv_path: &Path,
    persistence: &Persistence<'_>,
    summary: &mut RunSummary,
) -> Result<()>
where
    I: IntoIterator<Item = &'t (&'t str, &'t str)>,
{
    info!("[주가 수집]");
    let mut aggregator = ResultAggregator::new(TASK_NAME);
    aggregator.start();

    let rows = fetch_stocks(source, tickers, Utc::now(), &mut aggregator).await;
    persistence.store_rows(TASK_NAME, csv_path, &rows).await;

    finish_job(&aggregator, persistence, summary).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persist::testing::MemorySink;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use econ_data::{DailyBar, DataError};

    struct FakeQuotes;

    #[async_trait]
    impl QuoteSource for FakeQuotes {
        async fn latest_bar(&self, ticker: &str) -> econ_data::Result<Option<DailyBar>> {
            match ticker {
                "EMPTY" => Ok(None),
                "BROKEN" => Err(DataError::ParseError("unexpected chart payload".to_string())),
                _ => Ok(Some(DailyBar {
                    date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                    open: 100.0,
                    high: 110.0,
                    low: 95.5,
                    close: 105.25,
                    volume: 12_345,
                })),
            }
        }

        async fn history(
            &self,
            _ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> econ_data::Result<Vec<DailyBar>> {
            Ok(Vec::new())
        }
    }

    const TICKERS: &[(&str, &str)] = &[
        ("삼성전자", "005930.KS"),
        ("빈 종목", "EMPTY"),
        ("깨진 종목", "BROKEN"),
    ];

    #[tokio::test]
    async fn test_fetch_stocks_statuses() {
        let mut aggregator = ResultAggregator::new(TASK_NAME);
        aggregator.start();
        let now = Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0).unwrap();

        let rows = fetch_stocks(&FakeQuotes, TICKERS, now, &mut aggregator).await;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].status, FetchStatus::Success);
        assert_eq!(rows[0].close, "105.25");
        assert_eq!(rows[0].volume, "12345");
        assert_eq!(rows[1].status, FetchStatus::NoData);
        assert_eq!(rows[1].close, "N/A");
        assert!(matches!(rows[2].status, FetchStatus::TransportError(_)));
        assert_eq!(aggregator.success_count(), 1);
        assert_eq!(aggregator.fail_count(), 2);

        let result = aggregator.finish().unwrap();
        assert_eq!(result.errors()[0], "빈 종목: no_data");
    }

    #[tokio::test]
    async fn test_run_stock_job_writes_only_success_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.csv");
        let sink = MemorySink::default();
        let persistence = Persistence::new(Some(&sink), 2);
        let mut summary = RunSummary::new();

        run_stock_job(&FakeQuotes, TICKERS, &path, &persistence, &mut summary)
            .await
            .unwrap();

        let points = sink.points.lock().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].measurement, "stock_prices");
        assert_eq!(points[0].tags["ticker"], "005930.KS");
        assert_eq!(points[1].measurement, "system_logs");
        drop(points);

        let result = summary.get(TASK_NAME).unwrap();
        assert_eq!(result.total_count(), 3);
        assert!(result.has_failures());
    }
}
