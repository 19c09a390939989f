//! 경제지표 수집 작업 (ECOS).
//!
//! 지표마다 오늘(월별 지표는 이번 달) 값을 한 건 조회합니다.

use chrono::{DateTime, NaiveDate, Utc};
use econ_core::{EconomyRow, FetchStatus, ResultAggregator, RunSummary};
use econ_data::{EcosQuery, IndicatorSource};
use std::path::Path;
use tracing::{debug, info, warn};

use super::persist::{finish_job, skip_job, Persistence};
use crate::catalog::EcosIndicator;
use crate::error::Result;

pub const TASK_NAME: &str = "economy";

/// 지표별 값을 조회해 행으로 만듭니다.
///
/// `today`는 서울 기준 날짜입니다. 실패 행의 기준 시점은 `YYYYMMDD`로 기록됩니다.
pub async fn fetch_indicators(
    source: &dyn IndicatorSource,
    indicators: &[EcosIndicator],
    today: NaiveDate,
    now: DateTime<Utc>,
    aggregator: &mut ResultAggregator,
) -> Vec<EconomyRow> {
    let today_str = today.format("%Y%m%d").to_string();
    let mut rows = Vec::with_capacity(indicators.len());

    for indicator in indicators {
        let query = EcosQuery::single(
            indicator.stat_code,
            indicator.cycle,
            indicator.item_code,
            today,
        );

        let row = match source.statistic_search(&query).await {
            Ok(found) => match found.into_iter().next() {
                Some(first) => {
                    debug!(indicator = indicator.name, value = %first.data_value, "지표 수집");
                    aggregator.add_success(1);
                    EconomyRow {
                        timestamp: now,
                        indicator: indicator.name.to_string(),
                        value: first.data_value,
                        date: first.time,
                        status: FetchStatus::Success,
                    }
                }
                None => {
                    warn!(indicator = indicator.name, "지표 데이터 없음");
                    aggregator.add_fail(1, Some(&format!("{}: no_data", indicator.name)));
                    EconomyRow::failed(now, indicator.name, &today_str, FetchStatus::NoData)
                }
            },
            Err(e) => {
                let status = e.to_fetch_status();
                warn!(indicator = indicator.name, status = %status, "지표 수집 실패");
                aggregator.add_fail(1, Some(&format!("{}: {}", indicator.name, status)));
                EconomyRow::failed(now, indicator.name, &today_str, status)
            }
        };
        rows.push(row);
    }

    rows
}

/// 경제지표 작업 전체를 실행합니다.
///
/// `source`가 `Err`이면 그 사유로 실패 1건을 기록하고 건너뜁니다.
pub async fn run_economy_job(
    source: std::result::Result<&dyn IndicatorSource, String>,
    indicators: &[EcosIndicator],
    today: NaiveDate,
    csv_path: &Path,
    persistence: &Persistence<'_>,
    summary: &mut RunSummary,
) -> Result<()> {
    let source = match source {
        Ok(source) => source,
        Err(reason) => return skip_job(TASK_NAME, &reason, persistence, summary).await,
    };

    info!("[경제지표 수집]");
    let mut aggregator = ResultAggregator::new(TASK_NAME);
    aggregator.start();

    let rows = fetch_indicators(source, indicators, today, Utc::now(), &mut aggregator).await;
    persistence.store_rows(TASK_NAME, csv_path, &rows).await;

    finish_job(&aggregator, persistence, summary).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ECOS_DAILY_INDICATORS;
    use crate::modules::persist::testing::MemorySink;
    use async_trait::async_trait;
    use econ_data::{DataError, EcosCycle, EcosRow};
    use std::sync::Mutex;

    /// 받은 조회 조건을 기록하고 항목 코드에 따라 응답하는 소스.
    #[derive(Default)]
    struct FakeEcos {
        queries: Mutex<Vec<EcosQuery>>,
    }

    #[async_trait]
    impl IndicatorSource for FakeEcos {
        async fn statistic_search(&self, query: &EcosQuery) -> econ_data::Result<Vec<EcosRow>> {
            self.queries.lock().unwrap().push(query.clone());
            match query.item_code.as_deref() {
                Some("GOLD") => Ok(Vec::new()),
                Some("DUBAIOIL") => Err(DataError::HttpStatus {
                    status: 500,
                    body: String::new(),
                }),
                _ => Ok(vec![EcosRow {
                    time: query.start.clone(),
                    data_value: "1450.5".to_string(),
                    item_code: query.item_code.clone(),
                    item_name: None,
                }]),
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_indicators() {
        let source = FakeEcos::default();
        let mut aggregator = ResultAggregator::new(TASK_NAME);
        aggregator.start();

        let rows = fetch_indicators(
            &source,
            ECOS_DAILY_INDICATORS,
            today(),
            Utc::now(),
            &mut aggregator,
        )
        .await;

        assert_eq!(rows.len(), 7);
        assert_eq!(aggregator.success_count(), 5);
        assert_eq!(aggregator.fail_count(), 2);

        let usd = &rows[0];
        assert_eq!(usd.indicator, "원/달러 환율");
        assert_eq!(usd.date, "20250106");
        assert_eq!(usd.value, "1450.5");

        // 기준금리는 월 단위로 조회
        let base_rate = &rows[3];
        assert_eq!(base_rate.date, "202501");

        let oil = rows.iter().find(|r| r.indicator == "두바이유 가격").unwrap();
        assert_eq!(oil.status, FetchStatus::HttpError(500));
        assert_eq!(oil.date, "20250106");
        let gold = rows.iter().find(|r| r.indicator == "금 시세").unwrap();
        assert_eq!(gold.status, FetchStatus::NoData);

        let queries = source.queries.lock().unwrap();
        assert_eq!(queries[3].cycle, EcosCycle::Monthly);
        assert_eq!(queries[0].max_rows, 1);
    }

    #[tokio::test]
    async fn test_run_economy_job_points_use_period_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("economy.csv");
        let sink = MemorySink::default();
        let persistence = Persistence::new(Some(&sink), 500);
        let mut summary = RunSummary::new();

        run_economy_job(
            Ok(&FakeEcos::default()),
            &ECOS_DAILY_INDICATORS[..1],
            today(),
            &path,
            &persistence,
            &mut summary,
        )
        .await
        .unwrap();

        let points = sink.points.lock().unwrap();
        assert_eq!(points[0].measurement, "economic_indicators");
        assert_eq!(points[0].tags["period"], "daily");
        assert_eq!(points[0].timestamp.to_rfc3339(), "2025-01-06T12:00:00+00:00");
        assert_eq!(summary.get(TASK_NAME).unwrap().success_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_skips_job() {
        let dir = tempfile::tempdir().unwrap();
        let mut summary = RunSummary::new();

        run_economy_job(
            Err("BOK_API_KEY 미설정".to_string()),
            ECOS_DAILY_INDICATORS,
            today(),
            &dir.path().join("economy.csv"),
            &Persistence::csv_only(),
            &mut summary,
        )
        .await
        .unwrap();

        assert_eq!(summary.get(TASK_NAME).unwrap().fail_count(), 1);
    }
}
