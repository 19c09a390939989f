//! 히스토리 데이터 수집.
//!
//! 지정한 구간의 한국/미국 일봉, FRED 관측치, ECOS 통계를 받아
//! `{archive}/{dataset}_{suffix}.csv`로 저장합니다 (기존 파일 덮어쓰기).
//! 항목 단위 실패는 경고 후 건너뜁니다.

use chrono::NaiveDate;
use econ_core::{IndicatorObservation, PriceBar};
use econ_data::storage::write_rows;
use econ_data::{
    EcosClient, EcosQuery, FredClient, IndicatorSource, QuoteSource, SeriesSource,
    YahooQuoteClient,
};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::{
    EcosIndicator, HistoricalDataset, ECOS_HISTORY_INDICATORS, FRED_INDICATORS, KR_TICKERS,
    US_TICKERS,
};
use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};

/// 히스토리 조회 타임아웃
const HISTORY_TIMEOUT: Duration = Duration::from_secs(30);

/// 수집 구간과 요청 간격.
#[derive(Debug, Clone, Copy)]
pub struct HistoryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub delay: Duration,
}

impl HistoryWindow {
    pub fn new(start: NaiveDate, end: NaiveDate, delay: Duration) -> Result<Self> {
        if start > end {
            return Err(CollectorError::Config(format!(
                "시작일({})이 종료일({})보다 늦습니다",
                start, end
            )));
        }
        Ok(Self { start, end, delay })
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// 종목별 일봉을 수집합니다.
pub async fn collect_price_history(
    source: &dyn QuoteSource,
    tickers: &[(&str, &str)],
    window: &HistoryWindow,
) -> Vec<PriceBar> {
    let mut bars = Vec::new();

    for &(name, ticker) in tickers {
        match source.history(ticker, window.start, window.end).await {
            Ok(history) if history.is_empty() => warn!(name, ticker, "일봉 데이터 없음"),
            Ok(history) => {
                info!(name, ticker, count = history.len(), "일봉 수집");
                bars.extend(history.into_iter().map(|bar| {
                    PriceBar::new(
                        bar.date, name, ticker, bar.open, bar.high, bar.low, bar.close, bar.volume,
                    )
                }));
            }
            Err(e) => warn!(name, ticker, error = %e, "일봉 수집 실패"),
        }
        window.pause().await;
    }

    bars
}

/// FRED 시리즈 관측치를 수집합니다.
pub async fn collect_fred_history(
    source: &dyn SeriesSource,
    series: &[(&str, &str)],
    window: &HistoryWindow,
) -> Vec<IndicatorObservation> {
    let mut observations = Vec::new();

    for &(series_id, name) in series {
        match source.observations(series_id, window.start, window.end).await {
            Ok(found) => {
                info!(indicator = name, series_id, count = found.len(), "FRED 수집");
                observations.extend(
                    found
                        .into_iter()
                        .map(|o| IndicatorObservation::new(o.date, name, o.value, series_id)),
                );
            }
            Err(e) => warn!(indicator = name, series_id, error = %e, "FRED 수집 실패"),
        }
        window.pause().await;
    }

    observations
}

/// ECOS 통계를 수집합니다.
///
/// 항목 코드가 없는 통계표는 항목마다 `{이름} - {항목명}` 지표와
/// `{통계코드}_{항목코드}` 시리즈 ID를 가집니다.
pub async fn collect_ecos_history(
    source: &dyn IndicatorSource,
    indicators: &[EcosIndicator],
    window: &HistoryWindow,
) -> Vec<IndicatorObservation> {
    let mut observations = Vec::new();

    for indicator in indicators {
        let item = indicator.has_item().then_some(indicator.item_code);
        let query = EcosQuery::range(
            indicator.stat_code,
            indicator.cycle,
            item,
            window.start,
            window.end,
        );

        match source.statistic_search(&query).await {
            Ok(rows) if rows.is_empty() => warn!(indicator = indicator.name, "ECOS 데이터 없음"),
            Ok(rows) => {
                let before = observations.len();
                for row in rows {
                    let Some(date) = indicator.cycle.parse_time(&row.time) else {
                        debug!(indicator = indicator.name, time = %row.time, "알 수 없는 시점, 건너뜀");
                        continue;
                    };
                    if row.data_value.trim().is_empty() {
                        continue;
                    }

                    let (label, series_id) = match item {
                        Some(code) => (
                            indicator.name.to_string(),
                            format!("{}_{}", indicator.stat_code, code),
                        ),
                        None => (
                            match row.item_name.as_deref() {
                                Some(item_name) => format!("{} - {}", indicator.name, item_name),
                                None => indicator.name.to_string(),
                            },
                            format!(
                                "{}_{}",
                                indicator.stat_code,
                                row.item_code.as_deref().unwrap_or_default()
                            ),
                        ),
                    };
                    observations.push(IndicatorObservation::new(
                        date,
                        label,
                        row.data_value,
                        series_id,
                    ));
                }
                info!(
                    indicator = indicator.name,
                    count = observations.len() - before,
                    "ECOS 수집"
                );
            }
            Err(e) => warn!(indicator = indicator.name, error = %e, "ECOS 수집 실패"),
        }
        window.pause().await;
    }

    observations
}

/// 데이터셋 파일을 저장하고 건수를 반환합니다. 행이 없으면 파일을 만들지 않습니다.
pub fn save_dataset<R: Serialize>(
    archive_dir: &Path,
    dataset: HistoricalDataset,
    suffix: &str,
    rows: &[R],
) -> Result<usize> {
    if rows.is_empty() {
        warn!(dataset = dataset.label(), "수집된 데이터 없음, 저장 안 함");
        return Ok(0);
    }
    let path = archive_dir.join(dataset.file_name(suffix));
    let count = write_rows(&path, rows)?;
    info!(dataset = dataset.label(), path = %path.display(), rows = count, "히스토리 저장");
    Ok(count)
}

/// 데이터셋별 저장 건수.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryReport {
    pub saved: Vec<(HistoricalDataset, usize)>,
}

impl HistoryReport {
    pub fn total(&self) -> usize {
        self.saved.iter().map(|(_, n)| n).sum()
    }
}

/// 네 데이터셋을 순서대로 수집해 저장합니다.
///
/// API 키가 없는 데이터셋은 건너뜁니다.
pub async fn run_historical(
    config: &CollectorConfig,
    window: HistoryWindow,
    suffix: &str,
) -> Result<HistoryReport> {
    info!(start = %window.start, end = %window.end, suffix, "히스토리 수집 시작");
    let archive = config.archive_dir();
    let mut report = HistoryReport::default();

    let yahoo = YahooQuoteClient::new()?;
    for (dataset, tickers) in [
        (HistoricalDataset::StockKr, KR_TICKERS),
        (HistoricalDataset::StockUs, US_TICKERS),
    ] {
        info!(dataset = dataset.label(), tickers = tickers.len(), "주가 수집");
        let bars = collect_price_history(&yahoo, tickers, &window).await;
        report
            .saved
            .push((dataset, save_dataset(&archive, dataset, suffix, &bars)?));
    }

    match &config.fred_api_key {
        Some(key) => {
            let fred = FredClient::new(key)?;
            let observations = collect_fred_history(&fred, FRED_INDICATORS, &window).await;
            let dataset = HistoricalDataset::EconomyFred;
            report
                .saved
                .push((dataset, save_dataset(&archive, dataset, suffix, &observations)?));
        }
        None => warn!("FRED_API_KEY 미설정, FRED 수집 건너뜀"),
    }

    match &config.bok_api_key {
        Some(key) => {
            let ecos = EcosClient::new(key, HISTORY_TIMEOUT)?;
            let observations = collect_ecos_history(&ecos, ECOS_HISTORY_INDICATORS, &window).await;
            let dataset = HistoricalDataset::EconomyEcos;
            report
                .saved
                .push((dataset, save_dataset(&archive, dataset, suffix, &observations)?));
        }
        None => warn!("BOK_API_KEY 미설정, ECOS 수집 건너뜀"),
    }

    for (dataset, count) in &report.saved {
        info!(dataset = dataset.label(), rows = count, "수집 결과");
    }
    info!(total = report.total(), "히스토리 수집 완료");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use econ_data::storage::read_rows;
    use econ_data::{DailyBar, DataError, EcosCycle, EcosRow, FredObservation};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> HistoryWindow {
        HistoryWindow::new(date(2020, 1, 1), date(2020, 12, 31), Duration::ZERO).unwrap()
    }

    struct FakeHistory;

    #[async_trait]
    impl QuoteSource for FakeHistory {
        async fn latest_bar(&self, _ticker: &str) -> econ_data::Result<Option<DailyBar>> {
            Ok(None)
        }

        async fn history(
            &self,
            ticker: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> econ_data::Result<Vec<DailyBar>> {
            if ticker == "FAIL" {
                return Err(DataError::FetchError("timeout".to_string()));
            }
            Ok((0..3)
                .map(|i| DailyBar {
                    date: start + chrono::Days::new(i),
                    open: 1.0,
                    high: 2.0,
                    low: 0.5,
                    close: 1.5,
                    volume: 100,
                })
                .collect())
        }
    }

    struct FakeFred;

    #[async_trait]
    impl SeriesSource for FakeFred {
        async fn observations(
            &self,
            series_id: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> econ_data::Result<Vec<FredObservation>> {
            Ok(vec![FredObservation {
                date: start,
                value: format!("{}.5", series_id.len()),
            }])
        }
    }

    struct FakeEcos;

    #[async_trait]
    impl IndicatorSource for FakeEcos {
        async fn statistic_search(&self, query: &EcosQuery) -> econ_data::Result<Vec<EcosRow>> {
            let row = |time: &str, value: &str, code: &str, name: &str| EcosRow {
                time: time.to_string(),
                data_value: value.to_string(),
                item_code: Some(code.to_string()),
                item_name: Some(name.to_string()),
            };
            Ok(match query.cycle {
                EcosCycle::Quarterly => vec![
                    row("2020Q1", "-1.3", "10111", "국내총생산(실질, 전기비)"),
                    row("2020Q1", "1.5", "10211", "국내총생산(실질, 전년동기비)"),
                    row("2020Q2", "", "10111", "국내총생산(실질, 전기비)"),
                ],
                _ => vec![
                    row("202001", "105.8", "0", "총지수"),
                    row("2020-13", "1.0", "0", "총지수"),
                ],
            })
        }
    }

    #[tokio::test]
    async fn test_price_history_skips_failures() {
        let tickers = [("코스피", "^KS11"), ("실패", "FAIL")];
        let bars = collect_price_history(&FakeHistory, &tickers, &window()).await;

        assert_eq!(bars.len(), 3);
        assert!(bars.iter().all(|b| b.name == "코스피" && b.ticker == "^KS11"));
        assert_eq!(bars[2].date, date(2020, 1, 3));
    }

    #[tokio::test]
    async fn test_fred_history() {
        let observations = collect_fred_history(&FakeFred, FRED_INDICATORS, &window()).await;

        assert_eq!(observations.len(), 10);
        assert_eq!(observations[0].indicator, "미국 GDP");
        assert_eq!(observations[0].series_id, "GDP");
        assert_eq!(observations[0].value, "3.5");
    }

    #[tokio::test]
    async fn test_ecos_history_labels() {
        let observations =
            collect_ecos_history(&FakeEcos, ECOS_HISTORY_INDICATORS, &window()).await;

        // 월별 2개 지표 x 유효 1행 + 분기 유효 2행
        assert_eq!(observations.len(), 4);

        let cpi = &observations[0];
        assert_eq!(cpi.indicator, "한국 소비자물가지수");
        assert_eq!(cpi.series_id, "901Y009_0");
        assert_eq!(cpi.date, date(2020, 1, 1));

        let gdp: Vec<&IndicatorObservation> = observations
            .iter()
            .filter(|o| o.series_id.starts_with("200Y102"))
            .collect();
        assert_eq!(gdp.len(), 2);
        assert_eq!(gdp[0].indicator, "한국 GDP 주요지표 - 국내총생산(실질, 전기비)");
        assert_eq!(gdp[0].series_id, "200Y102_10111");
        assert_eq!(gdp[0].date, date(2020, 3, 1));
        assert_eq!(gdp[1].series_id, "200Y102_10211");
    }

    #[test]
    fn test_save_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![IndicatorObservation::new(date(2020, 1, 1), "VIX", "13.8", "VIXCLS")];

        let saved =
            save_dataset(dir.path(), HistoricalDataset::EconomyFred, "2020_2020", &rows).unwrap();
        assert_eq!(saved, 1);

        let path = dir.path().join("economy_fred_2020_2020.csv");
        assert_eq!(read_rows::<IndicatorObservation>(&path).unwrap().rows, rows);

        let empty: Vec<PriceBar> = Vec::new();
        assert_eq!(
            save_dataset(dir.path(), HistoricalDataset::StockKr, "x", &empty).unwrap(),
            0
        );
        assert!(!dir.path().join("stock_kr_x.csv").exists());
    }

    #[test]
    fn test_window_rejects_reversed_dates() {
        assert!(HistoryWindow::new(date(2021, 1, 1), date(2020, 1, 1), Duration::ZERO).is_err());
    }
}
