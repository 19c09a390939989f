//! 병합된 히스토리 파일을 InfluxDB에 일괄 기록.
//!
//! 데이터셋마다 독립적으로 실행되며, 한 데이터셋의 쓰기 실패는
//! 그 데이터셋의 남은 배치만 중단합니다.

use econ_core::{IndicatorObservation, PriceBar, ToPoint};
use econ_data::storage::read_rows;
use econ_data::{BatchProgress, BatchReport, BatchWriter, PointSink};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{error, info, warn};

use crate::catalog::HistoricalDataset;

/// 기본 입력 접미사
pub const DEFAULT_INPUT_SUFFIX: &str = "2010_2025";

/// 데이터셋 한 개의 백필 결과.
#[derive(Debug)]
pub struct BackfillOutcome {
    pub dataset: HistoricalDataset,
    /// 파일에서 읽은 행 수
    pub rows: usize,
    /// 형식 오류로 읽지 못한 행 수
    pub unreadable: usize,
    pub result: std::result::Result<BatchReport, String>,
}

impl BackfillOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn points_written(&self) -> usize {
        match &self.result {
            Ok(report) => report.points_written,
            Err(_) => 0,
        }
    }
}

/// 진행률 표시 줄.
pub fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// 데이터셋 파일 한 개를 기록합니다.
///
/// 파일이 없으면 `None`. 파일을 읽지 못하면 실패한 결과를 돌려줍니다.
/// `show_progress`가 거짓이면 진행률을 그리지 않습니다.
pub async fn backfill_dataset(
    data_dir: &Path,
    dataset: HistoricalDataset,
    suffix: &str,
    sink: &dyn PointSink,
    batch_size: usize,
    show_progress: bool,
) -> Option<BackfillOutcome> {
    let path = data_dir.join(dataset.file_name(suffix));
    if !path.exists() {
        warn!(dataset = dataset.label(), path = %path.display(), "파일 없음, 건너뜀");
        return None;
    }

    info!(dataset = dataset.label(), path = %path.display(), "백필 시작");
    let writer = BatchWriter::new(batch_size).with_label(dataset.label());

    let outcome = match dataset.period() {
        None => {
            let read = match read_rows::<PriceBar>(&path) {
                Ok(read) => read,
                Err(e) => return Some(unreadable_file(dataset, &path, e)),
            };
            let pb = make_bar(read.rows.len(), show_progress);
            let result = writer
                .write_all(&read.rows, |b| b.to_point(), sink, |p| advance(&pb, p))
                .await;
            finish_bar(&pb, &result);
            BackfillOutcome {
                dataset,
                rows: read.rows.len(),
                unreadable: read.skipped,
                result: result.map_err(|e| e.to_string()),
            }
        }
        Some(period) => {
            let read = match read_rows::<IndicatorObservation>(&path) {
                Ok(read) => read,
                Err(e) => return Some(unreadable_file(dataset, &path, e)),
            };
            let pb = make_bar(read.rows.len(), show_progress);
            let result = writer
                .write_all(&read.rows, |o| o.to_point(period), sink, |p| advance(&pb, p))
                .await;
            finish_bar(&pb, &result);
            BackfillOutcome {
                dataset,
                rows: read.rows.len(),
                unreadable: read.skipped,
                result: result.map_err(|e| e.to_string()),
            }
        }
    };

    match &outcome.result {
        Ok(report) => info!(
            dataset = dataset.label(),
            written = report.points_written,
            skipped = report.points_skipped,
            batches = report.batches,
            "백필 완료"
        ),
        Err(e) => error!(dataset = dataset.label(), error = %e, "백필 중단"),
    }
    Some(outcome)
}

fn unreadable_file(
    dataset: HistoricalDataset,
    path: &Path,
    e: impl std::fmt::Display,
) -> BackfillOutcome {
    error!(dataset = dataset.label(), path = %path.display(), error = %e, "파일 읽기 실패");
    BackfillOutcome {
        dataset,
        rows: 0,
        unreadable: 0,
        result: Err(format!("파일 읽기 실패: {}", e)),
    }
}

/// 네 데이터셋을 순서대로 기록합니다. 한 데이터셋의 실패는 다음 데이터셋을 막지 않습니다.
pub async fn run_backfill(
    data_dir: &Path,
    suffix: &str,
    sink: &dyn PointSink,
    batch_size: usize,
    show_progress: bool,
) -> Vec<BackfillOutcome> {
    let mut outcomes = Vec::new();
    for dataset in HistoricalDataset::ALL {
        if let Some(outcome) =
            backfill_dataset(data_dir, dataset, suffix, sink, batch_size, show_progress).await
        {
            outcomes.push(outcome);
        }
    }

    let written: usize = outcomes.iter().map(BackfillOutcome::points_written).sum();
    info!(datasets = outcomes.len(), written, "전체 백필 완료");
    outcomes
}

fn make_bar(total: usize, visible: bool) -> ProgressBar {
    if visible {
        progress_bar(total)
    } else {
        ProgressBar::hidden()
    }
}

fn advance(pb: &ProgressBar, progress: BatchProgress) {
    pb.set_position(progress.processed as u64);
    pb.set_message(format!("{}/{} 배치", progress.batch, progress.total_batches));
}

fn finish_bar<T, E>(pb: &ProgressBar, result: &std::result::Result<T, E>) {
    if result.is_ok() {
        pb.finish_with_message("완료");
    } else {
        pb.abandon_with_message("중단");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persist::testing::MemorySink;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use econ_core::TimeSeriesPoint;
    use econ_data::storage::write_rows;
    use econ_data::DataError;
    use std::sync::Mutex;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, day).unwrap()
    }

    /// 두 번째 배치부터 실패하는 저장소.
    #[derive(Default)]
    struct FlakySink {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl PointSink for FlakySink {
        async fn write_batch(&self, _points: &[TimeSeriesPoint]) -> econ_data::Result<()> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls >= 2 {
                return Err(DataError::WriteError("timeout".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_backfill_indicators_with_period_tag() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            IndicatorObservation::new(date(1), "한국 소비자물가지수", "105.8", "901Y009_0"),
            IndicatorObservation::new(date(2), "한국 소비자물가지수", "N/A", "901Y009_0"),
        ];
        write_rows(&dir.path().join("economy_ecos_2010_2025.csv"), &rows).unwrap();

        let sink = MemorySink::default();
        let outcome = backfill_dataset(
            dir.path(),
            HistoricalDataset::EconomyEcos,
            DEFAULT_INPUT_SUFFIX,
            &sink,
            500,
            false,
        )
        .await
        .unwrap();

        let report = outcome.result.unwrap();
        assert_eq!(report.points_written, 1);
        assert_eq!(report.points_skipped, 1);

        let points = sink.points.lock().unwrap();
        assert_eq!(points[0].tags["period"], "monthly");
        assert_eq!(points[0].timestamp.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_sink_failure_isolated_per_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let bars: Vec<PriceBar> = (1..=5)
            .map(|d| PriceBar::new(date(d), "코스피", "^KS11", 1.0, 2.0, 0.5, 1.5, 100))
            .collect();
        write_rows(&dir.path().join("stock_kr_s.csv"), &bars).unwrap();
        write_rows(
            &dir.path().join("economy_fred_s.csv"),
            &[IndicatorObservation::new(date(1), "VIX", "13.8", "VIXCLS")],
        )
        .unwrap();

        let sink = FlakySink::default();
        let outcomes = run_backfill(dir.path(), "s", &sink, 2, false).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].dataset, HistoricalDataset::StockKr);
        assert!(!outcomes[0].is_success());
        // FRED 데이터셋은 별도로 시도되지만 같은 저장소가 계속 실패
        assert_eq!(outcomes[1].dataset, HistoricalDataset::EconomyFred);
        assert_eq!(*sink.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unreadable_file_does_not_stop_other_datasets() {
        let dir = tempfile::tempdir().unwrap();
        // 읽을 수 없는 주가 파일 (디렉터리)
        std::fs::create_dir(dir.path().join("stock_kr_s.csv")).unwrap();
        write_rows(
            &dir.path().join("economy_fred_s.csv"),
            &[IndicatorObservation::new(date(1), "VIX", "13.8", "VIXCLS")],
        )
        .unwrap();

        let sink = MemorySink::default();
        let outcomes = run_backfill(dir.path(), "s", &sink, 500, false).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].dataset, HistoricalDataset::StockKr);
        assert!(!outcomes[0].is_success());
        assert_eq!(outcomes[0].rows, 0);
        assert!(outcomes[0].result.as_ref().unwrap_err().contains("파일 읽기 실패"));

        assert_eq!(outcomes[1].dataset, HistoricalDataset::EconomyFred);
        assert!(outcomes[1].is_success());
        assert_eq!(outcomes[1].points_written(), 1);
        assert_eq!(sink.measurements(), vec!["economic_indicators".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::default();
        let outcomes = run_backfill(dir.path(), "none", &sink, 500, false).await;
        assert!(outcomes.is_empty());
    }
}
