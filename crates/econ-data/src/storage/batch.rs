//! 배치 시계열 쓰기.
//!
//! 입력 행을 고정 크기 B개씩 나누어 포인트로 변환한 뒤 저장소에 순서대로 전달합니다.
//!
//! - N개 행은 정확히 `ceil(N/B)`개의 배치가 됩니다.
//! - 변환에 실패한 행은 해당 배치에서만 빠지며 다른 행의 배치 구성은 바뀌지 않습니다.
//! - 저장소 오류가 나면 재시도 없이 남은 배치를 중단합니다.

use async_trait::async_trait;
use econ_core::{ProjectionError, TimeSeriesPoint};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::error::{DataError, Result};

/// 기본 배치 크기
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// 포인트 배치를 받는 저장소.
#[async_trait]
pub trait PointSink: Send + Sync {
    /// 배치 한 개를 기록합니다. 빈 배치가 전달될 수 있습니다.
    async fn write_batch(&self, points: &[TimeSeriesPoint]) -> Result<()>;
}

/// 배치 처리 후 진행 상황.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 완료한 배치 번호 (1부터)
    pub batch: usize,
    pub total_batches: usize,
    /// 지금까지 처리한 행 수
    pub processed: usize,
    /// 지금까지 기록한 포인트 수
    pub written: usize,
    pub total_rows: usize,
}

impl BatchProgress {
    /// 전체 행 대비 기록 비율 (%)
    pub fn percent(&self) -> f64 {
        if self.total_rows == 0 {
            return 100.0;
        }
        self.written as f64 / self.total_rows as f64 * 100.0
    }
}

/// 배치 쓰기 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 저장소에 전달한 배치 수
    pub batches: usize,
    /// 처리한 입력 행 수
    pub rows_seen: usize,
    pub points_written: usize,
    /// 변환 실패로 건너뛴 행 수
    pub points_skipped: usize,
}

/// 저장소 오류로 중단된 배치 쓰기.
#[derive(Debug, Error)]
#[error("배치 {failed_batch} 쓰기 실패 (기록 {written}건 후 중단): {source}", written = .report.points_written)]
pub struct BatchWriteError {
    pub failed_batch: usize,
    /// 중단 시점까지의 결과
    pub report: BatchReport,
    #[source]
    pub source: DataError,
}

/// 고정 크기 배치 작성기.
#[derive(Debug, Clone)]
pub struct BatchWriter {
    batch_size: usize,
    label: String,
}

impl Default for BatchWriter {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchWriter {
    /// 배치 크기 0은 1로 취급합니다.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            label: String::from("data"),
        }
    }

    /// 로그에 표시할 데이터 이름
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 모든 행을 배치 단위로 변환해 기록합니다.
    ///
    /// `on_progress`는 배치가 기록될 때마다 호출됩니다.
    pub async fn write_all<R, F, S, P>(
        &self,
        rows: &[R],
        project: F,
        sink: &S,
        mut on_progress: P,
    ) -> std::result::Result<BatchReport, BatchWriteError>
    where
        F: Fn(&R) -> std::result::Result<TimeSeriesPoint, ProjectionError>,
        S: PointSink + ?Sized,
        P: FnMut(BatchProgress),
    {
        let total_rows = rows.len();
        let total_batches = total_rows.div_ceil(self.batch_size);
        let mut report = BatchReport::default();

        for (idx, chunk) in rows.chunks(self.batch_size).enumerate() {
            let mut points = Vec::with_capacity(chunk.len());
            for row in chunk {
                match project(row) {
                    Ok(point) => points.push(point),
                    Err(e) => {
                        report.points_skipped += 1;
                        debug!(label = %self.label, error = %e, "포인트 변환 실패, 건너뜀");
                    }
                }
            }

            if let Err(e) = sink.write_batch(&points).await {
                error!(
                    label = %self.label,
                    batch = idx + 1,
                    written = report.points_written,
                    error = %e,
                    "배치 쓰기 실패, 남은 배치 중단"
                );
                return Err(BatchWriteError {
                    failed_batch: idx + 1,
                    report,
                    source: e,
                });
            }

            report.batches += 1;
            report.rows_seen += chunk.len();
            report.points_written += points.len();

            let progress = BatchProgress {
                batch: idx + 1,
                total_batches,
                processed: report.rows_seen,
                written: report.points_written,
                total_rows,
            };
            info!(
                label = %self.label,
                written = progress.written,
                total = total_rows,
                progress = format!("{:.1}%", progress.percent()),
                "배치 기록"
            );
            on_progress(progress);
        }

        Ok(report)
    }
}
