//! 수집 결과 저장 단계.
//!
//! 작업마다 같은 순서로 실행됩니다:
//! 1. 모든 행을 CSV 파일 끝에 추가 (성공/실패 모두)
//! 2. 성공 행만 포인트로 변환해 배치 기록 (시계열 저장소가 활성일 때)
//! 3. 작업 결과를 `system_logs` 포인트로 기록

use chrono::{DateTime, Utc};
use econ_core::{CollectedRow, CollectionResult, ResultAggregator, RunSummary};
use econ_data::storage::append_rows;
use econ_data::{BatchReport, BatchWriter, PointSink};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// 작업이 공유하는 저장 대상.
#[derive(Clone, Copy)]
pub struct Persistence<'a> {
    sink: Option<&'a dyn PointSink>,
    batch_size: usize,
}

impl<'a> Persistence<'a> {
    pub fn new(sink: Option<&'a dyn PointSink>, batch_size: usize) -> Self {
        Self { sink, batch_size }
    }

    /// CSV에만 저장
    pub fn csv_only() -> Self {
        Self::new(None, econ_data::DEFAULT_BATCH_SIZE)
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// 행을 CSV에 추가하고 성공 행을 시계열 저장소에 기록합니다.
    ///
    /// 저장 실패는 로그만 남기고 작업 결과에는 반영하지 않습니다.
    pub async fn store_rows<R>(&self, label: &str, csv_path: &Path, rows: &[R]) -> Option<BatchReport>
    where
        R: CollectedRow + Serialize,
    {
        if rows.is_empty() {
            debug!(label, "저장할 행 없음");
            return None;
        }

        match append_rows(csv_path, rows) {
            Ok(count) => info!(label, path = %csv_path.display(), rows = count, "CSV 저장"),
            Err(e) => error!(label, path = %csv_path.display(), error = %e, "CSV 저장 실패"),
        }

        let sink = self.sink?;
        let succeeded: Vec<&R> = rows.iter().filter(|r| r.status().is_success()).collect();
        if succeeded.is_empty() {
            return None;
        }

        let writer = BatchWriter::new(self.batch_size).with_label(label);
        match writer
            .write_all(&succeeded, |row| row.to_point(), sink, |_| {})
            .await
        {
            Ok(report) => {
                info!(label, points = report.points_written, "InfluxDB 저장 완료");
                Some(report)
            }
            Err(e) => {
                error!(label, error = %e, "InfluxDB 저장 실패");
                Some(e.report)
            }
        }
    }

    /// 작업 결과를 `system_logs` 포인트로 기록합니다.
    pub async fn record_result(&self, result: &CollectionResult, at: DateTime<Utc>) {
        let Some(sink) = self.sink else {
            return;
        };
        let point = result.to_point(at);
        if let Err(e) = sink.write_batch(std::slice::from_ref(&point)).await {
            warn!(task = %result.task_name(), error = %e, "수집 로그 저장 실패");
        }
    }
}

/// 집계를 마치고 결과를 기록한 뒤 요약에 추가합니다.
pub async fn finish_job(
    aggregator: &ResultAggregator,
    persistence: &Persistence<'_>,
    summary: &mut RunSummary,
) -> Result<()> {
    let result = aggregator.finish()?;
    result.log_summary();
    persistence.record_result(&result, Utc::now()).await;
    summary.push(result);
    Ok(())
}

/// 실행할 수 없는 작업을 실패 1건으로 기록합니다 (예: API 키 미설정).
pub async fn skip_job(
    task_name: &str,
    reason: &str,
    persistence: &Persistence<'_>,
    summary: &mut RunSummary,
) -> Result<()> {
    warn!(task = task_name, reason, "작업 건너뜀");
    let mut aggregator = ResultAggregator::new(task_name);
    aggregator.start();
    aggregator.add_fail(1, Some(reason));
    finish_job(&aggregator, persistence, summary).await
}
