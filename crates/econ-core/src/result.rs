//! 수집 결과 집계.
//!
//! 작업(job) 한 번의 성공/실패 건수와 소요 시간을 누적하고,
//! 완료 시 변경 불가능한 [`CollectionResult`]를 만듭니다.
//!
//! ```rust
//! use econ_core::ResultAggregator;
//!
//! let mut agg = ResultAggregator::new("stock");
//! agg.start();
//! agg.add_success(5);
//! agg.add_fail(2, Some("timeout on X"));
//! let result = agg.finish().unwrap();
//! assert_eq!(result.total_count(), 7);
//! assert_eq!(result.error_rate(), 28.57);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{CoreError, Result};
use crate::point::TimeSeriesPoint;
use crate::text::truncate_chars;

/// 보관하는 에러 메시지 최대 개수
pub const MAX_STORED_ERRORS: usize = 5;
/// 에러 메시지 최대 길이 (문자 수)
pub const MAX_ERROR_CHARS: usize = 100;
/// 작업 로그 measurement
pub const SYSTEM_LOGS_MEASUREMENT: &str = "system_logs";

/// 실패율 계산 (%, 소수점 2자리 반올림).
///
/// 전체 건수가 0이면 0.0을 반환합니다.
pub fn error_rate(success: u64, fail: u64) -> f64 {
    let total = success + fail;
    if total == 0 {
        return 0.0;
    }
    let rate = fail as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// 작업 한 번의 최종 수집 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResult {
    task_name: String,
    success_count: u64,
    fail_count: u64,
    total_count: u64,
    error_rate: f64,
    execution_time_ms: u64,
    errors: Vec<String>,
}

impl CollectionResult {
    /// 집계기 없이 건수로 결과를 생성합니다.
    ///
    /// 에러 메시지에는 집계기와 동일한 제한(5개, 100자)이 적용됩니다.
    pub fn from_counts<I, S>(
        task_name: impl Into<String>,
        success_count: u64,
        fail_count: u64,
        execution_time_ms: u64,
        errors: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let errors = errors
            .into_iter()
            .take(MAX_STORED_ERRORS)
            .map(|e| truncate_chars(e.as_ref(), MAX_ERROR_CHARS))
            .collect();

        Self {
            task_name: task_name.into(),
            success_count,
            fail_count,
            total_count: success_count + fail_count,
            error_rate: error_rate(success_count, fail_count),
            execution_time_ms,
            errors,
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn fail_count(&self) -> u64 {
        self.fail_count
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// 실패율 (%)
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn execution_time_ms(&self) -> u64 {
        self.execution_time_ms
    }

    pub fn execution_time(&self) -> Duration {
        Duration::from_millis(self.execution_time_ms)
    }

    /// 보관된 에러 메시지 (최대 5개, 입력 순서 유지)
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// 실패가 한 건이라도 있는지 여부.
    pub fn has_failures(&self) -> bool {
        self.fail_count > 0
    }

    /// `system_logs` 포인트로 변환합니다.
    pub fn to_point(&self, at: DateTime<Utc>) -> TimeSeriesPoint {
        TimeSeriesPoint::new(SYSTEM_LOGS_MEASUREMENT, at)
            .tag("task_name", self.task_name.as_str())
            .field("execution_time_ms", self.execution_time_ms as i64)
            .field("success_count", self.success_count as i64)
            .field("fail_count", self.fail_count as i64)
            .field("total_count", self.total_count as i64)
            .field("error_rate", self.error_rate)
    }

    /// 결과 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            task = %self.task_name,
            success = self.success_count,
            fail = self.fail_count,
            total = self.total_count,
            error_rate = format!("{:.2}%", self.error_rate),
            elapsed = format!("{:.1}s", self.execution_time().as_secs_f64()),
            "수집 완료"
        );
    }
}

/// 작업 한 번의 성공/실패를 누적하는 집계기.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    task_name: String,
    started_at: Option<Instant>,
    success_count: u64,
    fail_count: u64,
    errors: Vec<String>,
}

impl ResultAggregator {
    /// 새 집계기를 생성합니다.
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            started_at: None,
            success_count: 0,
            fail_count: 0,
            errors: Vec::new(),
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// 카운터를 초기화하고 시작 시각을 기록합니다.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
        self.success_count = 0;
        self.fail_count = 0;
        self.errors.clear();
    }

    /// 성공 건수 추가
    pub fn add_success(&mut self, count: u64) {
        self.success_count += count;
    }

    /// 실패 건수 추가.
    ///
    /// 메시지는 최대 5개까지 100자로 잘라 입력 순서대로 보관합니다.
    pub fn add_fail(&mut self, count: u64, message: Option<&str>) {
        self.fail_count += count;
        if let Some(msg) = message {
            if self.errors.len() < MAX_STORED_ERRORS {
                self.errors.push(truncate_chars(msg, MAX_ERROR_CHARS));
            }
        }
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn fail_count(&self) -> u64 {
        self.fail_count
    }

    /// 수집을 마치고 결과를 반환합니다.
    ///
    /// `start()` 전에 호출하면 [`CoreError::InvalidState`]를 반환합니다.
    pub fn finish(&self) -> Result<CollectionResult> {
        let started_at = self.started_at.ok_or_else(|| {
            CoreError::InvalidState(format!("'{}' 집계가 시작되지 않았습니다", self.task_name))
        })?;

        let execution_time_ms = started_at.elapsed().as_millis() as u64;

        Ok(CollectionResult {
            task_name: self.task_name.clone(),
            success_count: self.success_count,
            fail_count: self.fail_count,
            total_count: self.success_count + self.fail_count,
            error_rate: error_rate(self.success_count, self.fail_count),
            execution_time_ms,
            errors: self.errors.clone(),
        })
    }
}
