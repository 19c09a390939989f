//! 한 번의 실행(run) 전체 결과.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::result::CollectionResult;

/// 작업별 [`CollectionResult`]를 실행 순서대로 모은 요약.
///
/// 실행 오케스트레이터가 소유하며 각 작업에 `&mut`로 전달됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    results: Vec<CollectionResult>,
    total_elapsed_ms: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 작업 결과 추가
    pub fn push(&mut self, result: CollectionResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[CollectionResult] {
        &self.results
    }

    /// 작업 이름으로 결과 조회
    pub fn get(&self, task_name: &str) -> Option<&CollectionResult> {
        self.results.iter().find(|r| r.task_name() == task_name)
    }

    pub fn set_total_elapsed(&mut self, elapsed: Duration) {
        self.total_elapsed_ms = elapsed.as_millis() as u64;
    }

    pub fn total_elapsed_ms(&self) -> u64 {
        self.total_elapsed_ms
    }

    /// 실패가 있는 작업이 하나라도 있는지 여부.
    pub fn has_error(&self) -> bool {
        self.results.iter().any(CollectionResult::has_failures)
    }

    pub fn total_success(&self) -> u64 {
        self.results.iter().map(CollectionResult::success_count).sum()
    }

    pub fn total_fail(&self) -> u64 {
        self.results.iter().map(CollectionResult::fail_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_error_when_any_job_failed() {
        let mut summary = RunSummary::new();
        assert!(!summary.has_error());

        summary.push(CollectionResult::from_counts("news", 20, 0, 1200, Vec::<String>::new()));
        assert!(!summary.has_error());

        summary.push(CollectionResult::from_counts("stock", 60, 8, 45000, ["no_data"]));
        summary.set_total_elapsed(Duration::from_millis(46_500));

        assert!(summary.has_error());
        assert_eq!(summary.total_success(), 80);
        assert_eq!(summary.total_fail(), 8);
        assert_eq!(summary.total_elapsed_ms(), 46_500);
        assert_eq!(summary.get("stock").map(|r| r.fail_count()), Some(8));
        assert!(summary.get("economy").is_none());
    }
}
