//! 히스토리 데이터 병합.
//!
//! 여러 구간의 행을 이어 붙인 뒤 `(식별자, 날짜)` 기준으로 중복을 제거하고
//! (나중 행 우선) `(식별자, 날짜)` 오름차순으로 정렬합니다.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::row::{IndicatorObservation, PriceBar};

/// 병합 키를 제공하는 행.
pub trait MergeKey {
    /// 종목 코드 또는 지표 시리즈 ID
    fn identifier(&self) -> &str;
    fn date(&self) -> NaiveDate;
}

impl MergeKey for PriceBar {
    fn identifier(&self) -> &str {
        &self.ticker
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl MergeKey for IndicatorObservation {
    fn identifier(&self) -> &str {
        &self.series_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// 병합 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome<R> {
    /// 중복 제거 및 정렬된 행
    pub rows: Vec<R>,
    /// 병합 전 전체 행 수
    pub before: usize,
}

impl<R> MergeOutcome<R> {
    pub fn after(&self) -> usize {
        self.rows.len()
    }

    pub fn duplicates_removed(&self) -> usize {
        self.before - self.rows.len()
    }
}

/// 행 묶음들을 병합합니다.
///
/// 같은 `(식별자, 날짜)`가 여러 번 나오면 가장 뒤에 있는 행만 남깁니다.
pub fn merge_rows<R, I>(parts: I) -> MergeOutcome<R>
where
    R: MergeKey,
    I: IntoIterator<Item = Vec<R>>,
{
    let all: Vec<R> = parts.into_iter().flatten().collect();
    let before = all.len();

    let mut last_index: HashMap<(String, NaiveDate), usize> = HashMap::with_capacity(before);
    for (idx, row) in all.iter().enumerate() {
        last_index.insert((row.identifier().to_string(), row.date()), idx);
    }

    let mut rows: Vec<R> = all
        .into_iter()
        .enumerate()
        .filter(|(idx, row)| {
            last_index.get(&(row.identifier().to_string(), row.date())) == Some(idx)
        })
        .map(|(_, row)| row)
        .collect();

    rows.sort_by(|a, b| {
        a.identifier()
            .cmp(b.identifier())
            .then_with(|| a.date().cmp(&b.date()))
    });

    MergeOutcome { rows, before }
}
