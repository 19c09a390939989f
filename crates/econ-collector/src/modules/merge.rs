//! 구간별 히스토리 파일 병합.
//!
//! `{archive}/{dataset}_{part}.csv`들을 읽어 `(식별자, 날짜)` 중복을 제거하고
//! `{data_dir}/{dataset}_{output_suffix}.csv`로 저장합니다.

use econ_core::{merge_rows, IndicatorObservation, MergeKey, PriceBar};
use econ_data::storage::{read_rows, write_rows};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::catalog::HistoricalDataset;
use crate::error::Result;

/// 기본 입력 구간
pub const DEFAULT_PARTS: &[&str] = &["2010_2014_v3", "2015_2019_v3", "2020_2025_v3"];

/// 기본 출력 접미사
pub const DEFAULT_OUTPUT_SUFFIX: &str = "2010_2025";

/// 데이터셋 한 개의 병합 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStats {
    pub dataset: HistoricalDataset,
    /// 읽은 구간 파일 수
    pub parts_read: usize,
    pub before: usize,
    pub after: usize,
}

impl MergeStats {
    pub fn duplicates_removed(&self) -> usize {
        self.before - self.after
    }
}

/// 데이터셋 한 개를 병합합니다.
///
/// 읽을 수 있는 구간 파일이 하나도 없으면 `None`.
pub fn merge_dataset(
    archive_dir: &Path,
    output_dir: &Path,
    dataset: HistoricalDataset,
    parts: &[String],
    output_suffix: &str,
) -> Result<Option<MergeStats>> {
    match dataset {
        HistoricalDataset::StockKr | HistoricalDataset::StockUs => {
            merge_files::<PriceBar>(archive_dir, output_dir, dataset, parts, output_suffix)
        }
        HistoricalDataset::EconomyFred | HistoricalDataset::EconomyEcos => {
            merge_files::<IndicatorObservation>(archive_dir, output_dir, dataset, parts, output_suffix)
        }
    }
}

fn merge_files<R>(
    archive_dir: &Path,
    output_dir: &Path,
    dataset: HistoricalDataset,
    parts: &[String],
    output_suffix: &str,
) -> Result<Option<MergeStats>>
where
    R: MergeKey + Serialize + DeserializeOwned,
{
    let mut loaded: Vec<Vec<R>> = Vec::with_capacity(parts.len());

    for part in parts {
        let path = archive_dir.join(dataset.file_name(part));
        if !path.exists() {
            warn!(dataset = dataset.label(), path = %path.display(), "구간 파일 없음, 건너뜀");
            continue;
        }
        let read = read_rows::<R>(&path)?;
        info!(
            dataset = dataset.label(),
            part = %part,
            rows = read.rows.len(),
            skipped = read.skipped,
            "구간 파일 읽기"
        );
        loaded.push(read.rows);
    }

    if loaded.is_empty() {
        warn!(dataset = dataset.label(), "병합할 파일 없음");
        return Ok(None);
    }

    let parts_read = loaded.len();
    let outcome = merge_rows(loaded);
    let output = output_dir.join(dataset.file_name(output_suffix));
    write_rows(&output, &outcome.rows)?;

    let stats = MergeStats {
        dataset,
        parts_read,
        before: outcome.before,
        after: outcome.after(),
    };
    info!(
        dataset = dataset.label(),
        before = stats.before,
        after = stats.after,
        removed = stats.duplicates_removed(),
        path = %output.display(),
        "병합 완료"
    );
    Ok(Some(stats))
}

/// 네 데이터셋을 모두 병합합니다.
pub fn run_merge(
    archive_dir: &Path,
    output_dir: &Path,
    parts: &[String],
    output_suffix: &str,
) -> Result<Vec<MergeStats>> {
    let mut merged = Vec::new();
    for dataset in HistoricalDataset::ALL {
        if let Some(stats) = merge_dataset(archive_dir, output_dir, dataset, parts, output_suffix)? {
            merged.push(stats);
        }
    }
    Ok(merged)
}
