//! CSV 행 저장소.
//!
//! 모든 파일은 UTF-8 BOM으로 시작합니다. 추가 모드에서는 파일이 새로 만들어질 때만
//! 헤더를 기록합니다.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;

/// UTF-8 BOM
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 읽기 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRead<R> {
    pub rows: Vec<R>,
    /// 형식 오류로 건너뛴 행 수
    pub skipped: usize,
}

/// 행을 파일 끝에 추가합니다.
///
/// 파일이 없거나 비어 있으면 BOM과 헤더를 먼저 기록합니다.
pub fn append_rows<R: Serialize>(path: &Path, rows: &[R]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    ensure_parent(path)?;

    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if is_new {
        file.write_all(UTF8_BOM)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), header = is_new, "CSV 추가 저장");
    Ok(rows.len())
}

/// 파일을 새로 작성합니다 (기존 내용 덮어쓰기).
pub fn write_rows<R: Serialize>(path: &Path, rows: &[R]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    ensure_parent(path)?;

    let mut file = fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "CSV 저장");
    Ok(rows.len())
}

/// 파일의 모든 행을 읽습니다.
///
/// 선두 BOM은 제거하며, 형식이 맞지 않는 행은 경고 후 건너뜁니다.
pub fn read_rows<R: DeserializeOwned>(path: &Path) -> Result<CsvRead<R>> {
    let bytes = fs::read(path)?;
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content);

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (idx, record) in reader.deserialize::<R>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!(path = %path.display(), line = idx + 2, error = %e, "CSV 행 변환 실패, 건너뜀");
            }
        }
    }

    Ok(CsvRead { rows, skipped })
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
