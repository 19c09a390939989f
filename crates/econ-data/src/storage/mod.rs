//! 저장소 모듈.
//!
//! - `csv_sink`: 카테고리별 CSV 파일 (BOM, 헤더 1회)
//! - `influx`: InfluxDB v2 line protocol 쓰기
//! - `batch`: 고정 크기 배치 작성기와 `PointSink` trait

pub mod batch;
pub mod csv_sink;
pub mod influx;

pub use batch::{BatchProgress, BatchReport, BatchWriteError, BatchWriter, PointSink, DEFAULT_BATCH_SIZE};
pub use csv_sink::{append_rows, read_rows, write_rows, CsvRead};
pub use influx::{InfluxConfig, InfluxHealth, InfluxWriter};
