//! 시계열 포인트 타입.
//!
//! InfluxDB line protocol로 직렬화되는 measurement/tag/field/timestamp 묶음입니다.
//!
//! ```text
//! stock_prices,name=삼성전자,ticker=005930.KS close=71000,volume=1234i 1733227200
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 타임스탬프 정밀도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePrecision {
    /// 초 단위
    #[default]
    Seconds,
}

impl WritePrecision {
    /// 쓰기 API의 `precision` 쿼리 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "s",
        }
    }
}

/// 필드 값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// 시계열 저장소에 기록되는 한 개의 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// measurement 이름 (테이블 역할)
    pub measurement: String,
    /// 문자열 태그
    pub tags: BTreeMap<String, String>,
    /// 타입이 있는 필드
    pub fields: BTreeMap<String, FieldValue>,
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
    /// 타임스탬프 정밀도
    pub precision: WritePrecision,
}

impl TimeSeriesPoint {
    /// 새 포인트를 생성합니다 (정밀도: 초).
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
            precision: WritePrecision::Seconds,
        }
    }

    /// 태그를 추가합니다.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// 필드를 추가합니다.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// line protocol 한 줄로 직렬화합니다.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement);

        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={}", escape_key(key), encode_field(value)))
            .collect();

        line.push(' ');
        line.push_str(&fields.join(","));
        line.push(' ');
        line.push_str(&self.encode_timestamp());
        line
    }

    fn encode_timestamp(&self) -> String {
        match self.precision {
            WritePrecision::Seconds => self.timestamp.timestamp().to_string(),
        }
    }
}

impl fmt::Display for TimeSeriesPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line_protocol())
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

fn encode_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Float(v) => format!("{}", v),
        FieldValue::Integer(v) => format!("{}i", v),
        FieldValue::Text(v) => format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
    }
}
