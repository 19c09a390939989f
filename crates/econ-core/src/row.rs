//! 수집 행(row) 타입과 시계열 포인트 변환.
//!
//! 일일 수집 행(`NewsRow`, `StockRow`, `EconomyRow`)은 수집 상태를 함께 가지며
//! CSV에 그대로 추가됩니다. 히스토리 행(`PriceBar`, `IndicatorObservation`)은
//! 과거 구간 수집과 병합, 백필에 사용됩니다.
//!
//! 값 필드는 텍스트로 보관하고 포인트 변환 시점에 숫자로 변환합니다.
//! 변환에 실패한 행은 [`ProjectionError`]로 건너뜁니다.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::point::TimeSeriesPoint;
use crate::status::FetchStatus;
use crate::text::{strip_html, truncate_chars};

/// 값이 없는 필드 표기
pub const NOT_AVAILABLE: &str = "N/A";

pub const NEWS_MEASUREMENT: &str = "news";
pub const STOCK_MEASUREMENT: &str = "stock_prices";
pub const INDICATOR_MEASUREMENT: &str = "economic_indicators";

const NEWS_TITLE_MAX_CHARS: usize = 200;
const NEWS_TEXT_MAX_CHARS: usize = 500;

/// 행을 시계열 포인트로 변환.
pub trait ToPoint {
    fn to_point(&self) -> Result<TimeSeriesPoint, ProjectionError>;
}

/// 수집 상태를 가진 일일 수집 행.
pub trait CollectedRow: ToPoint {
    fn status(&self) -> &FetchStatus;
}

/// 지표 주기 태그.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPeriod {
    Daily,
    Monthly,
}

impl IndicatorPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

// ==================== 뉴스 ====================

/// 뉴스 검색 결과 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRow {
    #[serde(with = "kst_datetime")]
    pub timestamp: DateTime<Utc>,
    pub keyword: String,
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub status: FetchStatus,
}

impl NewsRow {
    /// 실패 표시 행 (본문 필드는 `N/A`).
    pub fn failed(timestamp: DateTime<Utc>, keyword: impl Into<String>, status: FetchStatus) -> Self {
        Self {
            timestamp,
            keyword: keyword.into(),
            title: NOT_AVAILABLE.to_string(),
            link: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            pub_date: NOT_AVAILABLE.to_string(),
            status,
        }
    }
}

impl ToPoint for NewsRow {
    fn to_point(&self) -> Result<TimeSeriesPoint, ProjectionError> {
        ensure_success(&self.status)?;

        Ok(TimeSeriesPoint::new(NEWS_MEASUREMENT, self.timestamp)
            .tag("keyword", self.keyword.as_str())
            .field("title", truncate_chars(&strip_html(&self.title), NEWS_TITLE_MAX_CHARS))
            .field(
                "description",
                truncate_chars(&strip_html(&self.description), NEWS_TEXT_MAX_CHARS),
            )
            .field("link", truncate_chars(&self.link, NEWS_TEXT_MAX_CHARS))
            .field("count", 1_i64))
    }
}

impl CollectedRow for NewsRow {
    fn status(&self) -> &FetchStatus {
        &self.status
    }
}

// ==================== 주가 ====================

/// 종목별 최근 일봉 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    #[serde(with = "kst_datetime")]
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub ticker: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub status: FetchStatus,
}

impl StockRow {
    /// 수신한 일봉으로 성공 행을 생성합니다.
    #[allow(clippy::too_many_arguments)]
    pub fn from_bar(
        timestamp: DateTime<Utc>,
        name: impl Into<String>,
        ticker: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            ticker: ticker.into(),
            open: open.to_string(),
            high: high.to_string(),
            low: low.to_string(),
            close: close.to_string(),
            volume: volume.to_string(),
            status: FetchStatus::Success,
        }
    }

    /// 실패 표시 행 (가격 필드는 `N/A`).
    pub fn failed(
        timestamp: DateTime<Utc>,
        name: impl Into<String>,
        ticker: impl Into<String>,
        status: FetchStatus,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            ticker: ticker.into(),
            open: NOT_AVAILABLE.to_string(),
            high: NOT_AVAILABLE.to_string(),
            low: NOT_AVAILABLE.to_string(),
            close: NOT_AVAILABLE.to_string(),
            volume: NOT_AVAILABLE.to_string(),
            status,
        }
    }
}

impl ToPoint for StockRow {
    /// 시각은 수집일(UTC) 12:00으로 고정합니다.
    fn to_point(&self) -> Result<TimeSeriesPoint, ProjectionError> {
        ensure_success(&self.status)?;

        let at = at_noon(self.timestamp.date_naive());
        ohlcv_point(
            at,
            &self.name,
            &self.ticker,
            [&self.open, &self.high, &self.low, &self.close].map(String::as_str),
            &self.volume,
        )
    }
}

impl CollectedRow for StockRow {
    fn status(&self) -> &FetchStatus {
        &self.status
    }
}

// ==================== 경제지표 ====================

/// ECOS 일일 지표 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyRow {
    #[serde(with = "kst_datetime")]
    pub timestamp: DateTime<Utc>,
    pub indicator: String,
    pub value: String,
    /// 기준 시점 (`YYYYMMDD` 또는 `YYYYMM`)
    pub date: String,
    pub status: FetchStatus,
}

impl EconomyRow {
    /// 실패 표시 행.
    pub fn failed(
        timestamp: DateTime<Utc>,
        indicator: impl Into<String>,
        date: impl Into<String>,
        status: FetchStatus,
    ) -> Self {
        Self {
            timestamp,
            indicator: indicator.into(),
            value: NOT_AVAILABLE.to_string(),
            date: date.into(),
            status,
        }
    }
}

impl ToPoint for EconomyRow {
    fn to_point(&self) -> Result<TimeSeriesPoint, ProjectionError> {
        ensure_success(&self.status)?;

        let date = parse_period_date(&self.date)?;
        let value = coerce_f64("value", &self.value)?;

        Ok(TimeSeriesPoint::new(INDICATOR_MEASUREMENT, at_noon(date))
            .tag("indicator", self.indicator.as_str())
            .tag("period", IndicatorPeriod::Daily.as_str())
            .field("value", value))
    }
}

impl CollectedRow for EconomyRow {
    fn status(&self) -> &FetchStatus {
        &self.status
    }
}

// ==================== 히스토리 ====================

/// 과거 일봉 한 건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
    pub name: String,
    pub ticker: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl PriceBar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        ticker: impl Into<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            date,
            name: name.into(),
            ticker: ticker.into(),
            open: open.to_string(),
            high: high.to_string(),
            low: low.to_string(),
            close: close.to_string(),
            volume: volume.to_string(),
        }
    }
}

impl ToPoint for PriceBar {
    /// 시각은 해당 일자 00:00 UTC입니다.
    fn to_point(&self) -> Result<TimeSeriesPoint, ProjectionError> {
        ohlcv_point(
            at_midnight(self.date),
            &self.name,
            &self.ticker,
            [&self.open, &self.high, &self.low, &self.close].map(String::as_str),
            &self.volume,
        )
    }
}

/// 과거 지표 관측치 한 건 (FRED/ECOS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorObservation {
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
    pub indicator: String,
    pub value: String,
    pub series_id: String,
}

impl IndicatorObservation {
    pub fn new(
        date: NaiveDate,
        indicator: impl Into<String>,
        value: impl Into<String>,
        series_id: impl Into<String>,
    ) -> Self {
        Self {
            date,
            indicator: indicator.into(),
            value: value.into(),
            series_id: series_id.into(),
        }
    }

    /// 주기 태그를 붙여 포인트로 변환합니다 (시각: 00:00 UTC).
    pub fn to_point(&self, period: IndicatorPeriod) -> Result<TimeSeriesPoint, ProjectionError> {
        let value = coerce_f64("value", &self.value)?;

        Ok(TimeSeriesPoint::new(INDICATOR_MEASUREMENT, at_midnight(self.date))
            .tag("indicator", self.indicator.as_str())
            .tag("period", period.as_str())
            .field("value", value))
    }
}

// ==================== 변환 헬퍼 ====================

fn ensure_success(status: &FetchStatus) -> Result<(), ProjectionError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ProjectionError::NotSuccessful(status.to_string()))
    }
}

fn ohlcv_point(
    at: DateTime<Utc>,
    name: &str,
    ticker: &str,
    prices: [&str; 4],
    volume: &str,
) -> Result<TimeSeriesPoint, ProjectionError> {
    let [open, high, low, close] = prices;

    Ok(TimeSeriesPoint::new(STOCK_MEASUREMENT, at)
        .tag("name", name)
        .tag("ticker", ticker)
        .field("open", coerce_f64("open", open)?)
        .field("high", coerce_f64("high", high)?)
        .field("low", coerce_f64("low", low)?)
        .field("close", coerce_f64("close", close)?)
        .field("volume", coerce_i64("volume", volume)?))
}

/// 문자열을 유한한 실수로 변환합니다.
pub fn coerce_f64(field: &str, raw: &str) -> Result<f64, ProjectionError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| coercion_error(field, raw))
}

/// 문자열을 정수로 변환합니다.
///
/// `1234.0` 같은 실수 표기는 소수부를 버려 정수로 취급합니다.
pub fn coerce_i64(field: &str, raw: &str) -> Result<i64, ProjectionError> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() < i64::MAX as f64)
        .map(|v| v.trunc() as i64)
        .ok_or_else(|| coercion_error(field, raw))
}

fn coercion_error(field: &str, raw: &str) -> ProjectionError {
    ProjectionError::Coercion {
        field: field.to_string(),
        value: raw.to_string(),
    }
}

/// `YYYYMMDD` 또는 `YYYYMM`(해당 월 1일) 형식의 기준 시점을 해석합니다.
pub fn parse_period_date(raw: &str) -> Result<NaiveDate, ProjectionError> {
    let raw = raw.trim();
    let parsed = match raw.len() {
        8 => NaiveDate::parse_from_str(raw, "%Y%m%d"),
        6 => NaiveDate::parse_from_str(&format!("{}01", raw), "%Y%m%d"),
        _ => return Err(ProjectionError::Timestamp(raw.to_string())),
    };
    parsed.map_err(|_| ProjectionError::Timestamp(raw.to_string()))
}

fn at_noon(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN + chrono::Duration::hours(12))
        .and_utc()
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

// ==================== serde 헬퍼 ====================

/// `timestamp` 컬럼: 서울 현지 시각 `%Y-%m-%d %H:%M:%S`.
pub mod kst_datetime {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use chrono_tz::Asia::Seoul;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&dt.with_timezone(&Seoul).format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(s.trim(), FORMAT).map_err(serde::de::Error::custom)?;
        Seoul
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| serde::de::Error::custom(format!("모호한 현지 시각: {}", s)))
    }
}

/// `date` 컬럼: `YYYY-MM-DD` (뒤에 시각이 붙은 값도 허용).
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        let head = s.trim().get(..10).unwrap_or(s.trim());
        NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(serde::de::Error::custom)
    }
}
