//! 한국은행 ECOS 통계 검색 클라이언트.
//!
//! URL 형식:
//! `{base}/api/StatisticSearch/{key}/json/kr/{from}/{to}/{stat}/{cycle}/{start}/{end}[/{item}]`
//!
//! 데이터가 없으면 `StatisticSearch` 대신 `RESULT` 객체가 반환되며 빈 목록으로 처리합니다.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::IndicatorSource;
use crate::error::{build_client, check_status, Result};

/// ECOS API 기본 URL
pub const ECOS_API_URL: &str = "https://ecos.bok.or.kr";

/// 기간 조회 시 최대 행 수
pub const ECOS_MAX_ROWS: u32 = 100_000;

/// 통계 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcosCycle {
    /// 일별
    Daily,
    /// 월별
    Monthly,
    /// 분기별
    Quarterly,
}

impl EcosCycle {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Monthly => "M",
            Self::Quarterly => "Q",
        }
    }

    /// 요청용 기간 문자열.
    ///
    /// 분기는 시작일이면 `YYYYQ1`, 종료일이면 `YYYYQ4`로 연 단위 조회합니다.
    pub fn format_period(&self, date: NaiveDate, is_end: bool) -> String {
        match self {
            Self::Daily => date.format("%Y%m%d").to_string(),
            Self::Monthly => date.format("%Y%m").to_string(),
            Self::Quarterly => format!("{}Q{}", date.year(), if is_end { 4 } else { 1 }),
        }
    }

    /// 응답의 `TIME` 값을 날짜로 변환합니다.
    ///
    /// - `YYYYMMDD` → 해당 일
    /// - `YYYYMM` → 해당 월 1일
    /// - `YYYYQn` → 분기 마지막 달 1일
    pub fn parse_time(&self, time: &str) -> Option<NaiveDate> {
        let time = time.trim();
        match self {
            Self::Daily => NaiveDate::parse_from_str(time, "%Y%m%d").ok(),
            Self::Monthly => {
                let year: i32 = time.get(..4)?.parse().ok()?;
                let month: u32 = time.get(4..6)?.parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, 1)
            }
            Self::Quarterly => {
                let year: i32 = time.get(..4)?.parse().ok()?;
                let quarter: u32 = time.get(5..6)?.parse().ok()?;
                if !(1..=4).contains(&quarter) {
                    return None;
                }
                NaiveDate::from_ymd_opt(year, quarter * 3, 1)
            }
        }
    }
}

impl fmt::Display for EcosCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 통계 검색 조건.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcosQuery {
    pub stat_code: String,
    pub cycle: EcosCycle,
    pub start: String,
    pub end: String,
    pub item_code: Option<String>,
    pub max_rows: u32,
}

impl EcosQuery {
    /// 특정 시점 한 건 조회 (일일 수집용).
    pub fn single(
        stat_code: impl Into<String>,
        cycle: EcosCycle,
        item_code: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        let period = cycle.format_period(date, false);
        Self {
            stat_code: stat_code.into(),
            cycle,
            start: period.clone(),
            end: period,
            item_code: Some(item_code.into()),
            max_rows: 1,
        }
    }

    /// 기간 조회 (히스토리 수집용). 항목 코드가 비어 있으면 전체 항목을 조회합니다.
    pub fn range(
        stat_code: impl Into<String>,
        cycle: EcosCycle,
        item_code: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            stat_code: stat_code.into(),
            cycle,
            start: cycle.format_period(start, false),
            end: cycle.format_period(end, true),
            item_code: item_code.filter(|c| !c.is_empty()).map(str::to_string),
            max_rows: ECOS_MAX_ROWS,
        }
    }

    /// API 키 뒤에 붙는 경로.
    fn path(&self) -> String {
        let mut path = format!(
            "json/kr/1/{}/{}/{}/{}/{}",
            self.max_rows, self.stat_code, self.cycle, self.start, self.end
        );
        if let Some(item) = &self.item_code {
            path.push('/');
            path.push_str(item);
        }
        path
    }
}

/// 통계 검색 결과 행.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EcosRow {
    #[serde(rename = "TIME")]
    pub time: String,
    #[serde(rename = "DATA_VALUE", deserialize_with = "string_or_number")]
    pub data_value: String,
    #[serde(rename = "ITEM_CODE1", default)]
    pub item_code: Option<String>,
    #[serde(rename = "ITEM_NAME1", default)]
    pub item_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "StatisticSearch")]
    statistic_search: Option<SearchBody>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    row: Vec<EcosRow>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// ECOS 클라이언트.
#[derive(Clone)]
pub struct EcosClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl EcosClient {
    /// 지정한 타임아웃으로 생성 (일일: 10초, 히스토리: 30초)
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, timeout, ECOS_API_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IndicatorSource for EcosClient {
    async fn statistic_search(&self, query: &EcosQuery) -> Result<Vec<EcosRow>> {
        debug!(
            stat_code = %query.stat_code,
            cycle = %query.cycle,
            start = %query.start,
            end = %query.end,
            "ECOS 통계 검색"
        );

        let url = format!(
            "{}/api/StatisticSearch/{}/{}",
            self.base_url,
            self.api_key,
            query.path()
        );

        let response = self.client.get(url).send().await?;
        let envelope: SearchEnvelope = check_status(response).await?.json().await?;

        Ok(envelope
            .statistic_search
            .map(|body| body.row)
            .unwrap_or_default())
    }
}
