//! FRED (Federal Reserve Economic Data) 관측치 클라이언트.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::SeriesSource;
use crate::error::{build_client, check_status, DataError, Result};

/// FRED API 기본 URL
pub const FRED_API_URL: &str = "https://api.stlouisfed.org";

const OBSERVATIONS_PATH: &str = "/fred/series/observations";

/// FRED 결측값 표기
const MISSING_VALUE: &str = ".";

/// 관측치 한 건.
#[derive(Debug, Clone, PartialEq)]
pub struct FredObservation {
    pub date: NaiveDate,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

/// FRED 클라이언트 (타임아웃 30초).
#[derive(Clone)]
pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, FRED_API_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(30))?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SeriesSource for FredClient {
    async fn observations(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FredObservation>> {
        debug!(series_id = series_id, start = %start, end = %end, "FRED 관측치 조회");

        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(format!("{}{}", self.base_url, OBSERVATIONS_PATH))
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .await?;

        let body: ObservationsResponse = check_status(response).await?.json().await?;

        let mut out = Vec::with_capacity(body.observations.len());
        for obs in body.observations {
            if obs.value.trim() == MISSING_VALUE {
                continue;
            }
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                DataError::ParseError(format!("잘못된 FRED 날짜 '{}': {}", obs.date, e))
            })?;
            out.push(FredObservation {
                date,
                value: obs.value,
            });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_observations_skip_missing_values() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", OBSERVATIONS_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("series_id".into(), "DGS10".into()),
                Matcher::UrlEncoded("api_key".into(), "KEY".into()),
                Matcher::UrlEncoded("file_type".into(), "json".into()),
                Matcher::UrlEncoded("observation_start".into(), "2010-01-01".into()),
                Matcher::UrlEncoded("observation_end".into(), "2010-01-05".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"observations":[
                    {"realtime_start":"2024-12-03","date":"2010-01-01","value":"."},
                    {"realtime_start":"2024-12-03","date":"2010-01-04","value":"3.85"},
                    {"realtime_start":"2024-12-03","date":"2010-01-05","value":"3.77"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = FredClient::with_base_url("KEY", server.url()).unwrap();
        let obs = client
            .observations(
                "DGS10",
                NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2010, 1, 5).unwrap(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].date, NaiveDate::from_ymd_opt(2010, 1, 4).unwrap());
        assert_eq!(obs[1].value, "3.77");
    }

    #[tokio::test]
    async fn test_observations_bad_request() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", OBSERVATIONS_PATH)
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error_code":400,"error_message":"Bad Request. The series does not exist."}"#)
            .create_async()
            .await;

        let client = FredClient::with_base_url("KEY", server.url()).unwrap();
        let day = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let err = client.observations("NOPE", day, day).await.unwrap_err();
        assert!(matches!(err, DataError::HttpStatus { status: 400, .. }));
    }
}
