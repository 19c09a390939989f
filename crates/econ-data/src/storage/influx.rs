//! InfluxDB v2 쓰기 클라이언트.
//!
//! 포인트를 line protocol로 직렬화하여 `/api/v2/write`에 전송합니다.
//! 작업(job)마다 한 번 생성해 모든 배치에 사용하고, 작업이 끝나면 해제합니다.

use async_trait::async_trait;
use econ_core::{TimeSeriesPoint, WritePrecision};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::batch::PointSink;
use crate::error::{build_client, check_status, DataError, Result};

/// 일일 수집용 쓰기 타임아웃
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// 백필용 쓰기 타임아웃
pub const BACKFILL_WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// InfluxDB 연결 설정.
#[derive(Clone, PartialEq, Eq)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

impl fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("url", &self.url)
            .field("token", &"***")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// `/health` 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxHealth {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl InfluxHealth {
    pub fn is_pass(&self) -> bool {
        self.status == "pass"
    }
}

/// InfluxDB 쓰기 클라이언트.
pub struct InfluxWriter {
    client: Client,
    config: InfluxConfig,
    precision: WritePrecision,
}

impl InfluxWriter {
    pub fn new(config: InfluxConfig, timeout: Duration) -> Result<Self> {
        if config.token.is_empty() {
            return Err(DataError::ConfigError("INFLUXDB_TOKEN이 비어 있습니다".to_string()));
        }
        debug!(url = %config.url, bucket = %config.bucket, "InfluxDB 연결 생성");
        Ok(Self {
            client: build_client(timeout)?,
            config,
            precision: WritePrecision::Seconds,
        })
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// 포인트 목록을 기록합니다. 빈 목록은 요청 없이 0을 반환합니다.
    pub async fn write_points(&self, points: &[TimeSeriesPoint]) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        let body = points
            .iter()
            .map(TimeSeriesPoint::to_line_protocol)
            .collect::<Vec<_>>()
            .join("\n");

        let response = self
            .client
            .post(format!("{}/api/v2/write", self.base_url()))
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", self.precision.as_str()),
            ])
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| DataError::WriteError(e.to_string()))?;

        check_status(response).await?;

        debug!(bucket = %self.config.bucket, points = points.len(), "InfluxDB 저장");
        Ok(points.len())
    }

    /// 서버 상태 확인.
    pub async fn health(&self) -> Result<InfluxHealth> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url()))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl PointSink for InfluxWriter {
    async fn write_batch(&self, points: &[TimeSeriesPoint]) -> Result<()> {
        self.write_points(points).await.map(|_| ())
    }
}

impl Drop for InfluxWriter {
    fn drop(&mut self) {
        debug!(bucket = %self.config.bucket, "InfluxDB 연결 해제");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;

    fn config(url: String) -> InfluxConfig {
        InfluxConfig {
            url,
            token: "tok".to_string(),
            org: "my-org".to_string(),
            bucket: "econ_market".to_string(),
        }
    }

    fn point(close: f64) -> TimeSeriesPoint {
        TimeSeriesPoint::new("stock_prices", Utc.with_ymd_and_hms(2024, 12, 3, 12, 0, 0).unwrap())
            .tag("ticker", "AAPL")
            .field("close", close)
    }

    #[tokio::test]
    async fn test_write_points_line_protocol() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("org".into(), "my-org".into()),
                Matcher::UrlEncoded("bucket".into(), "econ_market".into()),
                Matcher::UrlEncoded("precision".into(), "s".into()),
            ]))
            .match_header("Authorization", "Token tok")
            .match_body(
                "stock_prices,ticker=AAPL close=243.5 1733227200\nstock_prices,ticker=AAPL close=244 1733227200",
            )
            .with_status(204)
            .create_async()
            .await;

        let writer = InfluxWriter::new(config(server.url()), DEFAULT_WRITE_TIMEOUT).unwrap();
        let written = writer.write_points(&[point(243.5), point(244.0)]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(written, 2);
    }

    #[tokio::test]
    async fn test_empty_write_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let writer = InfluxWriter::new(config(server.url()), DEFAULT_WRITE_TIMEOUT).unwrap();
        assert_eq!(writer.write_points(&[]).await.unwrap(), 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v2/write")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"code":"unauthorized","message":"unauthorized access"}"#)
            .create_async()
            .await;

        let writer = InfluxWriter::new(config(server.url()), DEFAULT_WRITE_TIMEOUT).unwrap();
        let err = writer.write_batch(&[point(1.0)]).await.unwrap_err();
        assert!(matches!(err, DataError::HttpStatus { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_health() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"name":"influxdb","message":"ready for queries and writes","status":"pass","version":"v2.7.10"}"#)
            .create_async()
            .await;

        let writer = InfluxWriter::new(config(server.url()), DEFAULT_WRITE_TIMEOUT).unwrap();
        let health = writer.health().await.unwrap();
        assert!(health.is_pass());
        assert_eq!(health.version.as_deref(), Some("v2.7.10"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut cfg = config("http://localhost:8086".to_string());
        cfg.token.clear();
        assert!(matches!(
            InfluxWriter::new(cfg, DEFAULT_WRITE_TIMEOUT),
            Err(DataError::ConfigError(_))
        ));
    }

    #[test]
    fn test_debug_masks_token() {
        let cfg = config("http://localhost:8086".to_string());
        assert!(!format!("{:?}", cfg).contains("tok\""));
    }
}
