//! Grafana HTTP API 클라이언트.
//!
//! 대시보드 업로드, 데이터소스 조회, 헬스/인증 확인에 사용합니다.
//! 모든 요청은 basic auth를 사용합니다.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DashboardError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 대시보드 업로드 응답.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub id: i64,
    pub uid: String,
    pub url: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
}

/// 데이터소스 요약.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasourceInfo {
    pub name: String,
    pub uid: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
}

/// `/api/health` 응답.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GrafanaHealth {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub version: String,
}

/// `/api/org` 응답.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrgInfo {
    pub id: i64,
    pub name: String,
}

/// Grafana API 클라이언트.
pub struct GrafanaClient {
    client: Client,
    base_url: String,
    user: String,
    password: String,
}

impl GrafanaClient {
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DashboardError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: user.into(),
            password: password.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 업로드 응답의 상대 URL을 전체 주소로 만듭니다.
    pub fn dashboard_url(&self, upload: &UploadResponse) -> String {
        format!("{}{}", self.base_url, upload.url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let response = self
            .client
            .get(self.url(path))
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;
        ensure_ok(response, &[StatusCode::OK]).await
    }

    /// 대시보드 문서(`{dashboard, folderId, overwrite}`)를 업로드합니다.
    ///
    /// 200/201이 아니면 [`DashboardError::Status`]를 반환합니다.
    pub async fn upload_dashboard<T: Serialize + ?Sized>(&self, document: &T) -> Result<UploadResponse> {
        debug!(url = %self.base_url, "대시보드 업로드");

        let response = self
            .client
            .post(self.url("/api/dashboards/db"))
            .basic_auth(&self.user, Some(&self.password))
            .json(document)
            .send()
            .await?;

        let response = ensure_ok(response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        let uploaded: UploadResponse = response.json().await?;

        info!(id = uploaded.id, uid = %uploaded.uid, url = %uploaded.url, "대시보드 업로드 완료");
        Ok(uploaded)
    }

    /// 데이터소스 목록
    pub async fn datasources(&self) -> Result<Vec<DatasourceInfo>> {
        Ok(self.get("/api/datasources").await?.json().await?)
    }

    /// 첫 번째 InfluxDB 데이터소스를 찾습니다.
    pub async fn find_influx_datasource(&self) -> Result<Option<DatasourceInfo>> {
        let found = self
            .datasources()
            .await?
            .into_iter()
            .find(|ds| ds.kind == "influxdb");

        if found.is_none() {
            warn!("InfluxDB 데이터소스를 찾을 수 없습니다");
        }
        Ok(found)
    }

    /// 서버 상태 (`/api/health`)
    pub async fn health(&self) -> Result<GrafanaHealth> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        let response = ensure_ok(response, &[StatusCode::OK]).await?;
        Ok(response.json().await?)
    }

    /// 인증 확인 겸 조직 정보 (`/api/org`)
    pub async fn org(&self) -> Result<OrgInfo> {
        Ok(self.get("/api/org").await?.json().await?)
    }
}

async fn ensure_ok(response: Response, accepted: &[StatusCode]) -> Result<Response> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DashboardError::Status {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}
