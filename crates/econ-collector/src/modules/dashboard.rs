//! 대시보드 생성과 업로드.

use econ_dashboard::{
    build_market_dashboard, build_system_health_dashboard, DashboardDocument, DatasourceInfo,
    GrafanaClient,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};

/// 생성할 대시보드 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DashboardKind {
    /// 경제·주가 통합 대시보드
    Market,
    /// 라즈베리파이 시스템 헬스 대시보드
    SystemHealth,
}

impl DashboardKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Market => "grafana_dashboard_final.json",
            Self::SystemHealth => "system_health_dashboard.json",
        }
    }

    pub fn build(&self, config: &CollectorConfig) -> DashboardDocument {
        match self {
            Self::Market => build_market_dashboard(config.bucket()),
            Self::SystemHealth => {
                build_system_health_dashboard(config.bucket(), &config.base_dir.to_string_lossy())
            }
        }
    }
}

/// 업로드 결과.
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub dashboard_url: String,
    /// Grafana에 등록된 InfluxDB 데이터소스
    pub datasource: Option<DatasourceInfo>,
}

/// 대시보드 JSON 파일을 생성합니다.
pub fn write_dashboard(
    kind: DashboardKind,
    config: &CollectorConfig,
    output: Option<&Path>,
) -> Result<(DashboardDocument, PathBuf)> {
    let document = kind.build(config);
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_dir().join(kind.file_name()));

    document.write_pretty(&path)?;
    info!(
        title = %document.dashboard.title,
        panels = document.dashboard.panels.len(),
        path = %path.display(),
        "대시보드 JSON 생성"
    );
    Ok((document, path))
}

/// 설정의 계정으로 Grafana 클라이언트를 만듭니다.
pub fn grafana_client(config: &CollectorConfig) -> Result<GrafanaClient> {
    let password = config
        .grafana
        .password
        .as_deref()
        .ok_or_else(|| CollectorError::Config("GRAFANA_PASSWORD 미설정".to_string()))?;
    Ok(GrafanaClient::new(
        &config.grafana.url,
        &config.grafana.user,
        password,
    )?)
}

/// 대시보드를 업로드하고 InfluxDB 데이터소스를 확인합니다.
pub async fn upload<T: Serialize + ?Sized>(
    client: &GrafanaClient,
    document: &T,
) -> Result<UploadSummary> {
    let uploaded = match client.upload_dashboard(document).await {
        Ok(uploaded) => uploaded,
        Err(e) => {
            error!(error = %e, hint = e.hint().unwrap_or_default(), "대시보드 업로드 실패");
            return Err(e.into());
        }
    };
    let dashboard_url = client.dashboard_url(&uploaded);
    info!(url = %dashboard_url, "대시보드 URL");

    let datasource = match client.find_influx_datasource().await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, "데이터소스 조회 실패");
            None
        }
    };
    if let Some(ds) = &datasource {
        info!(name = %ds.name, uid = %ds.uid, url = %ds.url, "InfluxDB 데이터소스");
    }

    Ok(UploadSummary {
        dashboard_url,
        datasource,
    })
}

/// 기존 대시보드 JSON 파일을 업로드합니다.
pub async fn upload_file(client: &GrafanaClient, path: &Path) -> Result<UploadSummary> {
    let content = fs::read_to_string(path)?;
    let document: serde_json::Value = serde_json::from_str(&content)?;
    if document.get("dashboard").is_none() {
        return Err(CollectorError::Config(format!(
            "{}: dashboard 항목이 없습니다",
            path.display()
        )));
    }
    upload(client, &document).await
}
