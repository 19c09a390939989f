//! 시스템 헬스체크.
//!
//! 설정, InfluxDB, Grafana, 병합 데이터 파일을 차례로 확인합니다.
//! 각 검사는 실패해도 다음 검사를 막지 않습니다.

use econ_data::storage::influx::DEFAULT_WRITE_TIMEOUT;
use econ_data::InfluxWriter;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use super::dashboard::grafana_client;
use crate::catalog::HistoricalDataset;
use crate::config::{CollectorConfig, TimeSeriesCapability};

/// 병합 파일 접미사
pub const MERGED_SUFFIX: &str = "2010_2025";

/// 검사 한 개의 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    /// 출력용 세부 줄
    pub details: Vec<String>,
}

impl CheckOutcome {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            passed: true,
            details: Vec::new(),
        }
    }

    fn ok(&mut self, line: impl Into<String>) {
        self.details.push(format!("✅ {}", line.into()));
    }

    fn fail(&mut self, line: impl Into<String>) {
        self.passed = false;
        self.details.push(format!("❌ {}", line.into()));
    }

    fn note(&mut self, line: impl Into<String>) {
        self.details.push(format!("   {}", line.into()));
    }
}

/// 전체 헬스체크 결과.
#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    pub checks: Vec<CheckOutcome>,
}

impl HealthReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.checks.len();
        for (i, check) in self.checks.iter().enumerate() {
            writeln!(f, "\n[{}/{}] {}", i + 1, total, check.name)?;
            writeln!(f, "{}", "-".repeat(50))?;
            for line in &check.details {
                writeln!(f, "  {}", line)?;
            }
        }

        writeln!(f, "\n{}", "=".repeat(60))?;
        writeln!(f, "헬스체크 결과")?;
        writeln!(f, "{}", "=".repeat(60))?;
        for check in &self.checks {
            let status = if check.passed { "✅ PASS" } else { "❌ FAIL" };
            writeln!(f, "  {}: {}", check.name, status)?;
        }
        writeln!(f)?;
        if self.all_passed() {
            write!(f, "🎉 모든 검사를 통과했습니다!")
        } else {
            write!(f, "⚠️  일부 검사가 실패했습니다. 위의 오류를 확인하세요.")
        }
    }
}

/// 필수 설정 값 확인.
pub fn check_credentials(config: &CollectorConfig) -> CheckOutcome {
    let mut check = CheckOutcome::new("환경변수");
    let missing = config.validate();
    let keys = [
        "NAVER_CLIENT_ID",
        "NAVER_CLIENT_SECRET",
        "BOK_API_KEY",
        "FRED_API_KEY",
        "INFLUXDB_TOKEN",
        "GRAFANA_PASSWORD",
    ];
    for key in keys {
        if missing.contains(&key) {
            check.fail(format!("{}: 미설정", key));
        } else {
            check.ok(format!("{}: 설정됨", key));
        }
    }
    check
}

/// InfluxDB `/health` 확인.
pub async fn check_influxdb(config: &CollectorConfig) -> CheckOutcome {
    let mut check = CheckOutcome::new("InfluxDB");
    let influx = match &config.time_series {
        TimeSeriesCapability::Enabled(influx) => influx.clone(),
        TimeSeriesCapability::Disabled { reason } => {
            check.fail(format!("InfluxDB 비활성: {}", reason));
            return check;
        }
    };
    let url = influx.url.clone();

    let writer = match InfluxWriter::new(influx, DEFAULT_WRITE_TIMEOUT) {
        Ok(writer) => writer,
        Err(e) => {
            check.fail(format!("InfluxDB 클라이언트 생성 실패: {}", e));
            return check;
        }
    };

    match writer.health().await {
        Ok(health) if health.is_pass() => {
            check.ok("InfluxDB 연결 성공");
            check.note(format!("URL: {}", url));
            check.note(format!("Bucket: {}", config.bucket()));
            if let Some(version) = health.version {
                check.note(format!("Version: {}", version));
            }
        }
        Ok(health) => check.fail(format!("InfluxDB 상태: {}", health.status)),
        Err(e) => {
            warn!(error = %e, "InfluxDB 헬스체크 실패");
            check.fail(format!("InfluxDB 연결 실패: {}", e));
        }
    }
    check
}

/// Grafana `/api/health`와 인증(`/api/org`) 확인.
pub async fn check_grafana(config: &CollectorConfig) -> CheckOutcome {
    let mut check = CheckOutcome::new("Grafana");
    let client = match grafana_client(config) {
        Ok(client) => client,
        Err(e) => {
            check.fail(format!("Grafana 클라이언트 생성 실패: {}", e));
            return check;
        }
    };

    match client.health().await {
        Ok(health) => {
            debug!(database = %health.database, version = %health.version, "Grafana 상태");
            check.ok("Grafana 연결 성공");
            check.note(format!("URL: {}", config.grafana.url));
        }
        Err(e) => {
            check.fail(format!("Grafana 연결 실패: {}", e));
            return check;
        }
    }

    match client.org().await {
        Ok(org) => check.note(format!("Organization: {}", org.name)),
        Err(e) => check.fail(format!("Grafana 인증 실패: {}", e)),
    }
    check
}

/// 병합된 데이터 파일 존재와 크기 확인.
pub fn check_data_files(data_dir: &Path) -> CheckOutcome {
    let mut check = CheckOutcome::new("데이터파일");
    for dataset in HistoricalDataset::ALL {
        let path = data_dir.join(dataset.file_name(MERGED_SUFFIX));
        match std::fs::metadata(&path) {
            Ok(meta) => {
                let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
                check.ok(format!("{}: {:.1}MB", dataset.label(), size_mb));
            }
            Err(_) => check.fail(format!("{}: 파일 없음", dataset.label())),
        }
    }
    check
}

/// 네 가지 검사를 순서대로 실행합니다.
pub async fn run_healthcheck(config: &CollectorConfig) -> HealthReport {
    HealthReport {
        checks: vec![
            check_credentials(config),
            check_influxdb(config).await,
            check_grafana(config).await,
            check_data_files(&config.data_dir()),
        ],
    }
}
