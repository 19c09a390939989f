//! 경제·시장 데이터 수집기 CLI.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use econ_collector::modules::{self, backfill, historical, merge, DashboardKind, Job};
use econ_collector::{CollectorConfig, TimeSeriesCapability};
use econ_data::storage::influx::BACKFILL_WRITE_TIMEOUT;
use econ_data::InfluxWriter;
use econ_notification::Notifier;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "econ-collector")]
#[command(about = "Economic & Market Data Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 일일 수집 (뉴스 → 주가 → 경제지표) 후 Telegram 보고
    Collect {
        /// 한 작업만 실행
        #[arg(long, value_enum)]
        only: Option<Job>,
    },

    /// 기간별 히스토리 수집 (주가, FRED, ECOS)
    Historical {
        /// 시작일 (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// 종료일 (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// 출력 파일 접미사 (예: 2020_2025_v3)
        #[arg(long)]
        suffix: String,
    },

    /// 구간별 히스토리 파일 병합 및 중복 제거
    Merge {
        /// 병합할 구간 접미사 (쉼표로 구분)
        #[arg(long, value_delimiter = ',')]
        parts: Option<Vec<String>>,
        /// 출력 파일 접미사
        #[arg(long, default_value = merge::DEFAULT_OUTPUT_SUFFIX)]
        output_suffix: String,
    },

    /// 병합된 히스토리를 InfluxDB에 일괄 기록
    Backfill {
        /// 배치 크기 (기본: BATCH_SIZE)
        #[arg(long)]
        batch_size: Option<usize>,
        /// 입력 파일 접미사
        #[arg(long, default_value = backfill::DEFAULT_INPUT_SUFFIX)]
        suffix: String,
        /// 진행률 표시 끄기
        #[arg(long)]
        no_progress: bool,
    },

    /// Grafana 대시보드 JSON 생성
    Dashboard {
        #[arg(value_enum)]
        kind: DashboardKind,
        /// 생성 후 Grafana에 업로드
        #[arg(long)]
        upload: bool,
        /// 출력 경로 (기본: {output_dir}/<이름>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// 기존 대시보드 JSON 파일 업로드
    UploadDashboard {
        file: PathBuf,
    },

    /// 설정/InfluxDB/Grafana/데이터 파일 점검
    Healthcheck,

    /// Telegram 테스트 메시지 전송
    NotifyTest,

    /// 설정 상태 출력 (비밀 값 마스킹)
    ConfigStatus,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    let level = &cli.log_level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "econ_collector={l},econ_data={l},econ_notification={l},econ_dashboard={l},econ_core={l}",
                    l = level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CollectorConfig::from_env();
    tracing::debug!(base_dir = %config.base_dir.display(), "설정 로드 완료");

    match cli.command {
        Commands::Collect { only } => {
            let jobs: Vec<Job> = match only {
                Some(job) => vec![job],
                None => Job::ALL.to_vec(),
            };
            tracing::info!(jobs = ?jobs, "=== 데이터 수집 시작 ===");
            let notifier = Notifier::telegram(config.telegram_config());
            let summary = modules::run_collection(&config, &jobs, &notifier).await?;
            if summary.has_error() {
                tracing::warn!(fail = summary.total_fail(), "일부 수집 실패");
            }
        }
        Commands::Historical { start, end, suffix } => {
            let window = historical::HistoryWindow::new(start, end, config.request_delay())?;
            let report = modules::run_historical(&config, window, &suffix).await?;
            if report.total() == 0 {
                bail!("수집된 히스토리 데이터가 없습니다");
            }
        }
        Commands::Merge {
            parts,
            output_suffix,
        } => {
            let parts = parts.unwrap_or_else(|| {
                merge::DEFAULT_PARTS.iter().map(|s| s.to_string()).collect()
            });
            let stats = modules::run_merge(
                &config.archive_dir(),
                &config.data_dir(),
                &parts,
                &output_suffix,
            )?;
            if stats.is_empty() {
                bail!("병합할 파일이 없습니다: {}", config.archive_dir().display());
            }
            let removed: usize = stats.iter().map(|s| s.duplicates_removed()).sum();
            tracing::info!(datasets = stats.len(), removed, "병합 완료");
        }
        Commands::Backfill {
            batch_size,
            suffix,
            no_progress,
        } => {
            let influx = match &config.time_series {
                TimeSeriesCapability::Enabled(influx) => influx.clone(),
                TimeSeriesCapability::Disabled { reason } => {
                    bail!("InfluxDB 비활성: {}", reason)
                }
            };
            let writer = InfluxWriter::new(influx, BACKFILL_WRITE_TIMEOUT)
                .context("InfluxDB 클라이언트 생성 실패")?;
            let health = writer.health().await.context("InfluxDB 연결 실패")?;
            if !health.is_pass() {
                bail!("InfluxDB 상태: {}", health.status);
            }

            let outcomes = modules::run_backfill(
                &config.data_dir(),
                &suffix,
                &writer,
                batch_size.unwrap_or(config.batch_size),
                !no_progress,
            )
            .await;

            if outcomes.is_empty() {
                bail!("백필할 파일이 없습니다: {}", config.data_dir().display());
            }
            let failed: Vec<&'static str> = outcomes
                .iter()
                .filter(|o| !o.is_success())
                .map(|o| o.dataset.label())
                .collect();
            if !failed.is_empty() {
                bail!("백필 실패 데이터셋: {}", failed.join(", "));
            }
        }
        Commands::Dashboard {
            kind,
            upload,
            output,
        } => {
            let (document, path) = modules::write_dashboard(kind, &config, output.as_deref())?;
            println!("대시보드 파일: {}", path.display());
            if upload {
                let client = modules::grafana_client(&config)?;
                let summary = modules::upload(&client, &document).await?;
                println!("대시보드 URL: {}", summary.dashboard_url);
            }
        }
        Commands::UploadDashboard { file } => {
            if !file.exists() {
                bail!("파일이 없습니다: {}", file.display());
            }
            let client = modules::grafana_client(&config)?;
            let summary = modules::upload_file(&client, &file)
                .await
                .with_context(|| format!("대시보드 업로드 실패: {}", file.display()))?;
            println!("대시보드 URL: {}", summary.dashboard_url);
        }
        Commands::Healthcheck => {
            println!("{}", "=".repeat(60));
            println!("시스템 헬스체크");
            println!("{}", "=".repeat(60));
            let report = modules::run_healthcheck(&config).await;
            println!("{}", report);
            if !report.all_passed() {
                std::process::exit(1);
            }
        }
        Commands::NotifyTest => {
            modules::send_test(&config).await?;
            println!("✅ Telegram 테스트 메시지 전송 완료");
        }
        Commands::ConfigStatus => {
            for line in config.status_lines() {
                println!("{}", line);
            }
            let missing = config.validate();
            if missing.is_empty() {
                println!("\n✅ 모든 필수 설정이 완료되었습니다.");
            } else {
                println!("\n⚠️  미설정 항목: {}", missing.join(", "));
            }
        }
    }

    Ok(())
}
