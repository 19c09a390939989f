//! 일일 수집 실행.
//!
//! 뉴스 → 주가 → 경제지표 순서로 작업을 하나씩 실행하고,
//! 전체 소요 시간을 `total` 로그로 남긴 뒤 Telegram 보고를 보냅니다.

use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Seoul;
use econ_core::{CollectionResult, RunSummary};
use econ_data::storage::influx::DEFAULT_WRITE_TIMEOUT;
use econ_data::{
    EcosClient, IndicatorSource, InfluxWriter, NaverNewsClient, NewsSource, PointSink,
    QuoteSource, YahooQuoteClient,
};
use econ_notification::{Notification, Notifier};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::persist::{skip_job, Persistence};
use super::{economy, news, stock};
use crate::catalog::{all_tickers, ECOS_DAILY_INDICATORS, NEWS_KEYWORDS};
use crate::config::{CollectorConfig, TimeSeriesCapability};
use crate::error::Result;

/// ECOS 일일 조회 타임아웃
const ECOS_DAILY_TIMEOUT: Duration = Duration::from_secs(10);

/// 전체 실행 로그의 작업 이름
pub const TOTAL_TASK_NAME: &str = "total";

/// 일일 수집 작업 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Job {
    News,
    Stock,
    Economy,
}

impl Job {
    pub const ALL: [Job; 3] = [Job::News, Job::Stock, Job::Economy];

    pub fn task_name(&self) -> &'static str {
        match self {
            Self::News => news::TASK_NAME,
            Self::Stock => stock::TASK_NAME,
            Self::Economy => economy::TASK_NAME,
        }
    }
}

/// 작업별 데이터 소스. `Err`는 작업을 건너뛰는 사유입니다.
pub struct Sources<'a> {
    pub news: std::result::Result<&'a dyn NewsSource, String>,
    pub quotes: std::result::Result<&'a dyn QuoteSource, String>,
    pub indicators: std::result::Result<&'a dyn IndicatorSource, String>,
}

/// 작업 실행 설정.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub news_display: u32,
    pub news_csv: PathBuf,
    pub stock_csv: PathBuf,
    pub economy_csv: PathBuf,
    /// 서울 기준 오늘
    pub today: NaiveDate,
}

impl JobSettings {
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self {
            news_display: config.news_display,
            news_csv: config.news_dir().join("news.csv"),
            stock_csv: config.stock_dir().join("stock.csv"),
            economy_csv: config.economy_dir().join("economy.csv"),
            today: Utc::now().with_timezone(&Seoul).date_naive(),
        }
    }
}

/// 작업마다 시계열 저장소를 여는 함수. `None`이면 CSV에만 저장합니다.
pub type SinkOpener = dyn Fn() -> Option<Box<dyn PointSink>>;

/// 지정한 작업들을 순서대로 실행하고 요약을 반환합니다.
///
/// 시계열 저장소는 작업마다 새로 열고 작업이 끝나면 (오류 경로 포함) 닫습니다.
/// 마지막에 `total` 로그 포인트를 기록합니다 (요약에는 포함하지 않음).
pub async fn run_jobs(
    jobs: &[Job],
    sources: &Sources<'_>,
    settings: &JobSettings,
    batch_size: usize,
    open_sink: &SinkOpener,
) -> Result<RunSummary> {
    let started = Instant::now();
    let mut summary = RunSummary::new();

    for job in Job::ALL.iter().filter(|j| jobs.contains(j)) {
        let sink = open_sink();
        let persistence = Persistence::new(sink.as_deref(), batch_size);

        match job {
            Job::News => {
                news::run_news_job(
                    sources.news.clone(),
                    NEWS_KEYWORDS,
                    settings.news_display,
                    &settings.news_csv,
                    &persistence,
                    &mut summary,
                )
                .await?
            }
            Job::Stock => match &sources.quotes {
                Ok(quotes) => {
                    stock::run_stock_job(
                        *quotes,
                        all_tickers(),
                        &settings.stock_csv,
                        &persistence,
                        &mut summary,
                    )
                    .await?
                }
                Err(reason) => {
                    skip_job(stock::TASK_NAME, reason, &persistence, &mut summary).await?
                }
            },
            Job::Economy => {
                economy::run_economy_job(
                    sources.indicators.clone(),
                    ECOS_DAILY_INDICATORS,
                    settings.today,
                    &settings.economy_csv,
                    &persistence,
                    &mut summary,
                )
                .await?
            }
        }
    }

    let elapsed = started.elapsed();
    summary.set_total_elapsed(elapsed);

    let total = CollectionResult::from_counts(
        TOTAL_TASK_NAME,
        1,
        0,
        elapsed.as_millis() as u64,
        std::iter::empty::<&str>(),
    );
    let sink = open_sink();
    Persistence::new(sink.as_deref(), batch_size)
        .record_result(&total, Utc::now())
        .await;

    info!(
        success = summary.total_success(),
        fail = summary.total_fail(),
        elapsed_ms = summary.total_elapsed_ms(),
        "데이터 수집 완료"
    );
    Ok(summary)
}

/// 설정으로 클라이언트를 만들어 수집을 실행하고 결과를 알립니다.
///
/// 실행이 중단되면 오류 알림을 보낸 뒤 오류를 반환합니다.
pub async fn run_collection(
    config: &CollectorConfig,
    jobs: &[Job],
    notifier: &Notifier,
) -> Result<RunSummary> {
    let naver = match config.naver_credentials() {
        Some((id, secret)) => NaverNewsClient::new(id, secret)
            .map_err(|e| format!("네이버 클라이언트 생성 실패: {}", e)),
        None => Err("네이버 API 키 미설정".to_string()),
    };
    let yahoo = YahooQuoteClient::new().map_err(|e| format!("Yahoo 클라이언트 생성 실패: {}", e));
    let ecos = match &config.bok_api_key {
        Some(key) => EcosClient::new(key, ECOS_DAILY_TIMEOUT)
            .map_err(|e| format!("ECOS 클라이언트 생성 실패: {}", e)),
        None => Err("BOK_API_KEY 미설정".to_string()),
    };

    let sources = Sources {
        news: naver.as_ref().map(|c| c as &dyn NewsSource).map_err(|e| e.clone()),
        quotes: yahoo.as_ref().map(|c| c as &dyn QuoteSource).map_err(|e| e.clone()),
        indicators: ecos.as_ref().map(|c| c as &dyn IndicatorSource).map_err(|e| e.clone()),
    };

    let open_sink = influx_opener(config, DEFAULT_WRITE_TIMEOUT);
    let settings = JobSettings::from_config(config);
    let summary = match run_jobs(jobs, &sources, &settings, config.batch_size, &open_sink).await {
        Ok(summary) => summary,
        Err(e) => {
            notifier
                .send(&Notification::collection_error(TOTAL_TASK_NAME, e.to_string()))
                .await;
            return Err(e);
        }
    };

    let notification = Notification::collection_report(summary.clone(), config.grafana.url.clone());
    if notifier.send(&notification).await {
        info!("수집 결과 알림 전송 완료");
    }

    Ok(summary)
}

/// 시계열 저장소 설정으로 작업별 InfluxDB 클라이언트를 여는 함수를 만듭니다.
///
/// 저장소가 비활성이거나 연결을 열 수 없으면 CSV 저장만 수행합니다.
pub fn influx_opener(
    config: &CollectorConfig,
    timeout: Duration,
) -> impl Fn() -> Option<Box<dyn PointSink>> {
    let influx = match &config.time_series {
        TimeSeriesCapability::Enabled(influx) => Some(influx.clone()),
        TimeSeriesCapability::Disabled { reason } => {
            warn!(reason = %reason, "InfluxDB 비활성, CSV만 저장");
            None
        }
    };

    move || {
        let influx = influx.clone()?;
        match InfluxWriter::new(influx, timeout) {
            Ok(writer) => Some(Box::new(writer) as Box<dyn PointSink>),
            Err(e) => {
                warn!(error = %e, "InfluxDB 연결 실패, CSV만 저장");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persist::testing::MemorySink;
    use async_trait::async_trait;
    use econ_core::TimeSeriesPoint;
    use econ_data::{DailyBar, EcosQuery, EcosRow, NewsItem};
    use std::sync::{Arc, Mutex};

    struct OneNews;

    #[async_trait]
    impl NewsSource for OneNews {
        async fn search(&self, keyword: &str, _display: u32) -> econ_data::Result<Vec<NewsItem>> {
            Ok(vec![NewsItem {
                title: keyword.to_string(),
                link: "https://news.example/1".to_string(),
                description: String::new(),
                pub_date: String::new(),
            }])
        }
    }

    struct NoQuotes;

    #[async_trait]
    impl QuoteSource for NoQuotes {
        async fn latest_bar(&self, _ticker: &str) -> econ_data::Result<Option<DailyBar>> {
            Ok(None)
        }

        async fn history(
            &self,
            _ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> econ_data::Result<Vec<DailyBar>> {
            Ok(Vec::new())
        }
    }

    struct EmptyEcos;

    #[async_trait]
    impl IndicatorSource for EmptyEcos {
        async fn statistic_search(&self, _query: &EcosQuery) -> econ_data::Result<Vec<EcosRow>> {
            Ok(Vec::new())
        }
    }

    fn settings(dir: &std::path::Path) -> JobSettings {
        JobSettings {
            news_display: 1,
            news_csv: dir.join("news.csv"),
            stock_csv: dir.join("stock.csv"),
            economy_csv: dir.join("economy.csv"),
            today: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_run_all_jobs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::default();
        let opener = {
            let sink = sink.clone();
            move || Some(Box::new(sink.clone()) as Box<dyn PointSink>)
        };
        let sources = Sources {
            news: Ok(&OneNews),
            quotes: Ok(&NoQuotes),
            indicators: Err("BOK_API_KEY 미설정".to_string()),
        };

        let summary = run_jobs(&Job::ALL, &sources, &settings(dir.path()), 500, &opener)
            .await
            .unwrap();

        let names: Vec<&str> = summary.results().iter().map(|r| r.task_name()).collect();
        assert_eq!(names, vec!["news", "stock", "economy"]);

        assert_eq!(summary.get("news").unwrap().success_count(), 4);
        assert_eq!(
            summary.get("stock").unwrap().fail_count(),
            all_tickers().count() as u64
        );
        assert_eq!(summary.get("economy").unwrap().fail_count(), 1);
        assert!(summary.has_error());

        // 뉴스 포인트 4개 + 작업 로그 3개 + total 로그
        let points = sink.points.lock().unwrap();
        let logs: Vec<&str> = points
            .iter()
            .filter(|p| p.measurement == "system_logs")
            .map(|p| p.tags["task_name"].as_str())
            .collect();
        assert_eq!(logs, vec!["news", "stock", "economy", "total"]);
    }

    #[tokio::test]
    async fn test_run_single_job() {
        let dir = tempfile::tempdir().unwrap();
        let sources = Sources {
            news: Err("네이버 API 키 미설정".to_string()),
            quotes: Ok(&NoQuotes),
            indicators: Ok(&EmptyEcos),
        };

        let summary = run_jobs(
            &[Job::Economy],
            &sources,
            &settings(dir.path()),
            500,
            &|| None,
        )
        .await
        .unwrap();

        assert_eq!(summary.results().len(), 1);
        assert_eq!(summary.get("economy").unwrap().fail_count(), 7);
        assert!(dir.path().join("economy.csv").exists());
        assert!(!dir.path().join("news.csv").exists());
    }

    /// 열기/닫기 순서를 기록하는 저장소.
    struct TrackedSink {
        events: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl PointSink for TrackedSink {
        async fn write_batch(&self, _points: &[TimeSeriesPoint]) -> econ_data::Result<()> {
            self.events.lock().unwrap().push("write");
            Ok(())
        }
    }

    impl Drop for TrackedSink {
        fn drop(&mut self) {
            self.events.lock().unwrap().push("close");
        }
    }

    #[tokio::test]
    async fn test_sink_opened_and_closed_per_job() {
        let dir = tempfile::tempdir().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let opener = {
            let events = events.clone();
            move || {
                events.lock().unwrap().push("open");
                Some(Box::new(TrackedSink {
                    events: events.clone(),
                }) as Box<dyn PointSink>)
            }
        };
        let sources = Sources {
            news: Err("네이버 API 키 미설정".to_string()),
            quotes: Err("Yahoo 클라이언트 생성 실패".to_string()),
            indicators: Err("BOK_API_KEY 미설정".to_string()),
        };

        run_jobs(&Job::ALL, &sources, &settings(dir.path()), 500, &opener)
            .await
            .unwrap();

        let events = events.lock().unwrap();
        let lifecycle: Vec<&str> = events.iter().copied().filter(|e| *e != "write").collect();
        // 작업 3개 + total 로그
        assert_eq!(lifecycle.len(), 8);
        for pair in lifecycle.chunks(2) {
            assert_eq!(pair, ["open", "close"]);
        }
        assert!(events.contains(&"write"));
    }

    #[test]
    fn test_influx_opener_disabled() {
        let config = CollectorConfig::from_lookup(|_| None);
        let open_sink = influx_opener(&config, DEFAULT_WRITE_TIMEOUT);
        assert!(open_sink().is_none());
        assert!(open_sink().is_none());
    }

    #[test]
    fn test_influx_opener_enabled() {
        let config = CollectorConfig::from_lookup(|key| match key {
            "INFLUXDB_URL" => Some("http://localhost:8086".to_string()),
            "INFLUXDB_TOKEN" => Some("t".to_string()),
            _ => None,
        });
        let open_sink = influx_opener(&config, DEFAULT_WRITE_TIMEOUT);
        assert!(open_sink().is_some());
    }
}
