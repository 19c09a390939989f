//! 환경변수 기반 설정 모듈.
//!
//! `.env` 파일이 있으면 먼저 읽고, 없는 값은 기본값을 사용합니다.
//! API 키가 없어도 설정 로드는 실패하지 않으며, 해당 작업이 실행 시점에 건너뜁니다.

use econ_data::{InfluxConfig, DEFAULT_BATCH_SIZE};
use econ_notification::{TelegramConfig, PLACEHOLDER_BOT_TOKEN};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_INFLUX_URL: &str = "http://localhost:8086";
const DEFAULT_INFLUX_ORG: &str = "my-org";
const DEFAULT_INFLUX_BUCKET: &str = "econ_market";
const DEFAULT_GRAFANA_URL: &str = "http://localhost:3000";
const DEFAULT_GRAFANA_USER: &str = "admin";
const DEFAULT_BASE_DIR: &str = "/raspi/WD4T";

/// 마스킹 시 노출할 앞 글자 수
const MASK_VISIBLE_CHARS: usize = 4;

/// 시계열 저장소 사용 가능 여부.
///
/// 프로세스 시작 시 한 번 결정되며, 각 작업은 이 값만 확인합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSeriesCapability {
    Enabled(InfluxConfig),
    /// CSV 저장만 수행
    Disabled { reason: String },
}

impl TimeSeriesCapability {
    pub fn influx(&self) -> Option<&InfluxConfig> {
        match self {
            Self::Enabled(config) => Some(config),
            Self::Disabled { .. } => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 네이버 검색 API
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    /// 한국은행 ECOS API 키
    pub bok_api_key: Option<String>,
    /// FRED API 키
    pub fred_api_key: Option<String>,
    /// InfluxDB 사용 여부와 연결 정보
    pub time_series: TimeSeriesCapability,
    /// Grafana 설정
    pub grafana: GrafanaSettings,
    /// Telegram 설정
    pub telegram: TelegramSettings,
    /// 데이터 루트 디렉토리
    pub base_dir: PathBuf,
    /// InfluxDB 배치 크기
    pub batch_size: usize,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 키워드당 뉴스 건수
    pub news_display: u32,
}

/// Grafana 설정
#[derive(Debug, Clone)]
pub struct GrafanaSettings {
    pub url: String,
    pub user: String,
    pub password: Option<String>,
}

/// Telegram 설정
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub enabled: bool,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로 설정을 만듭니다.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let influx_token = env.opt("INFLUXDB_TOKEN");
        let time_series = match influx_token {
            Some(token) => TimeSeriesCapability::Enabled(InfluxConfig {
                url: env.or("INFLUXDB_URL", DEFAULT_INFLUX_URL),
                token,
                org: env.or("INFLUXDB_ORG", DEFAULT_INFLUX_ORG),
                bucket: env.or("INFLUXDB_BUCKET", DEFAULT_INFLUX_BUCKET),
            }),
            None => TimeSeriesCapability::Disabled {
                reason: "INFLUXDB_TOKEN 미설정".to_string(),
            },
        };

        Self {
            naver_client_id: env.opt("NAVER_CLIENT_ID"),
            naver_client_secret: env.opt("NAVER_CLIENT_SECRET"),
            bok_api_key: env.opt("BOK_API_KEY"),
            fred_api_key: env.opt("FRED_API_KEY"),
            time_series,
            grafana: GrafanaSettings {
                url: env.or("GRAFANA_URL", DEFAULT_GRAFANA_URL),
                user: env.or("GRAFANA_USER", DEFAULT_GRAFANA_USER),
                password: env.opt("GRAFANA_PASSWORD"),
            },
            telegram: TelegramSettings {
                bot_token: env.opt("TELEGRAM_BOT_TOKEN"),
                chat_id: env.opt("TELEGRAM_CHAT_ID"),
                enabled: env.bool("TELEGRAM_ENABLED", true),
            },
            base_dir: PathBuf::from(env.or("DATA_BASE_DIR", DEFAULT_BASE_DIR)),
            batch_size: env.parse("BATCH_SIZE", DEFAULT_BATCH_SIZE),
            request_delay_ms: env.parse("REQUEST_DELAY_MS", 200),
            news_display: env.parse("NEWS_DISPLAY", 5),
        }
    }

    /// API 요청 간 딜레이
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// InfluxDB 버킷 (비활성 시 기본값)
    pub fn bucket(&self) -> &str {
        self.time_series
            .influx()
            .map(|c| c.bucket.as_str())
            .unwrap_or(DEFAULT_INFLUX_BUCKET)
    }

    // ==================== 경로 ====================

    /// 병합된 히스토리 데이터
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("00_data_raw")
    }

    /// 구간별 히스토리 원본
    pub fn archive_dir(&self) -> PathBuf {
        self.data_dir().join("archive")
    }

    pub fn news_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("news")
    }

    pub fn stock_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("stock")
    }

    pub fn economy_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("economy")
    }

    /// 대시보드 JSON 등 산출물
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join("03_outputs")
    }

    // ==================== 검증 ====================

    /// 네이버 API 키 쌍
    pub fn naver_credentials(&self) -> Option<(&str, &str)> {
        Some((
            self.naver_client_id.as_deref()?,
            self.naver_client_secret.as_deref()?,
        ))
    }

    /// Telegram 전송 설정. 토큰/채팅 ID가 없으면 `None`.
    pub fn telegram_config(&self) -> Option<TelegramConfig> {
        let token = self.telegram.bot_token.as_ref()?;
        let chat_id = self.telegram.chat_id.as_ref()?;
        let config = TelegramConfig::new(token, chat_id).with_enabled(self.telegram.enabled);
        config.is_configured().then_some(config)
    }

    /// 설정되지 않은 필수 키 목록.
    pub fn validate(&self) -> Vec<&'static str> {
        let required = [
            ("NAVER_CLIENT_ID", self.naver_client_id.is_some()),
            ("NAVER_CLIENT_SECRET", self.naver_client_secret.is_some()),
            ("BOK_API_KEY", self.bok_api_key.is_some()),
            ("FRED_API_KEY", self.fred_api_key.is_some()),
            ("INFLUXDB_TOKEN", self.time_series.is_enabled()),
            ("GRAFANA_PASSWORD", self.grafana.password.is_some()),
        ];

        required
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(key, _)| key)
            .collect()
    }

    /// 설정 상태 출력용 줄 목록 (비밀 값은 마스킹).
    pub fn status_lines(&self) -> Vec<String> {
        let influx = self.time_series.influx();
        let telegram_token = self
            .telegram
            .bot_token
            .as_deref()
            .filter(|t| *t != PLACEHOLDER_BOT_TOKEN);

        vec![
            "[API 키]".to_string(),
            format!("  NAVER_CLIENT_ID: {}", mask(self.naver_client_id.as_deref())),
            format!("  NAVER_CLIENT_SECRET: {}", mask(self.naver_client_secret.as_deref())),
            format!("  BOK_API_KEY: {}", mask(self.bok_api_key.as_deref())),
            format!("  FRED_API_KEY: {}", mask(self.fred_api_key.as_deref())),
            "[InfluxDB]".to_string(),
            format!("  URL: {}", influx.map(|c| c.url.as_str()).unwrap_or(DEFAULT_INFLUX_URL)),
            format!("  TOKEN: {}", mask(influx.map(|c| c.token.as_str()))),
            format!("  ORG: {}", influx.map(|c| c.org.as_str()).unwrap_or(DEFAULT_INFLUX_ORG)),
            format!("  BUCKET: {}", self.bucket()),
            "[Grafana]".to_string(),
            format!("  URL: {}", self.grafana.url),
            format!("  USER: {}", self.grafana.user),
            format!("  PASSWORD: {}", mask(self.grafana.password.as_deref())),
            "[Telegram]".to_string(),
            format!("  BOT_TOKEN: {}", mask(telegram_token)),
            format!("  CHAT_ID: {}", mask(self.telegram.chat_id.as_deref())),
            format!("  ENABLED: {}", self.telegram.enabled),
            "[경로/수집]".to_string(),
            format!("  DATA_BASE_DIR: {}", self.base_dir.display()),
            format!("  BATCH_SIZE: {}", self.batch_size),
            format!("  REQUEST_DELAY_MS: {}", self.request_delay_ms),
            format!("  NEWS_DISPLAY: {}", self.news_display),
        ]
    }
}

/// 비밀 값을 앞 4글자만 남기고 가립니다.
fn mask(value: Option<&str>) -> String {
    match value {
        Some(v) => {
            let visible: String = v.chars().take(MASK_VISIBLE_CHARS).collect();
            format!("✅ 설정됨 ({}...)", visible)
        }
        None => "❌ 미설정".to_string(),
    }
}

/// 환경변수 조회 헬퍼.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// 빈 문자열은 미설정으로 취급
    fn opt(&self, key: &str) -> Option<String> {
        env_var_opt((self.0)(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        env_var_parse(self.opt(key), default)
    }

    fn bool(&self, key: &str, default: bool) -> bool {
        env_var_bool(self.opt(key), default)
    }
}

fn env_var_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 환경변수에서 값 파싱 (실패 시 기본값)
fn env_var_parse<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> CollectorConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CollectorConfig::from_lookup(move |key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_env() {
        let config = config_from(&[]);

        assert!(config.naver_client_id.is_none());
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.request_delay(), Duration::from_millis(200));
        assert_eq!(config.news_display, 5);
        assert_eq!(config.bucket(), "econ_market");
        assert_eq!(config.grafana.url, "http://localhost:3000");
        assert!(config.telegram.enabled);
        assert!(matches!(
            config.time_series,
            TimeSeriesCapability::Disabled { .. }
        ));
    }

    #[test]
    fn test_influx_enabled_with_token() {
        let config = config_from(&[
            ("INFLUXDB_TOKEN", "tok"),
            ("INFLUXDB_BUCKET", "custom"),
        ]);

        let influx = config.time_series.influx().unwrap();
        assert_eq!(influx.url, "http://localhost:8086");
        assert_eq!(influx.org, "my-org");
        assert_eq!(influx.bucket, "custom");
        assert_eq!(config.bucket(), "custom");
    }

    #[test]
    fn test_empty_value_is_unset() {
        let config = config_from(&[("BOK_API_KEY", "  "), ("INFLUXDB_TOKEN", "")]);
        assert!(config.bok_api_key.is_none());
        assert!(!config.time_series.is_enabled());
    }

    #[test]
    fn test_invalid_number_falls_back() {
        let config = config_from(&[("BATCH_SIZE", "abc"), ("REQUEST_DELAY_MS", "50")]);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.request_delay_ms, 50);
    }

    #[test]
    fn test_derived_paths() {
        let config = config_from(&[("DATA_BASE_DIR", "/data")]);
        assert_eq!(config.data_dir(), PathBuf::from("/data/00_data_raw"));
        assert_eq!(config.archive_dir(), PathBuf::from("/data/00_data_raw/archive"));
        assert_eq!(config.news_dir(), PathBuf::from("/data/data/news"));
        assert_eq!(config.output_dir(), PathBuf::from("/data/03_outputs"));
    }

    #[test]
    fn test_telegram_config() {
        let config = config_from(&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "42")]);
        assert!(config.telegram_config().is_some());

        let placeholder = config_from(&[
            ("TELEGRAM_BOT_TOKEN", PLACEHOLDER_BOT_TOKEN),
            ("TELEGRAM_CHAT_ID", "42"),
        ]);
        assert!(placeholder.telegram_config().is_none());

        let missing_chat = config_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")]);
        assert!(missing_chat.telegram_config().is_none());
    }

    #[test]
    fn test_validate_lists_missing() {
        let config = config_from(&[
            ("NAVER_CLIENT_ID", "id"),
            ("NAVER_CLIENT_SECRET", "secret"),
            ("INFLUXDB_TOKEN", "tok"),
        ]);
        assert_eq!(
            config.validate(),
            vec!["BOK_API_KEY", "FRED_API_KEY", "GRAFANA_PASSWORD"]
        );
    }

    #[test]
    fn test_status_masks_secrets() {
        let config = config_from(&[("FRED_API_KEY", "abcdef123456")]);
        let lines = config.status_lines().join("\n");

        assert!(lines.contains("FRED_API_KEY: ✅ 설정됨 (abcd...)"));
        assert!(!lines.contains("abcdef123456"));
        assert!(lines.contains("BOK_API_KEY: ❌ 미설정"));
    }

    #[test]
    fn test_env_var_bool() {
        assert!(env_var_bool(Some("TRUE".into()), false));
        assert!(env_var_bool(Some("1".into()), false));
        assert!(!env_var_bool(Some("no".into()), true));
        assert!(env_var_bool(None, true));
    }
}
