//! 텔레그램 알림 서비스.
//!
//! Telegram Bot API `sendMessage`로 수집 결과와 오류 알림을 전송합니다.

use crate::report::{format_collection_report, format_error_alert, format_test_message};
use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationResult, NotificationSender,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Telegram Bot API 기본 주소
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";
/// `.env` 템플릿에 남아 있는 토큰 자리표시자
pub const PLACEHOLDER_BOT_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// 텔레그램 알림 전송 설정.
#[derive(Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// 전송 활성화 여부
    pub enabled: bool,
    /// 파싱 모드
    pub parse_mode: String,
    /// API 기본 주소
    pub api_base: String,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            enabled: true,
            parse_mode: "HTML".to_string(),
            api_base: TELEGRAM_API_URL.to_string(),
        }
    }

    /// 활성화 여부 설정
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// API 기본 주소 변경 (테스트 서버 등)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// 토큰과 채팅 ID가 모두 설정되어 있고 토큰이 자리표시자가 아닌지 확인합니다.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty()
            && !self.chat_id.is_empty()
            && self.bot_token != PLACEHOLDER_BOT_TOKEN
    }

    fn send_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .field("enabled", &self.enabled)
            .field("parse_mode", &self.parse_mode)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// 텔레그램 알림 전송기.
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> NotificationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::InvalidConfig(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// 알림을 텔레그램 메시지로 포맷합니다.
    fn format_message(&self, notification: &Notification) -> String {
        match &notification.event {
            NotificationEvent::CollectionReport {
                summary,
                dashboard_url,
            } => format_collection_report(
                summary.results(),
                Duration::from_millis(summary.total_elapsed_ms()),
                notification.timestamp,
                dashboard_url,
            ),
            NotificationEvent::CollectionError { task_name, message } => {
                format_error_alert(task_name, message, notification.timestamp)
            }
            NotificationEvent::Test => format_test_message(notification.timestamp),
        }
    }

    /// 텍스트 메시지를 전송합니다.
    pub async fn send_message(&self, text: &str) -> NotificationResult<()> {
        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": self.config.parse_mode,
        });

        debug!(chat_id = %self.config.chat_id, "Telegram 메시지 전송");

        let response = self
            .client
            .post(self.config.send_url())
            .json(&params)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            info!("Telegram 알림 전송 완료");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();

        // 요청 한도 제한 확인
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Telegram 요청 한도 초과");
            return Err(NotificationError::RateLimited(retry_after(&body).unwrap_or(60)));
        }

        error!(status = %status, body = %body, "Telegram 메시지 전송 실패");
        Err(NotificationError::SendFailed(format!("HTTP {}: {}", status, body)))
    }
}

/// 429 응답 본문의 `parameters.retry_after` (초).
fn retry_after(body: &str) -> Option<u64> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("parameters")?.get("retry_after")?.as_u64()
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Telegram 알림 비활성화, 전송 생략");
            return Ok(());
        }

        let message = self.format_message(notification);
        self.send_message(&message).await
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && self.config.is_configured()
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

/// 알림 전송 래퍼.
///
/// 등록된 전송기로 알림을 보내고 결과를 `bool`로만 알려줍니다.
/// 전송 실패는 로그로 남기며 호출자에게 전파하지 않습니다.
#[derive(Default)]
pub struct Notifier {
    senders: Vec<Box<dyn NotificationSender>>,
}

impl Notifier {
    /// 전송기가 없는 알림 래퍼 (모든 전송은 `false`).
    pub fn new() -> Self {
        Self::default()
    }

    /// 전송기 추가
    pub fn add_sender(&mut self, sender: Box<dyn NotificationSender>) {
        info!(sender = sender.name(), enabled = sender.is_enabled(), "알림 전송기 등록");
        self.senders.push(sender);
    }

    /// 텔레그램 설정으로 알림 래퍼를 만듭니다.
    ///
    /// 설정이 없거나 클라이언트 생성에 실패하면 전송기 없이 생성됩니다.
    pub fn telegram(config: Option<TelegramConfig>) -> Self {
        let mut notifier = Self::new();
        match config.map(TelegramSender::new) {
            Some(Ok(sender)) => notifier.add_sender(Box::new(sender)),
            Some(Err(e)) => warn!(error = %e, "Telegram 전송기 생성 실패"),
            None => debug!("Telegram 설정 없음"),
        }
        notifier
    }

    /// 활성화된 전송기가 있는지 여부.
    pub fn is_enabled(&self) -> bool {
        self.senders.iter().any(|s| s.is_enabled())
    }

    /// 알림을 전송합니다.
    ///
    /// 활성화된 전송기 중 하나라도 성공하면 `true`를 반환합니다.
    pub async fn send(&self, notification: &Notification) -> bool {
        let mut delivered = false;

        for sender in self.senders.iter().filter(|s| s.is_enabled()) {
            match sender.send(notification).await {
                Ok(()) => delivered = true,
                Err(e) => {
                    error!(sender = sender.name(), error = %e, "알림 전송 실패");
                }
            }
        }

        if !delivered && !self.is_enabled() {
            debug!("활성화된 알림 전송기 없음");
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use econ_core::{CollectionResult, RunSummary};
    use mockito::Matcher;

    fn sample_summary() -> RunSummary {
        let mut summary = RunSummary::new();
        summary.push(CollectionResult::from_counts("news", 20, 0, 1_200, Vec::<String>::new()));
        summary.push(CollectionResult::from_counts("stock", 60, 8, 45_000, ["AAPL: no_data"]));
        summary.set_total_elapsed(Duration::from_millis(46_500));
        summary
    }

    #[test]
    fn test_is_configured_rejects_placeholder() {
        assert!(TelegramConfig::new("123:abc", "42").is_configured());
        assert!(!TelegramConfig::new(PLACEHOLDER_BOT_TOKEN, "42").is_configured());
        assert!(!TelegramConfig::new("123:abc", "").is_configured());
        assert!(!TelegramConfig::new("", "42").is_configured());
    }

    #[test]
    fn test_debug_masks_token() {
        let config = TelegramConfig::new("123:secret", "42");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_format_collection_report_event() {
        let sender = TelegramSender::new(TelegramConfig::new("t", "1")).unwrap();
        let mut notification = Notification::collection_report(sample_summary(), "http://grafana");
        notification.timestamp = Utc.with_ymd_and_hms(2025, 12, 4, 0, 30, 0).unwrap();

        let message = sender.format_message(&notification);
        assert!(message.contains("데이터 수집 실패"));
        assert!(message.contains("📈 stock: 60✓ / 8✗ (45.0s) ⚠️"));
        assert!(message.contains("⏱️ 총 46.5초"));
    }

    #[test]
    fn test_format_collection_error_event() {
        let sender = TelegramSender::new(TelegramConfig::new("t", "1")).unwrap();
        let notification = Notification::collection_error("total", "CSV <쓰기> 실패");

        let message = sender.format_message(&notification);
        assert!(message.contains("긴급: 데이터 수집 오류"));
        assert!(message.contains("📌 작업: total"));
        assert!(message.contains("CSV &lt;쓰기&gt; 실패"));
    }

    #[tokio::test]
    async fn test_send_message_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJsonString(
                r#"{"chat_id":"42","text":"hello","parse_mode":"HTML"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let config = TelegramConfig::new("123:abc", "42").with_api_base(server.url());
        let sender = TelegramSender::new(config).unwrap();
        sender.send_message("hello").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(429)
            .with_body(r#"{"ok":false,"parameters":{"retry_after":17}}"#)
            .create_async()
            .await;

        let config = TelegramConfig::new("123:abc", "42").with_api_base(server.url());
        let sender = TelegramSender::new(config).unwrap();
        let err = sender.send_message("hello").await.unwrap_err();
        assert!(matches!(err, NotificationError::RateLimited(17)));
    }

    #[tokio::test]
    async fn test_notifier_returns_false_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let config = TelegramConfig::new("123:abc", "42").with_api_base(server.url());
        let notifier = Notifier::telegram(Some(config));
        assert!(notifier.is_enabled());
        assert!(!notifier.send(&Notification::new(NotificationEvent::Test)).await);
    }

    #[tokio::test]
    async fn test_notifier_returns_true_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::Regex("Telegram 알림 테스트".to_string()))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let config = TelegramConfig::new("123:abc", "42").with_api_base(server.url());
        let notifier = Notifier::telegram(Some(config));
        assert!(notifier.send(&Notification::new(NotificationEvent::Test)).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_disabled_notifier_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let config = TelegramConfig::new("123:abc", "42")
            .with_enabled(false)
            .with_api_base(server.url());
        let notifier = Notifier::telegram(Some(config));
        assert!(!notifier.is_enabled());
        assert!(!notifier.send(&Notification::new(NotificationEvent::Test)).await);

        assert!(!Notifier::telegram(None).send(&Notification::new(NotificationEvent::Test)).await);
        mock.assert_async().await;
    }
}
