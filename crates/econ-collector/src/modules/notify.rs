//! Telegram 연결 테스트.

use econ_notification::{Notification, NotificationEvent, Notifier};
use tracing::info;

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};

/// 테스트 메시지를 보냅니다.
///
/// Telegram이 설정되지 않았거나 전송에 실패하면 오류를 반환합니다.
pub async fn send_test(config: &CollectorConfig) -> Result<()> {
    let telegram = config
        .telegram_config()
        .ok_or_else(|| CollectorError::Config("Telegram 미설정 또는 비활성".to_string()))?;

    let notifier = Notifier::telegram(Some(telegram));
    if !notifier.send(&Notification::new(NotificationEvent::Test)).await {
        return Err(CollectorError::Config("Telegram 테스트 메시지 전송 실패".to_string()));
    }

    info!("Telegram 테스트 메시지 전송 완료");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_test_requires_config() {
        let config = CollectorConfig::from_lookup(|_| None);
        assert!(matches!(
            send_test(&config).await,
            Err(CollectorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_send_test_disabled() {
        let config = CollectorConfig::from_lookup(|key| match key {
            "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
            "TELEGRAM_CHAT_ID" => Some("42".to_string()),
            "TELEGRAM_ENABLED" => Some("false".to_string()),
            _ => None,
        });
        assert!(send_test(&config).await.is_err());
    }
}
