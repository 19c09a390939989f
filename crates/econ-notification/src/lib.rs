//! # Econ Notification
//!
//! 수집 결과 알림 서비스.
//!
//! 지원 채널:
//! - Telegram
//!
//! 메시지 포맷(`report`)은 I/O 없는 순수 함수이며,
//! 전송은 `NotificationSender` 구현체에 위임합니다.

pub mod report;
pub mod telegram;
pub mod types;

pub use report::*;
pub use telegram::*;
pub use types::*;
