//! 알림 메시지 포맷.
//!
//! Telegram HTML parse mode용 문자열을 만드는 순수 함수 모음입니다.
//! 네트워크 I/O는 하지 않습니다.

use chrono::{DateTime, Utc};
use chrono_tz::Asia::Seoul;
use econ_core::text::truncate_chars;
use econ_core::CollectionResult;
use std::fmt::Write as _;
use std::time::Duration;

/// 작업별로 표시하는 에러 최대 개수
pub const MAX_REPORTED_ERRORS: usize = 3;
/// 보고서 에러 한 줄 최대 길이 (문자 수)
pub const REPORT_ERROR_CHARS: usize = 50;
/// 긴급 알림 메시지 최대 길이 (문자 수)
pub const ALERT_MESSAGE_CHARS: usize = 200;

const RULE: &str = "<code>─────────────────────</code>";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 실행 전체 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Success,
    Failure,
}

impl ReportStatus {
    /// 작업 결과에서 전체 상태를 결정합니다.
    ///
    /// 실패 건수가 있는 작업이 하나라도 있으면 `Failure`입니다.
    pub fn from_results(results: &[CollectionResult]) -> Self {
        if results.iter().any(CollectionResult::has_failures) {
            Self::Failure
        } else {
            Self::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Failure => "❌",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Success => "성공",
            Self::Failure => "실패",
        }
    }
}

fn task_icon(task_name: &str) -> &'static str {
    match task_name {
        "news" => "📰",
        "stock" => "📈",
        "economy" => "💰",
        _ => "📌",
    }
}

fn local_time(now: DateTime<Utc>) -> String {
    now.with_timezone(&Seoul).format(TIME_FORMAT).to_string()
}

/// 수집 결과 보고서를 생성합니다.
///
/// ```text
/// <b>❌ 데이터 수집 실패</b>
/// ...
/// 📰 news: 20건 (1.2s)
/// 📈 stock: 60✓ / 8✗ (45.0s) ⚠️
/// ```
pub fn format_collection_report(
    results: &[CollectionResult],
    total_elapsed: Duration,
    now: DateTime<Utc>,
    dashboard_url: &str,
) -> String {
    let status = ReportStatus::from_results(results);
    let mut msg = String::new();

    let _ = writeln!(msg, "<b>{} 데이터 수집 {}</b>", status.icon(), status.label());
    let _ = writeln!(msg, "{}", RULE);
    let _ = writeln!(msg, "📅 {}", local_time(now));
    let _ = writeln!(msg, "⏱️ 총 {:.1}초", total_elapsed.as_secs_f64());
    let _ = writeln!(msg);
    let _ = writeln!(msg, "<b>📊 수집 결과</b>");

    for result in results {
        let icon = task_icon(result.task_name());
        let secs = result.execution_time().as_secs_f64();
        if result.has_failures() {
            let _ = writeln!(
                msg,
                "{} {}: {}✓ / {}✗ ({:.1}s) ⚠️",
                icon,
                result.task_name(),
                result.success_count(),
                result.fail_count(),
                secs
            );
        } else {
            let _ = writeln!(
                msg,
                "{} {}: {}건 ({:.1}s)",
                icon,
                result.task_name(),
                result.success_count(),
                secs
            );
        }
    }

    let failed: Vec<&CollectionResult> = results
        .iter()
        .filter(|r| r.has_failures() && !r.errors().is_empty())
        .collect();

    if !failed.is_empty() {
        let _ = writeln!(msg);
        let _ = writeln!(msg, "<b>⚠️ 에러 상세</b>");
        for result in failed {
            for err in result.errors().iter().take(MAX_REPORTED_ERRORS) {
                let _ = writeln!(
                    msg,
                    "• [{}] {}",
                    result.task_name(),
                    escape_html(&truncate_chars(err, REPORT_ERROR_CHARS))
                );
            }
        }
    }

    let _ = writeln!(msg);
    let _ = writeln!(msg, "{}", RULE);
    let _ = write!(msg, "🔗 <a href=\"{}\">Grafana 대시보드</a>", dashboard_url);
    msg
}

/// 작업 오류 긴급 알림을 생성합니다.
pub fn format_error_alert(task_name: &str, message: &str, now: DateTime<Utc>) -> String {
    format!(
        "🚨 <b>긴급: 데이터 수집 오류</b>\n\
         {rule}\n\
         📅 {time}\n\
         📌 작업: {task}\n\n\
         <b>에러 내용:</b>\n\
         <code>{body}</code>\n\n\
         {rule}\n\
         즉시 확인이 필요합니다.",
        rule = RULE,
        time = local_time(now),
        task = escape_html(task_name),
        body = escape_html(&truncate_chars(message, ALERT_MESSAGE_CHARS)),
    )
}

/// 연결 테스트 메시지를 생성합니다.
pub fn format_test_message(now: DateTime<Utc>) -> String {
    format!(
        "🔔 <b>Telegram 알림 테스트</b>\n\
         {rule}\n\
         📅 {time}\n\n\
         ✅ 연결 성공!\n\
         데이터 수집 결과가 이 채팅으로 전송됩니다.\n\
         수집 실패 시 에러 상세가 함께 표시됩니다.",
        rule = RULE,
        time = local_time(now),
    )
}

/// HTML parse mode에서 의미를 갖는 문자 이스케이프.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        // 2025-12-04 09:30:00 KST
        Utc.with_ymd_and_hms(2025, 12, 4, 0, 30, 0).unwrap()
    }

    fn mixed_results() -> Vec<CollectionResult> {
        vec![
            CollectionResult::from_counts("news", 20, 0, 1_200, Vec::<String>::new()),
            CollectionResult::from_counts(
                "stock",
                60,
                8,
                45_000,
                [
                    "AAPL: no_data",
                    "TSLA: error: connection reset by peer while reading response body",
                    "005930.KS: error_code_500",
                    "MSFT: no_data",
                ],
            ),
        ]
    }

    #[test]
    fn test_report_failure_when_any_job_failed() {
        let results = mixed_results();
        assert_eq!(ReportStatus::from_results(&results), ReportStatus::Failure);
        assert_eq!(ReportStatus::from_results(&results).as_str(), "failure");

        let msg = format_collection_report(
            &results,
            Duration::from_millis(46_500),
            fixed_now(),
            "http://localhost:3000",
        );

        assert!(msg.starts_with("<b>❌ 데이터 수집 실패</b>"));
        assert!(msg.contains("📅 2025-12-04 09:30:00"));
        assert!(msg.contains("⏱️ 총 46.5초"));
        assert!(msg.contains("📰 news: 20건 (1.2s)"));
        assert!(msg.contains("📈 stock: 60✓ / 8✗ (45.0s) ⚠️"));
        assert!(msg.ends_with("🔗 <a href=\"http://localhost:3000\">Grafana 대시보드</a>"));
    }

    #[test]
    fn test_report_errors_limited_and_truncated() {
        let msg = format_collection_report(
            &mixed_results(),
            Duration::from_secs(46),
            fixed_now(),
            "http://grafana",
        );

        let error_lines: Vec<&str> = msg.lines().filter(|l| l.starts_with("• ")).collect();
        assert_eq!(error_lines.len(), MAX_REPORTED_ERRORS);
        assert_eq!(error_lines[0], "• [stock] AAPL: no_data");
        assert!(!msg.contains("MSFT"));

        let long = error_lines[1].trim_start_matches("• [stock] ");
        assert_eq!(long.chars().count(), REPORT_ERROR_CHARS);
    }

    #[test]
    fn test_report_success() {
        let results = vec![
            CollectionResult::from_counts("news", 20, 0, 1_000, Vec::<String>::new()),
            CollectionResult::from_counts("economy", 7, 0, 2_340, Vec::<String>::new()),
        ];
        let msg = format_collection_report(&results, Duration::from_secs(3), fixed_now(), "u");

        assert!(msg.starts_with("<b>✅ 데이터 수집 성공</b>"));
        assert!(msg.contains("💰 economy: 7건 (2.3s)"));
        assert!(!msg.contains("에러 상세"));
    }

    #[test]
    fn test_error_alert_truncates_message() {
        let body = "x".repeat(300);
        let msg = format_error_alert("stock", &body, fixed_now());

        assert!(msg.starts_with("🚨 <b>긴급: 데이터 수집 오류</b>"));
        assert!(msg.contains("📌 작업: stock"));
        assert!(msg.contains(&format!("<code>{}</code>", "x".repeat(ALERT_MESSAGE_CHARS))));
        assert!(!msg.contains(&"x".repeat(ALERT_MESSAGE_CHARS + 1)));
        assert!(msg.ends_with("즉시 확인이 필요합니다."));
    }

    #[test]
    fn test_error_alert_escapes_html() {
        let msg = format_error_alert("news", "<html> body & more", fixed_now());
        assert!(msg.contains("<code>&lt;html&gt; body &amp; more</code>"));
    }

    #[test]
    fn test_test_message() {
        let msg = format_test_message(fixed_now());
        assert!(msg.contains("Telegram 알림 테스트"));
        assert!(msg.contains("📅 2025-12-04 09:30:00"));
        assert!(msg.contains("✅ 연결 성공!"));
    }
}
