//! 뉴스 수집 작업.
//!
//! 키워드마다 네이버 뉴스 검색을 한 번 호출합니다.
//! 응답 항목 하나가 성공 1건이며, 호출 실패는 키워드당 실패 1건입니다.

use chrono::{DateTime, Utc};
use econ_core::{FetchStatus, NewsRow, ResultAggregator, RunSummary};
use econ_data::NewsSource;
use std::path::Path;
use tracing::{info, warn};

use super::persist::{finish_job, skip_job, Persistence};
use crate::error::Result;

pub const TASK_NAME: &str = "news";

/// 키워드별 뉴스를 조회해 행으로 만듭니다.
pub async fn fetch_news(
    source: &dyn NewsSource,
    keywords: &[&str],
    display: u32,
    now: DateTime<Utc>,
    aggregator: &mut ResultAggregator,
) -> Vec<NewsRow> {
    let mut rows = Vec::new();

    for keyword in keywords {
        match source.search(keyword, display).await {
            Ok(items) => {
                info!(keyword, count = items.len(), "뉴스 수집");
                aggregator.add_success(items.len() as u64);
                rows.extend(items.into_iter().map(|item| NewsRow {
                    timestamp: now,
                    keyword: keyword.to_string(),
                    title: item.title,
                    link: item.link,
                    description: item.description,
                    pub_date: item.pub_date,
                    status: FetchStatus::Success,
                }));
            }
            Err(e) => {
                let status = e.to_fetch_status();
                warn!(keyword, status = %status, "뉴스 수집 실패");
                aggregator.add_fail(1, Some(&format!("{}: {}", keyword, status)));
                rows.push(NewsRow::failed(now, *keyword, status));
            }
        }
    }

    rows
}

/// 뉴스 작업 전체를 실행합니다.
///
/// `source`가 `Err`이면 그 사유로 실패 1건을 기록하고 건너뜁니다.
pub async fn run_news_job(
    source: std::result::Result<&dyn NewsSource, String>,
    keywords: &[&str],
    display: u32,
    csv_path: &Path,
    persistence: &Persistence<'_>,
    summary: &mut RunSummary,
) -> Result<()> {
    let source = match source {
        Ok(source) => source,
        Err(reason) => return skip_job(TASK_NAME, &reason, persistence, summary).await,
    };

    info!("[뉴스 수집]");
    let mut aggregator = ResultAggregator::new(TASK_NAME);
    aggregator.start();

    let rows = fetch_news(source, keywords, display, Utc::now(), &mut aggregator).await;
    persistence.store_rows(TASK_NAME, csv_path, &rows).await;

    finish_job(&aggregator, persistence, summary).await
}
