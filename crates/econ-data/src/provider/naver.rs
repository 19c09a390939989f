//! 네이버 검색 API (뉴스) 클라이언트.
//!
//! ## 사용 예시
//! ```rust,ignore
//! let client = NaverNewsClient::new("client-id", "client-secret")?;
//! let items = client.search("반도체", 5).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{NewsItem, NewsSource};
use crate::error::{build_client, check_status, Result};

/// 네이버 Open API 기본 URL
pub const NAVER_API_URL: &str = "https://openapi.naver.com";

const SEARCH_PATH: &str = "/v1/search/news.json";

/// 네이버 뉴스 검색 클라이언트.
#[derive(Clone)]
pub struct NaverNewsClient {
    client: Client,
    client_id: String,
    client_secret: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "pubDate", default)]
    pub_date: String,
}

impl NaverNewsClient {
    /// 기본 설정으로 생성 (타임아웃 10초)
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_base_url(client_id, client_secret, NAVER_API_URL)
    }

    /// 기본 URL을 지정하여 생성
    pub fn with_base_url(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(10))?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NewsSource for NaverNewsClient {
    async fn search(&self, keyword: &str, count: u32) -> Result<Vec<NewsItem>> {
        debug!(keyword, count, "네이버 뉴스 검색");
        let display = count.to_string();

        let response = self
            .client
            .get(format!("{}{}", self.base_url, SEARCH_PATH))
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[
                ("query", keyword),
                ("display", display.as_str()),
                ("sort", "sim"),
            ])
            .send()
            .await?;

        let body: SearchResponse = check_status(response).await?.json().await?;

        Ok(body
            .items
            .into_iter()
            .map(|item| NewsItem {
                title: item.title,
                link: item.link,
                description: item.description,
                pub_date: item.pub_date,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_search_parses_items() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_header("X-Naver-Client-Id", "id")
            .match_header("X-Naver-Client-Secret", "secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "반도체".into()),
                Matcher::UrlEncoded("display".into(), "5".into()),
                Matcher::UrlEncoded("sort".into(), "sim".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total":2,"items":[
                    {"title":"<b>반도체</b> 수출","link":"https://n.news/1","description":"d1","pubDate":"Tue, 03 Dec 2024 10:00:00 +0900"},
                    {"title":"t2","link":"https://n.news/2","description":"d2","pubDate":"Tue, 03 Dec 2024 11:00:00 +0900"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = NaverNewsClient::with_base_url("id", "secret", server.url()).unwrap();
        let items = client.search("반도체", 5).await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "<b>반도체</b> 수출");
        assert_eq!(items[1].pub_date, "Tue, 03 Dec 2024 11:00:00 +0900");
    }

    #[tokio::test]
    async fn test_search_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"errorMessage":"Not Exist Client ID"}"#)
            .create_async()
            .await;

        let client = NaverNewsClient::with_base_url("bad", "bad", server.url()).unwrap();
        let err = client.search("경제", 5).await.unwrap_err();
        assert!(matches!(err, DataError::HttpStatus { status: 401, .. }));
    }
}
