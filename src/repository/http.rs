use reqwest::blocking::Client;
use url::Url;

use crate::config::Config;
use crate::domain::{ArticleDetail, ArticleId, ArticlePage};
use crate::errors::{FeedError, FeedResult};
use crate::repository::traits::ArticleRepository;
use crate::repository::wire;

const USER_AGENT: &str = concat!("rumenbao/", env!("CARGO_PKG_VERSION"));

/// Content API client backed by a blocking reqwest client.
pub struct HttpArticleRepository {
    client: Client,
    base: String,
}

impl HttpArticleRepository {
    pub fn new(config: &Config) -> FeedResult<Self> {
        Url::parse(&config.api_base).map_err(|e| FeedError::InvalidUrl(e.to_string()))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> FeedResult<Url> {
        Url::parse_with_params(&format!("{}/{}", self.base, path), params)
            .map_err(|e| FeedError::InvalidUrl(e.to_string()))
    }

    pub fn list_url(&self, page_size: u32, cursor: &str, keywords: &str) -> FeedResult<Url> {
        let max_results = page_size.to_string();
        self.endpoint(
            "getArticleList",
            &[
                ("max_results", max_results.as_str()),
                ("next_token", cursor),
                ("keywords", keywords),
            ],
        )
    }

    pub fn detail_url(&self, id: &ArticleId) -> FeedResult<Url> {
        self.endpoint("detail", &[("news_id", id.as_str())])
    }

    /// GET `url` and return the body of a successful response.
    fn get_body(&self, url: Url) -> FeedResult<String> {
        tracing::debug!(%url, "requesting");

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "content API returned error status");
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }
}

impl ArticleRepository for HttpArticleRepository {
    fn fetch_list(&self, page_size: u32, cursor: &str, keywords: &str) -> FeedResult<ArticlePage> {
        if page_size == 0 {
            return Err(FeedError::InvalidInput(
                "page size must be positive".to_string(),
            ));
        }

        let url = self.list_url(page_size, cursor, keywords)?;
        let body = self.get_body(url)?;
        let page = wire::parse_list(&body)?;

        tracing::debug!(
            items = page.items.len(),
            next_cursor = %page.next_cursor,
            "fetched article page"
        );

        Ok(page)
    }

    fn fetch_detail(&self, id: &ArticleId) -> FeedResult<ArticleDetail> {
        let url = self.detail_url(id)?;
        let body = self.get_body(url)?;
        wire::parse_detail(&body, id)
    }
}
