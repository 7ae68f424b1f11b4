use crate::domain::{ArticleDetail, ArticleId, ArticlePage};
use crate::errors::FeedResult;

#[cfg_attr(test, mockall::automock)]
pub trait ArticleRepository: Send + Sync {
    /// Fetch one page of summaries starting at `cursor` (empty for the first page)
    fn fetch_list(&self, page_size: u32, cursor: &str, keywords: &str) -> FeedResult<ArticlePage>;

    /// Fetch a full article by id
    fn fetch_detail(&self, id: &ArticleId) -> FeedResult<ArticleDetail>;
}
