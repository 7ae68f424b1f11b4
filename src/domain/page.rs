use serde::{Deserialize, Serialize};

use super::article::{ArticleDetail, ArticleSummary};

/// Number of recent articles scanned for related-article candidates.
pub const RELATED_CANDIDATE_POOL: u32 = 20;

/// Maximum related articles shown under a detail.
pub const RELATED_LIMIT: usize = 3;

/// One page of a list fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub items: Vec<ArticleSummary>,
    /// Empty when the API reports no further pages.
    pub next_cursor: String,
    pub total_available: i64,
}

impl ArticlePage {
    pub fn new(items: Vec<ArticleSummary>, next_cursor: impl Into<String>) -> Self {
        let total_available = items.len() as i64;
        Self {
            items,
            next_cursor: next_cursor.into(),
            total_available,
        }
    }

    /// More pages exist only if the API handed back a cursor and this page
    /// was not empty. A cursor alone would keep polling an empty feed.
    pub fn has_more(&self) -> bool {
        !self.next_cursor.is_empty() && !self.items.is_empty()
    }
}

/// Pick up to [`RELATED_LIMIT`] candidates sharing the detail's category,
/// excluding the detail itself, in candidate order.
pub fn select_related(detail: &ArticleDetail, candidates: &[ArticleSummary]) -> Vec<ArticleSummary> {
    candidates
        .iter()
        .filter(|c| c.category == detail.category() && &c.id != detail.id())
        .take(RELATED_LIMIT)
        .cloned()
        .collect()
}
