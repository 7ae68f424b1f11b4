use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::sanitize;

/// Category label used when the API does not provide a channel.
pub const UNCATEGORIZED: &str = "uncategorized";

/// The list endpoint carries no reading-time data; summaries get this constant.
pub const LIST_READ_TIME_MINUTES: u32 = 5;

/// Characters of content per estimated minute of reading.
pub const CHARS_PER_MINUTE: usize = 400;

/// Opaque article identifier. The API sends numbers or strings; both
/// compare by their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ArticleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for ArticleId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub author: Author,
    pub cover_image: Option<String>,
    pub img_list: Vec<String>,
    pub category: String,
    pub publish_date: DateTime<Utc>,
    pub read_time: u32,
    pub tags: Vec<String>,
    pub link: Option<String>,
    pub channel: Option<String>,
}

impl ArticleSummary {
    pub fn new(id: impl Into<ArticleId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            author: Author {
                name: String::new(),
            },
            cover_image: None,
            img_list: Vec::new(),
            category: UNCATEGORIZED.to_string(),
            publish_date: DateTime::<Utc>::default(),
            read_time: LIST_READ_TIME_MINUTES,
            tags: Vec::new(),
            link: None,
            channel: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.channel = Some(category.clone());
        self.category = category;
        self
    }

    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author.name = name.into();
        self
    }

    /// Attach the image list; the first image becomes the cover unless one is set.
    pub fn with_images(mut self, img_list: Vec<String>) -> Self {
        if self.cover_image.is_none() {
            self.cover_image = img_list.first().cloned();
        }
        self.img_list = img_list;
        self
    }

    pub fn with_publish_date(mut self, publish_date: DateTime<Utc>) -> Self {
        self.publish_date = publish_date;
        self
    }

    /// ISO-8601 with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
    pub fn publish_date_iso(&self) -> String {
        self.publish_date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    /// Raw HTML from the API. Untrusted.
    pub content: String,
}

impl ArticleDetail {
    /// Build a detail from its summary fields and raw body. Tags come from
    /// the comma-separated keyword string and the reading time from the
    /// body length.
    pub fn new(mut summary: ArticleSummary, content: String, keywords: Option<&str>) -> Self {
        summary.tags = keywords.map(split_keywords).unwrap_or_default();
        summary.read_time = estimate_read_time(&content);
        Self { summary, content }
    }

    pub fn id(&self) -> &ArticleId {
        &self.summary.id
    }

    pub fn category(&self) -> &str {
        &self.summary.category
    }

    pub fn sanitized_content(&self) -> String {
        sanitize::sanitize_html(&self.content)
    }
}

pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| k.to_string())
        .collect()
}

/// Minutes to read `content`, counted in UTF-16 units, never below one.
pub fn estimate_read_time(content: &str) -> u32 {
    let len = content.encode_utf16().count();
    let minutes = len.div_ceil(CHARS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_article_id_from_number_and_string_compare_equal() {
        assert_eq!(ArticleId::from(42), ArticleId::from("42"));
        assert_eq!(ArticleId::from(7).to_string(), "7");
    }

    #[test]
    fn test_split_keywords_trims_and_drops_empty() {
        let tags = split_keywords(" bitcoin, ,wallet ,, defi ");
        assert_eq!(tags, vec!["bitcoin", "wallet", "defi"]);
        assert!(split_keywords("").is_empty());
    }

    #[test]
    fn test_estimate_read_time() {
        assert_eq!(estimate_read_time(""), 1);
        assert_eq!(estimate_read_time(&"a".repeat(400)), 1);
        assert_eq!(estimate_read_time(&"a".repeat(401)), 2);
        assert_eq!(estimate_read_time(&"a".repeat(1200)), 3);
    }

    #[test]
    fn test_estimate_read_time_counts_utf16_units() {
        // Each CJK character is one UTF-16 unit but three UTF-8 bytes
        assert_eq!(estimate_read_time(&"币".repeat(400)), 1);
        assert_eq!(estimate_read_time(&"币".repeat(401)), 2);
    }

    #[test]
    fn test_with_images_sets_cover_from_first() {
        let summary = ArticleSummary::new("1", "Title").with_images(vec![
            "https://img/a.png".to_string(),
            "https://img/b.png".to_string(),
        ]);
        assert_eq!(summary.cover_image.as_deref(), Some("https://img/a.png"));

        let bare = ArticleSummary::new("2", "Title").with_images(vec![]);
        assert_eq!(bare.cover_image, None);
    }

    #[test]
    fn test_detail_derives_tags_and_read_time() {
        let summary = ArticleSummary::new("9", "Title");
        let detail = ArticleDetail::new(summary, "x".repeat(900), Some("a, b,"));
        assert_eq!(detail.summary.tags, vec!["a", "b"]);
        assert_eq!(detail.summary.read_time, 3);

        let untagged = ArticleDetail::new(ArticleSummary::new("10", "T"), String::new(), None);
        assert!(untagged.summary.tags.is_empty());
        assert_eq!(untagged.summary.read_time, 1);
    }

    #[test]
    fn test_publish_date_iso_format() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summary = ArticleSummary::new("1", "T").with_publish_date(date);
        assert_eq!(summary.publish_date_iso(), "2024-01-01T00:00:00.000Z");
    }
}
