//! Raw payload shapes of the content API and their conversion into domain
//! types. Nothing outside this module sees a wire struct.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::article::UNCATEGORIZED;
use crate::domain::{ArticleDetail, ArticleId, ArticlePage, ArticleSummary, Author};
use crate::errors::{FeedError, FeedResult};

fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct StringOrNumberVisitor;

    impl<'de> Visitor<'de> for StringOrNumberVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_i64<E>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_str<E>(self, v: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

/// Treat JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct ListEnvelope {
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub msg: String,
    pub data: Option<ListData>,
}

#[derive(Debug, Deserialize)]
pub struct ListData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<WireArticleItem>,
    pub meta: Option<WireMeta>,
}

#[derive(Debug, Deserialize)]
pub struct WireMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct WireArticleItem {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub img_list: Vec<String>,
    pub publish_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct DetailEnvelope {
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub msg: String,
    pub data: Option<DetailOuter>,
}

/// The detail endpoint nests the article one level deeper than the list.
#[derive(Debug, Deserialize)]
pub struct DetailOuter {
    pub data: Option<WireArticleDetail>,
}

#[derive(Debug, Deserialize)]
pub struct WireArticleDetail {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub news_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub img_list: Vec<String>,
    pub publish_at: i64,
}

fn api_error(code: i64, msg: String) -> FeedError {
    let message = if msg.is_empty() {
        "API returned an error".to_string()
    } else {
        msg
    };
    FeedError::Api { code, message }
}

/// Wire timestamps are epoch seconds.
fn publish_date(epoch_secs: i64) -> FeedResult<DateTime<Utc>> {
    epoch_secs
        .checked_mul(1000)
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| FeedError::Payload(format!("publish_at out of range: {}", epoch_secs)))
}

fn category(channel: Option<&str>) -> String {
    match channel {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

impl WireArticleItem {
    /// List-sourced summaries carry no tags and the constant reading time.
    pub fn into_summary(self) -> FeedResult<ArticleSummary> {
        let mut summary = ArticleSummary::new(ArticleId::new(self.id), self.title)
            .with_images(self.img_list)
            .with_publish_date(publish_date(self.publish_at)?);
        summary.description = self.excerpt;
        summary.author = Author { name: self.author };
        summary.category = category(self.channel.as_deref());
        summary.channel = self.channel;
        summary.link = self.link;
        Ok(summary)
    }
}

impl WireArticleDetail {
    /// Split off the body fields, leaving the list-shaped part.
    fn into_parts(self) -> (WireArticleItem, String, Option<String>) {
        let item = WireArticleItem {
            id: self.news_id,
            title: self.title,
            excerpt: self.excerpt,
            author: self.author,
            link: self.link,
            channel: self.channel,
            img_list: self.img_list,
            publish_at: self.publish_at,
        };
        (item, self.content, self.keywords)
    }

    pub fn into_detail(self) -> FeedResult<ArticleDetail> {
        let (item, content, keywords) = self.into_parts();
        let summary = item.into_summary()?;
        Ok(ArticleDetail::new(summary, content, keywords.as_deref()))
    }
}

/// Decode a list response body into a page.
pub fn parse_list(body: &str) -> FeedResult<ArticlePage> {
    let envelope: ListEnvelope = serde_json::from_str(body)?;

    if envelope.code != 0 {
        return Err(api_error(envelope.code, envelope.msg));
    }

    let data = envelope
        .data
        .ok_or_else(|| FeedError::Payload("list response has no data".to_string()))?;

    let items = data
        .list
        .into_iter()
        .map(WireArticleItem::into_summary)
        .collect::<FeedResult<Vec<_>>>()?;

    let (next_cursor, total_available) = match data.meta {
        Some(meta) => (meta.next_token, meta.result_count),
        None => (String::new(), items.len() as i64),
    };

    Ok(ArticlePage {
        items,
        next_cursor,
        total_available,
    })
}

/// Decode a detail response body, unwrapping the `data.data` envelope.
pub fn parse_detail(body: &str, requested: &ArticleId) -> FeedResult<ArticleDetail> {
    let envelope: DetailEnvelope = serde_json::from_str(body)?;

    if envelope.code != 0 {
        return Err(api_error(envelope.code, envelope.msg));
    }

    envelope
        .data
        .and_then(|outer| outer.data)
        .ok_or_else(|| FeedError::NotFound(requested.to_string()))?
        .into_detail()
}
