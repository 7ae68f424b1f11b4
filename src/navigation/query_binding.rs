//! Two-way binding between the open overlay and the page URL.
//!
//! The `id` query parameter is the only state that survives a reload: its
//! presence means "open this article", its absence means closed.

use url::Url;

use crate::domain::ArticleId;

pub const OVERLAY_PARAM: &str = "id";

/// Read the overlay id from `url`. Empty values count as absent.
pub fn overlay_id_from_url(url: &Url) -> Option<ArticleId> {
    url.query_pairs()
        .find(|(key, _)| key == OVERLAY_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(ArticleId::from)
}

/// Return `url` with the overlay parameter set to `id`, or removed when
/// `id` is `None`. Other parameters keep their order.
pub fn url_with_overlay_id(url: &Url, id: Option<&ArticleId>) -> Url {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != OVERLAY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut updated = url.clone();
    if retained.is_empty() && id.is_none() {
        updated.set_query(None);
        return updated;
    }

    {
        let mut pairs = updated.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        if let Some(id) = id {
            pairs.append_pair(OVERLAY_PARAM, id.as_str());
        }
    }
    updated
}

/// Shareable link to an article overlay on the public site.
pub fn share_url(site_origin: &str, id: &ArticleId) -> Option<Url> {
    let base = Url::parse(site_origin).ok()?.join("/articles").ok()?;
    Some(url_with_overlay_id(&base, Some(id)))
}
