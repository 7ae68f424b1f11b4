use std::thread;

use url::Url;

use crate::domain::page::RELATED_CANDIDATE_POOL;
use crate::domain::{select_related, ArticleDetail, ArticleId, ArticlePage, ArticleSummary};
use crate::errors::{FeedError, FeedResult};
use crate::navigation::{overlay_id_from_url, share_url, url_with_overlay_id, Location};
use crate::repository::ArticleRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Closed,
    Opening,
    Open,
    Failed,
}

/// Identifies one open cycle. Results carrying an old ticket are stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicket {
    pub id: ArticleId,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct OverlayState {
    pub open_id: Option<ArticleId>,
    pub detail: Option<ArticleDetail>,
    pub related: Vec<ArticleSummary>,
    pub phase: OverlayPhase,
    pub error: Option<String>,
    candidates: Option<Vec<ArticleSummary>>,
}

impl OverlayState {
    fn closed() -> Self {
        Self {
            open_id: None,
            detail: None,
            related: Vec::new(),
            phase: OverlayPhase::Closed,
            error: None,
            candidates: None,
        }
    }
}

/// Article detail overlay mirrored into the `id` query parameter.
pub struct DetailOverlayController<R: ArticleRepository, L: Location> {
    repository: R,
    location: L,
    site_origin: String,
    state: OverlayState,
    generation: u64,
}

impl<R: ArticleRepository, L: Location> DetailOverlayController<R, L> {
    pub fn new(repository: R, location: L, site_origin: impl Into<String>) -> Self {
        Self {
            repository,
            location,
            site_origin: site_origin.into(),
            state: OverlayState::closed(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn open_id(&self) -> Option<&ArticleId> {
        self.state.open_id.as_ref()
    }

    pub fn detail(&self) -> Option<&ArticleDetail> {
        self.state.detail.as_ref()
    }

    pub fn related(&self) -> &[ArticleSummary] {
        &self.state.related
    }

    pub fn loading(&self) -> bool {
        self.state.phase == OverlayPhase::Opening
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Open the overlay for `id` and load its detail and related articles.
    /// The two fetches run concurrently and fail independently.
    pub fn open(&mut self, id: ArticleId) {
        let ticket = self.begin_open(id);

        let repository = &self.repository;
        let (detail, candidates) = thread::scope(|scope| {
            let related = scope.spawn(|| repository.fetch_list(RELATED_CANDIDATE_POOL, "", ""));
            let detail = repository.fetch_detail(&ticket.id);
            let candidates = related.join().unwrap_or_else(|_| {
                Err(FeedError::Payload(
                    "related article fetch panicked".to_string(),
                ))
            });
            (detail, candidates)
        });

        self.apply_detail(&ticket, detail);
        self.apply_related(&ticket, candidates);
    }

    /// Close the overlay, drop its state and remove the query parameter.
    /// Fetches still in flight are discarded when they resolve.
    pub fn close(&mut self) {
        if self.state.open_id.is_none() {
            return;
        }
        self.generation += 1;
        self.state = OverlayState::closed();

        let url = url_with_overlay_id(&self.location.current(), None);
        self.location.replace(url);
    }

    /// Switch to another article while open (e.g. a related-article click).
    /// The current article keeps its history entry so Back returns to it.
    pub fn switch_to(&mut self, id: ArticleId) {
        self.open(id);
    }

    /// Open the article named by the current URL, if any. Returns the id
    /// that was opened.
    pub fn restore_from_location(&mut self) -> Option<ArticleId> {
        let id = overlay_id_from_url(&self.location.current())?;
        tracing::debug!(%id, "restoring overlay from deep link");
        self.open(id.clone());
        Some(id)
    }

    /// Public link to the open article.
    pub fn share_url(&self) -> Option<Url> {
        let id = self.state.open_id.as_ref()?;
        share_url(&self.site_origin, id)
    }

    /// Enter the opening state for `id` without fetching. Previous detail
    /// and related lists are cleared so nothing leaks between articles.
    pub fn begin_open(&mut self, id: ArticleId) -> OpenTicket {
        self.generation += 1;
        self.state = OverlayState::closed();
        self.state.open_id = Some(id.clone());
        self.state.phase = OverlayPhase::Opening;

        let current = self.location.current();
        if overlay_id_from_url(&current).as_ref() != Some(&id) {
            self.location.push(url_with_overlay_id(&current, Some(&id)));
        }

        OpenTicket {
            id,
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: &OpenTicket) -> bool {
        ticket.generation == self.generation && self.state.open_id.as_ref() == Some(&ticket.id)
    }

    /// Commit a detail result. Returns false if the ticket is stale.
    pub fn apply_detail(&mut self, ticket: &OpenTicket, result: FeedResult<ArticleDetail>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(id = %ticket.id, "discarding stale article detail");
            return false;
        }

        match result {
            Ok(detail) => {
                self.state.detail = Some(detail);
                self.state.error = None;
                self.state.phase = OverlayPhase::Open;
                self.refresh_related();
            }
            Err(e) => {
                tracing::error!("Failed to load article {}: {}", ticket.id, e);
                self.state.error = Some(e.to_string());
                self.state.phase = OverlayPhase::Failed;
            }
        }
        true
    }

    /// Commit related-article candidates. A failure only empties the list.
    pub fn apply_related(&mut self, ticket: &OpenTicket, result: FeedResult<ArticlePage>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(id = %ticket.id, "discarding stale related articles");
            return false;
        }

        match result {
            Ok(page) => {
                self.state.candidates = Some(page.items);
                self.refresh_related();
            }
            Err(e) => {
                tracing::warn!("Related articles unavailable for {}: {}", ticket.id, e);
                self.state.candidates = None;
                self.state.related.clear();
            }
        }
        true
    }

    fn refresh_related(&mut self) {
        if let (Some(detail), Some(candidates)) = (&self.state.detail, &self.state.candidates) {
            self.state.related = select_related(detail, candidates);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryLocation;
    use crate::repository::MockArticleRepository;
    use mockall::predicate::eq;

    const START: &str = "https://rumenbao.com/articles";

    fn location(url: &str) -> MemoryLocation {
        MemoryLocation::new(Url::parse(url).unwrap())
    }

    fn summary(id: &str, category: &str) -> ArticleSummary {
        ArticleSummary::new(id, format!("Article {}", id)).with_category(category)
    }

    fn detail(id: &str, category: &str) -> ArticleDetail {
        ArticleDetail::new(summary(id, category), format!("<p>{}</p>", id), None)
    }

    fn candidates() -> ArticlePage {
        ArticlePage::new(
            vec![
                summary("1", "Wallets"),
                summary("2", "News"),
                summary("3", "Wallets"),
                summary("4", "Wallets"),
                summary("5", "Wallets"),
                summary("6", "Wallets"),
            ],
            "more",
        )
    }

    fn controller(
        repo: MockArticleRepository,
        url: &str,
    ) -> DetailOverlayController<MockArticleRepository, MemoryLocation> {
        DetailOverlayController::new(repo, location(url), "https://rumenbao.com")
    }

    fn current_url(c: &DetailOverlayController<MockArticleRepository, MemoryLocation>) -> String {
        c.location().current().to_string()
    }

    #[test]
    fn test_open_loads_detail_and_related() {
        let mut repo = MockArticleRepository::new();
        repo.expect_fetch_detail()
            .with(eq(ArticleId::from("1")))
            .times(1)
            .returning(|_| Ok(detail("1", "Wallets")));
        repo.expect_fetch_list()
            .with(eq(20), eq(""), eq(""))
            .times(1)
            .returning(|_, _, _| Ok(candidates()));

        let mut overlay = controller(repo, START);
        overlay.open(ArticleId::from("1"));

        assert_eq!(overlay.state().phase, OverlayPhase::Open);
        assert_eq!(overlay.detail().unwrap().id(), &ArticleId::from("1"));
        assert!(!overlay.loading());
        assert_eq!(overlay.error(), None);

        let related: Vec<&str> = overlay.related().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(related, vec!["3", "4", "5"]);
        assert_eq!(current_url(&overlay), "https://rumenbao.com/articles?id=1");
    }

    #[test]
    fn test_related_failure_does_not_fail_open() {
        let mut repo = MockArticleRepository::new();
        repo.expect_fetch_detail()
            .times(1)
            .returning(|_| Ok(detail("1", "Wallets")));
        repo.expect_fetch_list().times(1).returning(|_, _, _| {
            Err(FeedError::HttpStatus {
                status: 500,
                url: "https://api.example.com".to_string(),
            })
        });

        let mut overlay = controller(repo, START);
        overlay.open(ArticleId::from("1"));

        assert_eq!(overlay.state().phase, OverlayPhase::Open);
        assert!(overlay.detail().is_some());
        assert!(overlay.related().is_empty());
        assert_eq!(overlay.error(), None);
    }

    #[test]
    fn test_detail_failure_sets_error() {
        let mut repo = MockArticleRepository::new();
        repo.expect_fetch_detail()
            .times(1)
            .returning(|id| Err(FeedError::NotFound(id.to_string())));
        repo.expect_fetch_list()
            .times(1)
            .returning(|_, _, _| Ok(candidates()));

        let mut overlay = controller(repo, START);
        overlay.open(ArticleId::from("404"));

        assert_eq!(overlay.state().phase, OverlayPhase::Failed);
        assert_eq!(overlay.error(), Some("Article not found: 404"));
        assert!(overlay.detail().is_none());
        assert!(overlay.related().is_empty());
        // Still open so the user can retry or close
        assert_eq!(overlay.open_id(), Some(&ArticleId::from("404")));
    }

    #[test]
    fn test_close_clears_state_and_param() {
        let mut repo = MockArticleRepository::new();
        repo.expect_fetch_detail()
            .returning(|_| Ok(detail("1", "Wallets")));
        repo.expect_fetch_list()
            .returning(|_, _, _| Ok(candidates()));

        let mut overlay = controller(repo, START);
        overlay.open(ArticleId::from("1"));
        overlay.close();

        assert_eq!(overlay.state().phase, OverlayPhase::Closed);
        assert!(overlay.open_id().is_none());
        assert!(overlay.detail().is_none());
        assert!(overlay.related().is_empty());
        assert_eq!(current_url(&overlay), START);
    }

    #[test]
    fn test_deep_link_restores_overlay() {
        let mut repo = MockArticleRepository::new();
        repo.expect_fetch_detail()
            .with(eq(ArticleId::from("X")))
            .times(1)
            .returning(|_| Ok(detail("X", "News")));
        repo.expect_fetch_list()
            .times(1)
            .returning(|_, _, _| Ok(candidates()));

        let mut overlay = controller(repo, "https://rumenbao.com/articles?id=X");
        let restored = overlay.restore_from_location();

        assert_eq!(restored, Some(ArticleId::from("X")));
        assert_eq!(overlay.detail().unwrap().id(), &ArticleId::from("X"));
        assert_eq!(current_url(&overlay), "https://rumenbao.com/articles?id=X");

        overlay.close();
        assert_eq!(current_url(&overlay), START);
    }

    #[test]
    fn test_history_after_restore_and_switch() {
        let mut repo = MockArticleRepository::new();
        repo.expect_fetch_detail()
            .returning(|id| Ok(detail(id.as_str(), "News")));
        repo.expect_fetch_list()
            .returning(|_, _, _| Ok(candidates()));

        let mut overlay = controller(repo, "https://rumenbao.com/articles?id=X");
        overlay.restore_from_location();

        let history: Vec<&str> = overlay.location().history().iter().map(Url::as_str).collect();
        assert_eq!(history, vec!["https://rumenbao.com/articles?id=X"]);

        overlay.switch_to(ArticleId::from("Y"));

        let history: Vec<&str> = overlay.location().history().iter().map(Url::as_str).collect();
        assert_eq!(
            history,
            vec![
                "https://rumenbao.com/articles?id=X",
                "https://rumenbao.com/articles?id=Y",
            ]
        );
        assert_eq!(overlay.detail().unwrap().id(), &ArticleId::from("Y"));
    }

    #[test]
    fn test_no_deep_link_stays_closed() {
        let repo = MockArticleRepository::new();
        let mut overlay = controller(repo, START);

        assert_eq!(overlay.restore_from_location(), None);
        assert_eq!(overlay.state().phase, OverlayPhase::Closed);
    }

    #[test]
    fn test_stale_detail_is_discarded() {
        let repo = MockArticleRepository::new();
        let mut overlay = controller(repo, START);

        let ticket_a = overlay.begin_open(ArticleId::from("A"));
        overlay.close();
        let ticket_b = overlay.begin_open(ArticleId::from("B"));

        // B resolves first, then A's late response arrives
        assert!(overlay.apply_detail(&ticket_b, Ok(detail("B", "News"))));
        assert!(!overlay.apply_detail(&ticket_a, Ok(detail("A", "News"))));
        assert!(!overlay.apply_related(&ticket_a, Ok(candidates())));

        assert_eq!(overlay.detail().unwrap().id(), &ArticleId::from("B"));
        assert_eq!(overlay.open_id(), Some(&ArticleId::from("B")));
        assert_eq!(current_url(&overlay), "https://rumenbao.com/articles?id=B");
    }

    #[test]
    fn test_reopening_same_id_discards_earlier_cycle() {
        let repo = MockArticleRepository::new();
        let mut overlay = controller(repo, START);

        let first = overlay.begin_open(ArticleId::from("A"));
        overlay.close();
        let second = overlay.begin_open(ArticleId::from("A"));

        assert!(!overlay.apply_detail(
            &first,
            Err(FeedError::Api {
                code: 1,
                message: "old".to_string()
            })
        ));
        assert!(overlay.loading());
        assert!(overlay.apply_detail(&second, Ok(detail("A", "News"))));
        assert_eq!(overlay.state().phase, OverlayPhase::Open);
    }

    #[test]
    fn test_switch_does_not_leak_previous_detail() {
        let repo = MockArticleRepository::new();
        let mut overlay = controller(repo, START);

        let first = overlay.begin_open(ArticleId::from("1"));
        overlay.apply_detail(&first, Ok(detail("1", "Wallets")));
        overlay.apply_related(&first, Ok(candidates()));
        assert!(!overlay.related().is_empty());

        overlay.close();
        let _second = overlay.begin_open(ArticleId::from("3"));

        assert!(overlay.loading());
        assert!(overlay.detail().is_none());
        assert!(overlay.related().is_empty());
    }

    #[test]
    fn test_switch_to_opens_new_article() {
        let mut repo = MockArticleRepository::new();
        repo.expect_fetch_detail()
            .with(eq(ArticleId::from("1")))
            .times(1)
            .returning(|_| Ok(detail("1", "Wallets")));
        repo.expect_fetch_detail()
            .with(eq(ArticleId::from("3")))
            .times(1)
            .returning(|_| Ok(detail("3", "Wallets")));
        repo.expect_fetch_list()
            .times(2)
            .returning(|_, _, _| Ok(candidates()));

        let mut overlay = controller(repo, START);
        overlay.open(ArticleId::from("1"));
        overlay.switch_to(ArticleId::from("3"));

        assert_eq!(overlay.detail().unwrap().id(), &ArticleId::from("3"));
        let related: Vec<&str> = overlay.related().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(related, vec!["1", "4", "5"]);
        assert_eq!(current_url(&overlay), "https://rumenbao.com/articles?id=3");
    }

    #[test]
    fn test_related_arriving_before_detail() {
        let repo = MockArticleRepository::new();
        let mut overlay = controller(repo, START);

        let ticket = overlay.begin_open(ArticleId::from("4"));
        overlay.apply_related(&ticket, Ok(candidates()));
        assert!(overlay.related().is_empty());

        overlay.apply_detail(&ticket, Ok(detail("4", "Wallets")));
        let related: Vec<&str> = overlay.related().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(related, vec!["1", "3", "5"]);
    }

    #[test]
    fn test_share_url_for_open_article() {
        let repo = MockArticleRepository::new();
        let mut overlay = controller(repo, START);
        assert!(overlay.share_url().is_none());

        overlay.begin_open(ArticleId::from(88));
        assert_eq!(
            overlay.share_url().unwrap().as_str(),
            "https://rumenbao.com/articles?id=88"
        );
    }
}
