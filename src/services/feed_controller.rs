use crate::domain::{ArticlePage, ArticleSummary};
use crate::errors::FeedResult;
use crate::repository::ArticleRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Search and category criteria. Changing either resets the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub keywords: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    First,
    Next,
}

/// An issued list fetch. Hand it back to [`FeedController::apply_page`]
/// with the fetch result. Only the most recently issued request is applied,
/// and only once.
#[derive(Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub kind: PageKind,
    pub page_size: u32,
    pub cursor: String,
    pub keywords: String,
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct FeedState {
    pub items: Vec<ArticleSummary>,
    pub cursor: String,
    pub has_more: bool,
    pub phase: FeedPhase,
    pub error: Option<String>,
    pub filter: FeedFilter,
}

impl FeedState {
    fn new(filter: FeedFilter) -> Self {
        Self {
            items: Vec::new(),
            cursor: String::new(),
            has_more: false,
            phase: FeedPhase::Idle,
            error: None,
            filter,
        }
    }
}

/// Paginated article list with an infinite-scroll trigger.
pub struct FeedController<R: ArticleRepository> {
    repository: R,
    page_size: u32,
    state: FeedState,
    issued: u64,
    pending: Option<u64>,
}

impl<R: ArticleRepository> FeedController<R> {
    pub fn new(repository: R, page_size: u32) -> Self {
        Self {
            repository,
            page_size,
            state: FeedState::new(FeedFilter::default()),
            issued: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn items(&self) -> &[ArticleSummary] {
        &self.state.items
    }

    pub fn loading(&self) -> bool {
        self.state.phase == FeedPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    /// Loaded items narrowed to the filter's category, if one is set.
    pub fn visible_items(&self) -> Vec<&ArticleSummary> {
        match &self.state.filter.category {
            Some(category) => self
                .state
                .items
                .iter()
                .filter(|a| &a.category == category)
                .collect(),
            None => self.state.items.iter().collect(),
        }
    }

    /// Load the first page, replacing anything loaded so far.
    pub fn initialize(&mut self) {
        let request = self.begin_initialize();
        let result = self.fetch(&request);
        self.apply_page(request, result);
    }

    /// Load the next page. Dropped while a load is in flight or when the
    /// feed is exhausted.
    pub fn load_more(&mut self) {
        let Some(request) = self.begin_load_more() else {
            return;
        };
        let result = self.fetch(&request);
        self.apply_page(request, result);
    }

    /// Replace the filter and start over from the first page.
    pub fn set_filter(&mut self, filter: FeedFilter) {
        self.state.filter = filter;
        self.initialize();
    }

    /// Infinite-scroll sentinel callback. Returns whether a page was fetched.
    /// A failed load is not retried from here.
    pub fn on_sentinel_visible(&mut self, visible: bool) -> bool {
        if !visible || !self.has_more() || self.loading() || self.state.phase == FeedPhase::Failed
        {
            return false;
        }
        self.load_more();
        true
    }

    /// User-initiated retry after a failure.
    pub fn retry(&mut self) {
        if self.state.items.is_empty() {
            self.initialize();
        } else {
            self.load_more();
        }
    }

    /// Start a first-page load. Any load still in flight is superseded.
    pub fn begin_initialize(&mut self) -> PageRequest {
        self.state.items.clear();
        self.state.cursor.clear();
        self.state.has_more = false;
        self.state.error = None;
        self.state.phase = FeedPhase::Loading;

        PageRequest {
            kind: PageKind::First,
            page_size: self.page_size,
            cursor: String::new(),
            keywords: self.state.filter.keywords.clone(),
            seq: self.issue(),
        }
    }

    /// Start a next-page load, or `None` if the guard drops the trigger.
    pub fn begin_load_more(&mut self) -> Option<PageRequest> {
        if self.loading() || !self.state.has_more {
            tracing::trace!(
                loading = self.loading(),
                has_more = self.state.has_more,
                "load_more ignored"
            );
            return None;
        }

        self.state.phase = FeedPhase::Loading;

        Some(PageRequest {
            kind: PageKind::Next,
            page_size: self.page_size,
            cursor: self.state.cursor.clone(),
            keywords: self.state.filter.keywords.clone(),
            seq: self.issue(),
        })
    }

    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.pending = Some(self.issued);
        self.issued
    }

    pub fn fetch(&self, request: &PageRequest) -> FeedResult<ArticlePage> {
        self.repository
            .fetch_list(request.page_size, &request.cursor, &request.keywords)
    }

    /// Commit the result of `request`. Returns false if the request is not
    /// the one outstanding (superseded by a reset, or already applied) and
    /// its result was discarded.
    pub fn apply_page(&mut self, request: PageRequest, result: FeedResult<ArticlePage>) -> bool {
        if self.pending != Some(request.seq) {
            tracing::debug!(kind = ?request.kind, "discarding page that is no longer outstanding");
            return false;
        }
        self.pending = None;

        match result {
            Ok(page) => {
                let has_more = page.has_more();
                let received = page.items.len();

                match request.kind {
                    PageKind::First => self.state.items = page.items,
                    PageKind::Next => self.state.items.extend(page.items),
                }
                self.state.cursor = page.next_cursor;
                self.state.has_more = has_more;
                self.state.error = None;
                self.state.phase = FeedPhase::Loaded;

                tracing::debug!(
                    received,
                    total = self.state.items.len(),
                    has_more,
                    "feed page loaded"
                );
            }
            Err(e) => {
                tracing::error!("Failed to load article list: {}", e);
                // A failed first page stops pagination until an explicit retry
                if request.kind == PageKind::First {
                    self.state.has_more = false;
                }
                self.state.error = Some(e.to_string());
                self.state.phase = FeedPhase::Failed;
            }
        }

        true
    }
}
