pub mod article;
pub mod page;

pub use article::{ArticleDetail, ArticleId, ArticleSummary, Author};
pub use page::{select_related, ArticlePage};
