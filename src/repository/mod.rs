pub mod traits;
pub mod wire;
pub mod http;

pub use traits::ArticleRepository;
pub use http::HttpArticleRepository;

#[cfg(test)]
pub use traits::MockArticleRepository;
