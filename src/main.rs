use clap::Parser;
use url::Url;

use rumenbao::cli::{Cli, Commands};
use rumenbao::config::Config;
use rumenbao::domain::{ArticleDetail, ArticleId, ArticleSummary};
use rumenbao::errors::{FeedError, FeedResult};
use rumenbao::navigation::{share_url, Location, MemoryLocation};
use rumenbao::repository::HttpArticleRepository;
use rumenbao::sanitize::html_to_text;
use rumenbao::services::{DetailOverlayController, FeedController, FeedFilter};

fn main() {
    // Only warnings and errors unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> FeedResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    match cli.command {
        Commands::List {
            pages,
            page_size,
            keywords,
            category,
        } => cmd_list(&config, pages, page_size, keywords, category),
        Commands::Show { id } => cmd_show(&config, ArticleId::from(id)),
        Commands::Open { url } => cmd_open(&config, &url),
        Commands::Share { id, origin } => {
            let origin = origin.unwrap_or_else(|| config.site_origin.clone());
            cmd_share(&origin, ArticleId::from(id))
        }
    }
}

fn cmd_list(
    config: &Config,
    pages: u32,
    page_size: Option<u32>,
    keywords: String,
    category: Option<String>,
) -> FeedResult<()> {
    let page_size = page_size.unwrap_or(config.page_size);
    if page_size == 0 {
        return Err(FeedError::InvalidInput("page size must be positive".to_string()));
    }

    let repository = HttpArticleRepository::new(config)?;
    let mut feed = FeedController::new(repository, page_size);

    feed.set_filter(FeedFilter { keywords, category });

    // Each extra page is what the scroll sentinel would request
    for _ in 1..pages {
        if !feed.on_sentinel_visible(true) {
            break;
        }
    }

    if let Some(error) = feed.error() {
        if feed.items().is_empty() {
            return Err(FeedError::Unavailable(error.to_string()));
        }
        eprintln!("Warning: stopped early: {}", error);
    }

    let visible = feed.visible_items();
    if visible.is_empty() {
        println!("No articles found.");
        return Ok(());
    }

    for article in &visible {
        print_summary(article);
    }

    println!(
        "{} articles shown ({} loaded){}",
        visible.len(),
        feed.items().len(),
        if feed.has_more() { ", more available" } else { "" }
    );

    Ok(())
}

fn cmd_show(config: &Config, id: ArticleId) -> FeedResult<()> {
    let start = Url::parse(&config.site_origin)
        .and_then(|origin| origin.join("/articles"))
        .map_err(|e| FeedError::InvalidUrl(e.to_string()))?;

    let repository = HttpArticleRepository::new(config)?;
    let mut overlay =
        DetailOverlayController::new(repository, MemoryLocation::new(start), &config.site_origin);

    overlay.open(id);
    print_overlay(&overlay)
}

fn cmd_open(config: &Config, url: &str) -> FeedResult<()> {
    let url = Url::parse(url).map_err(|e| FeedError::InvalidUrl(e.to_string()))?;

    let repository = HttpArticleRepository::new(config)?;
    let mut overlay =
        DetailOverlayController::new(repository, MemoryLocation::new(url), &config.site_origin);

    if overlay.restore_from_location().is_none() {
        println!("No article id in URL.");
        return Ok(());
    }

    print_overlay(&overlay)
}

fn cmd_share(origin: &str, id: ArticleId) -> FeedResult<()> {
    let link = share_url(origin, &id)
        .ok_or_else(|| FeedError::InvalidUrl(format!("invalid site origin: {}", origin)))?;
    println!("{}", link);
    Ok(())
}

fn print_summary(article: &ArticleSummary) {
    println!("  [{}] {}", article.id, article.title);
    println!(
        "    {} · {} · {} min",
        article.category,
        article.publish_date.format("%Y-%m-%d"),
        article.read_time
    );
    if !article.description.is_empty() {
        println!("    {}", article.description);
    }
    println!();
}

fn print_detail(detail: &ArticleDetail) {
    let summary = &detail.summary;

    println!("{}", summary.title);
    println!(
        "{} · {} · {} · {} min read",
        summary.author.name,
        summary.category,
        summary.publish_date_iso(),
        summary.read_time
    );
    if !summary.tags.is_empty() {
        println!("Tags: {}", summary.tags.join(", "));
    }
    if let Some(link) = &summary.link {
        println!("Source: {}", link);
    }
    println!();
    println!("{}", html_to_text(&detail.sanitized_content()));
}

fn print_overlay<R, L>(overlay: &DetailOverlayController<R, L>) -> FeedResult<()>
where
    R: rumenbao::repository::ArticleRepository,
    L: Location,
{
    let Some(detail) = overlay.detail() else {
        let id = overlay
            .open_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        return Err(match overlay.error() {
            Some(e) => FeedError::Unavailable(format!("article {}: {}", id, e)),
            None => FeedError::NotFound(id),
        });
    };

    print_detail(detail);

    if !overlay.related().is_empty() {
        println!();
        println!("Related:");
        for related in overlay.related() {
            println!("  [{}] {}", related.id, related.title);
        }
    }

    if let Some(link) = overlay.share_url() {
        println!();
        println!("Share: {}", link);
    }

    Ok(())
}
