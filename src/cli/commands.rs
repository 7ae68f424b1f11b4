use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rumenbao")]
#[command(about = "Browse the Rumenbao article feed from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List articles, following the pagination cursor
    List {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Articles per page (defaults to RUMENBAO_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<u32>,

        /// Search keywords passed to the content API
        #[arg(short, long, default_value = "")]
        keywords: String,

        /// Only show articles in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show one article with related reading
    Show {
        /// Article id
        id: String,
    },

    /// Open the article referenced by a shared link (?id=...)
    Open {
        /// Full page URL, e.g. https://rumenbao.com/articles?id=42
        url: String,
    },

    /// Print the shareable link for an article
    Share {
        /// Article id
        id: String,

        /// Site origin used for the link (defaults to RUMENBAO_SITE_ORIGIN)
        #[arg(long)]
        origin: Option<String>,
    },
}
