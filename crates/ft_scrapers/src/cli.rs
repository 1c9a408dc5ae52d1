use clap::{Args, Subcommand};
use ft_core::{Result, SourceId};

use crate::manager::ScraperManager;

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// List available sources
    List,
    /// Fetch a listing page and print its article stubs
    News {
        /// Source identifier (e.g. goal, fourfourtwo-epl); all sources when omitted
        source: Option<String>,
    },
    /// Fetch a listing and store its first articles
    Ingest {
        /// Source identifier (e.g. espn)
        source: String,
        /// Number of listing entries to process
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Extract a single article page without storing it
    Test {
        /// Article URL
        url: String,
        /// Content rules to apply; guessed from the URL when omitted
        #[arg(short, long)]
        source: Option<String>,
    },
}

pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager) -> Result<()> {
    match args.command {
        ScraperCommands::List => {
            println!("Available sources:");
            for source in manager.registry().sources() {
                let listing = manager
                    .registry()
                    .get(source)
                    .map(|s| s.listing_url().to_string())
                    .unwrap_or_default();
                println!("  {:<24} {:<24} {}", source.as_str(), source.display_name(), listing);
            }
        }
        ScraperCommands::News { source: Some(source) } => {
            let source: SourceId = source.parse()?;
            let stubs = manager.fetch_listing(source).await?;
            println!("{}", serde_json::to_string_pretty(&stubs)?);
        }
        ScraperCommands::News { source: None } => {
            for (source, listing) in manager.fetch_all_listings().await {
                match listing {
                    Ok(stubs) => println!("{}: {} articles", source, stubs.len()),
                    Err(e) => eprintln!("{}: failed: {}", source, e),
                }
            }
        }
        ScraperCommands::Ingest { source, limit } => {
            let source: SourceId = source.parse()?;
            let report = manager.scrape_source(source, limit).await?;
            if let Some(message) = &report.message {
                println!("{}", message);
            }
            println!("{}: {}/{} stored", report.source, report.stored, report.requested);
            for article in &report.articles {
                println!("  #{} {} - {}", article.id, article.title, article.url);
            }
        }
        ScraperCommands::Test { url, source } => {
            let source = match source {
                Some(source) => source,
                None => manager
                    .registry()
                    .for_url(&url)
                    .map(|s| s.source().as_str().to_string())
                    .unwrap_or_else(|| "generic".to_string()),
            };
            match manager.scrape_url(&url, &source).await? {
                Some(content) => {
                    println!("Source:      {}", source);
                    println!("Title:       {}", content.title);
                    println!("Image:       {}", content.image.as_deref().unwrap_or("-"));
                    println!("Description: {}", content.description.as_deref().unwrap_or("-"));
                    println!(
                        "Content:     {} chars",
                        content.content.as_deref().map_or(0, |c| c.chars().count())
                    );
                    match content.published_at {
                        Some(published) => println!("Published:   {}", published.to_rfc3339()),
                        None => println!("Published:   -"),
                    }
                }
                None => println!("Nothing extractable at {}", url),
            }
        }
    }
    Ok(())
}
