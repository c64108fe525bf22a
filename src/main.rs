use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gleaner::analyzer::{self, TableAnalyzer};
use gleaner::directory::DirectoryScraper;
use gleaner::sitemap::SitemapWalker;
use gleaner::weather::WeatherClient;

#[derive(Parser, Debug)]
#[command(name = "gleaner", version, about = "Small fetch-parse-tabulate utilities")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a staff directory page
    Staff {
        url: String,
        /// Write a bar chart of staff titles to this SVG file
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Current weather for a city
    Weather {
        city: String,
        #[arg(long)]
        json: bool,
    },
    /// List the sitemaps a site's robots.txt points to, and their URLs
    Sitemaps { base_url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // log crate records are bridged into tracing by the subscriber
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(true)
        .init();

    match cli.command {
        Command::Staff { url, plot, json } => {
            let scraper = DirectoryScraper::new(url)?;
            let records = scraper.scrape().await?;
            let table = TableAnalyzer::new(records).to_table()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table.to_json())?);
            } else {
                println!("{}", analyzer::display(&table));
            }
            if let Some(path) = plot {
                analyzer::save_distribution(&table, &path)
                    .with_context(|| format!("plotting to {}", path.display()))?;
            }
        }
        Command::Weather { city, json } => {
            let client = WeatherClient::from_config()?;
            let table = client.current(&city).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table.to_json())?);
            } else {
                println!("{table}");
            }
        }
        Command::Sitemaps { base_url } => {
            let mut walker = SitemapWalker::new(base_url)?;
            let reports = walker.walk().await?;
            let mut failed = 0;
            for report in &reports {
                println!("Sitemap: {}", report.sitemap_url);
                match &report.outcome {
                    Ok(parsed) => {
                        println!("{}", parsed.to_table()?.head(5));
                        for child in &parsed.sitemaps {
                            println!("  -> {child}");
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        println!("  error: {e:#}");
                    }
                }
            }
            if failed == reports.len() {
                anyhow::bail!("all {failed} sitemap(s) failed");
            }
        }
    }
    Ok(())
}
