use futures::stream::{self, StreamExt};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use crate::config::{CONFIG, Config};
use crate::error::{GleanError, Result};
use crate::fetch::Fetcher;
use crate::table::Table;

pub const SITEMAP_DIRECTIVE: &str = "Sitemap:";
const PREVIEW_ROWS: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>) -> UrlRecord {
        UrlRecord {
            url: url.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }
}

/// Contents of one sitemap document. A sitemap index lists child
/// sitemaps instead of (or besides) page URLs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedSitemap {
    pub urls: Vec<UrlRecord>,
    pub sitemaps: Vec<String>,
}

impl ParsedSitemap {
    pub fn to_table(&self) -> Result<Table> {
        if self.urls.is_empty() {
            return Ok(Table::new(vec![
                "url".to_string(),
                "lastmod".to_string(),
                "changefreq".to_string(),
                "priority".to_string(),
            ]));
        }
        Table::from_records(&self.urls)
    }
}

#[derive(Debug)]
pub struct SitemapReport {
    pub sitemap_url: String,
    pub outcome: Result<ParsedSitemap>,
}

impl SitemapReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Finds a site's sitemaps through its robots.txt and lists what they contain.
///
/// The three stages can be driven one at a time; [`SitemapWalker::walk`]
/// runs them in order.
pub struct SitemapWalker {
    base_url: String,
    sitemap_urls: Vec<String>,
    concurrency: usize,
    fetcher: Fetcher,
}

impl SitemapWalker {
    pub fn new(base_url: impl Into<String>) -> Result<SitemapWalker> {
        Self::with_config(base_url, &CONFIG)
    }

    pub fn with_config(base_url: impl Into<String>, config: &Config) -> Result<SitemapWalker> {
        Ok(SitemapWalker {
            base_url: base_url.into(),
            sitemap_urls: Vec::new(),
            concurrency: config.sitemap_concurrency.max(1),
            fetcher: Fetcher::new(config)?,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> SitemapWalker {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.base_url.trim_end_matches('/'))
    }

    pub fn sitemap_urls(&self) -> &[String] {
        &self.sitemap_urls
    }

    pub async fn fetch_robots(&self) -> Result<String> {
        let url = self.robots_url();
        let result = self.fetcher.get_text(&url).await;
        if let Err(e) = &result {
            log::warn!("error fetching robots.txt: {:#}", e);
        }
        result
    }

    /// Replaces the stored sitemap list with the one found in `robots_txt`.
    pub fn load_sitemap_urls(&mut self, robots_txt: &str) -> &[String] {
        self.sitemap_urls = extract_sitemap_urls(robots_txt);
        log::info!(
            "found {} sitemap(s) for {}",
            self.sitemap_urls.len(),
            self.base_url
        );
        &self.sitemap_urls
    }

    /// Fetches and parses every stored sitemap. One report per sitemap, in
    /// the stored order; a failure only affects its own report.
    pub async fn fetch_and_parse_sitemaps(&self) -> Vec<SitemapReport> {
        stream::iter(self.sitemap_urls.iter().cloned())
            .map(|sitemap_url| async move {
                let outcome = match self.fetcher.get_text(&sitemap_url).await {
                    Ok(xml) => parse_sitemap(&xml),
                    Err(e) => Err(e),
                };
                log_report(&sitemap_url, &outcome);
                SitemapReport {
                    sitemap_url,
                    outcome,
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
    }

    pub async fn walk(&mut self) -> Result<Vec<SitemapReport>> {
        let robots_txt = self.fetch_robots().await?;
        if self.load_sitemap_urls(&robots_txt).is_empty() {
            return Err(GleanError::empty(format!(
                "{} lists no sitemaps",
                self.robots_url()
            )));
        }
        Ok(self.fetch_and_parse_sitemaps().await)
    }
}

fn log_report(sitemap_url: &str, outcome: &Result<ParsedSitemap>) {
    match outcome {
        Ok(parsed) => {
            let preview: Vec<&str> = parsed
                .urls
                .iter()
                .take(PREVIEW_ROWS)
                .map(|u| u.url.as_str())
                .collect();
            log::info!(
                "sitemap {sitemap_url}: {} url(s), {} child sitemap(s), first: {:?}",
                parsed.urls.len(),
                parsed.sitemaps.len(),
                preview
            );
        }
        Err(e) => log::warn!("error with sitemap ({sitemap_url}): {:#}", e),
    }
}

/// Sitemap URLs named by `Sitemap:` lines, in file order.
///
/// The URL is whatever follows the last `": "` on the line, so
/// `Sitemap: https://a/s.xml` yields `https://a/s.xml`.
pub fn extract_sitemap_urls(robots_txt: &str) -> Vec<String> {
    robots_txt
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| line.starts_with(SITEMAP_DIRECTIVE))
        .filter_map(|line| line.rsplit(": ").next())
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a `<urlset>` or `<sitemapindex>` document.
///
/// Each `<url>`'s address is read from its `<loc>` child; a `<url>` without
/// one is skipped. Any other root element (an HTML error page, say) is a
/// shape failure rather than an empty sitemap.
pub fn parse_sitemap(xml: &str) -> Result<ParsedSitemap> {
    let root = root_element(xml)?;
    if root != "urlset" && root != "sitemapindex" {
        return Err(GleanError::shape(format!(
            "expected <urlset> or <sitemapindex>, found <{root}>"
        )));
    }

    let doc: xml::SitemapDocument = quick_xml::de::from_str(xml)
        .map_err(|e| GleanError::shape(format!("sitemap XML: {e}")))?;

    let parsed = ParsedSitemap {
        urls: doc
            .urls
            .into_iter()
            .filter_map(xml::UrlEntry::into_record)
            .collect(),
        sitemaps: doc
            .sitemaps
            .into_iter()
            .map(|s| s.loc.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    };

    if parsed.urls.is_empty() && parsed.sitemaps.is_empty() {
        return Err(GleanError::empty("sitemap has no <url> or <sitemap> entries"));
    }
    Ok(parsed)
}

/// Local name of the document's first element.
fn root_element(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(GleanError::shape("sitemap XML has no root element")),
            Ok(_) => continue,
            Err(e) => return Err(GleanError::shape(format!("sitemap XML: {e}"))),
        }
    }
}

/// Serde shapes for `<urlset>` and `<sitemapindex>` documents.
mod xml {
    use super::UrlRecord;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct SitemapDocument {
        #[serde(rename = "url", default)]
        pub urls: Vec<UrlEntry>,
        #[serde(rename = "sitemap", default)]
        pub sitemaps: Vec<SitemapEntry>,
    }

    #[derive(Debug, Deserialize)]
    pub struct UrlEntry {
        pub loc: Option<String>,
        pub lastmod: Option<String>,
        pub changefreq: Option<String>,
        pub priority: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SitemapEntry {
        pub loc: String,
    }

    impl UrlEntry {
        pub fn into_record(self) -> Option<UrlRecord> {
            let url = self.loc?.trim().to_string();
            if url.is_empty() {
                return None;
            }
            Some(UrlRecord {
                url,
                lastmod: self.lastmod.map(|s| s.trim().to_string()),
                changefreq: self.changefreq.map(|s| s.trim().to_string()),
                priority: self.priority.map(|s| s.trim().to_string()),
            })
        }
    }
}
