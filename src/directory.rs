use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::{GleanError, Result};
use crate::fetch::Fetcher;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StaffRecord {
    pub name: String,
    pub title: String,
    #[serde(rename = "contactInfo")]
    pub contact_info: String,
}

/// Pulls staff records out of a directory page where each person is a
/// "Name, Title" paragraph followed by a contact paragraph.
pub struct DirectoryScraper {
    url: String,
    container: String,
    fetcher: Fetcher,
}

impl DirectoryScraper {
    pub fn new(url: impl Into<String>) -> Result<DirectoryScraper> {
        Ok(Self::with_fetcher(url, Fetcher::from_config()?))
    }

    pub fn with_fetcher(url: impl Into<String>, fetcher: Fetcher) -> DirectoryScraper {
        DirectoryScraper {
            url: url.into(),
            container: CONFIG.staff_container.clone(),
            fetcher,
        }
    }

    /// CSS selector of the element holding the staff paragraphs.
    pub fn with_container(mut self, selector: impl Into<String>) -> DirectoryScraper {
        self.container = selector.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_page(&self) -> Result<String> {
        self.fetcher.get_text(&self.url).await
    }

    pub async fn scrape(&self) -> Result<Vec<StaffRecord>> {
        let result = match self.fetch_page().await {
            Ok(html) => parse_staff(&html, &self.container),
            Err(e) => Err(e),
        };
        match &result {
            Ok(records) => log::info!("scraped {} staff records from {}", records.len(), self.url),
            Err(e) => log::warn!("staff scrape of {} failed: {:#}", self.url, e),
        }
        result
    }
}

/// Extracts staff records from the first element matching `container`.
///
/// Paragraphs are consumed pairwise: a paragraph whose text splits on `,`
/// into exactly two parts is a header, and the paragraph after it is its
/// contact line. Anything else is skipped and the walk moves on by one.
pub fn parse_staff(html: &str, container: &str) -> Result<Vec<StaffRecord>> {
    let container_selector = Selector::parse(container)
        .map_err(|e| GleanError::config(format!("invalid container selector {container:?}: {e}")))?;
    let paragraph_selector = Selector::parse("p")
        .map_err(|e| GleanError::config(format!("invalid paragraph selector: {e}")))?;

    let document = Html::parse_document(html);
    let Some(staff_div) = document.select(&container_selector).next() else {
        return Err(GleanError::shape(format!(
            "no element matches {container:?}"
        )));
    };

    let paragraphs: Vec<String> = staff_div
        .select(&paragraph_selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut i = 0;
    while i < paragraphs.len() {
        let Some((name, title)) = split_name_and_title(&paragraphs[i]) else {
            log::debug!("skipping paragraph {i}: {:?}", paragraphs[i]);
            i += 1;
            continue;
        };
        let Some(contact_info) = paragraphs.get(i + 1) else {
            log::debug!("header {:?} has no contact paragraph", paragraphs[i]);
            break;
        };
        if contact_info.is_empty() {
            log::debug!("header {:?} has an empty contact paragraph", paragraphs[i]);
            i += 2;
            continue;
        }
        records.push(StaffRecord {
            name,
            title,
            contact_info: contact_info.clone(),
        });
        i += 2;
    }

    if records.is_empty() {
        return Err(GleanError::empty(format!(
            "no staff entries inside {container:?}"
        )));
    }
    Ok(records)
}

fn split_name_and_title(text: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = text.split(',').collect();
    match parts.as_slice() {
        [name, title] => {
            let (name, title) = (name.trim(), title.trim());
            if name.is_empty() || title.is_empty() {
                return None;
            }
            Some((name.to_string(), title.to_string()))
        }
        _ => None,
    }
}
