use reqwest::{Client, StatusCode};

use crate::config::{CONFIG, Config};
use crate::error::{GleanError, Result};

/// The "fetch" stage every component shares: one GET, body as text.
///
/// Only a 200 counts as success; 404 and every other status come back as
/// distinct errors so callers never confuse "gone" with "broken".
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Fetcher> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GleanError::config(format!("failed to build http client: {e}")))?;
        Ok(Fetcher { client })
    }

    pub fn from_config() -> Result<Fetcher> {
        Self::new(&CONFIG)
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.get_text_with_query(url, &[]).await
    }

    #[tracing::instrument(level = "debug", skip(self, query))]
    pub async fn get_text_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let res = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| GleanError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(GleanError::from_status(url, status));
        }

        let body = res.text().await.map_err(|source| GleanError::Transport {
            url: url.to_string(),
            source,
        })?;
        log::debug!("fetched {} bytes from {url}", body.len());
        Ok(body)
    }
}
