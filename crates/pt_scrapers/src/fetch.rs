use async_trait::async_trait;
use pt_core::Result;

/// Retrieves raw page markup for the extraction pipeline.
///
/// Parsing happens on the caller's side, so implementations only move bytes:
/// plain HTTP here, a headless browser behind the same seam for pages that
/// need script execution, canned fixtures in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url` and return its markup.
    async fn fetch_page(&self, url: &str) -> Result<String>;

    /// Fetch a page that only renders its content grid after script
    /// execution, waiting until `ready_selector` matches. The plain HTTP
    /// implementation cannot wait and falls back to a normal fetch.
    async fn fetch_rendered(&self, url: &str, _ready_selector: &str) -> Result<String> {
        self.fetch_page(url).await
    }
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
