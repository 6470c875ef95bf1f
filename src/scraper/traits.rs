use crate::model::FetchError;

/// Turns a URL into the readable text of the page behind it.
#[async_trait::async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
