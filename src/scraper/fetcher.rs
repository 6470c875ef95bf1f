use crate::model::{ConfigurationError, FetchError};
use crate::scraper::traits::ContentFetcher;

use ::scraper::Html;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) HostingHarvester/0.1";

/// Subtrees whose text never reaches the reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ConfigurationError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }

    /// Swaps in a preconfigured client, e.g. one with different proxy settings.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait::async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|v| v.contains("html"));

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        let text = if is_html {
            html_to_text(&body)
        } else {
            body.trim().to_string()
        };

        if text.is_empty() {
            return Err(FetchError::EmptyContent);
        }
        Ok(text)
    }
}

/// Visible text of an HTML document, one text node per line, whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });
            if hidden {
                return None;
            }
            let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!line.is_empty()).then_some(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OneShotServer, loopback_client};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5))
            .unwrap()
            .with_client(loopback_client())
    }

    #[test]
    fn html_to_text_keeps_visible_text_only() {
        let html = r#"
            <html>
              <head><title>FastHost WordPress</title><style>body { color: red }</style></head>
              <body>
                <h1>FastHost</h1>
                <p>Plans   from
                   <b>$2.99/mo</b></p>
                <script>var tracking = "nope";</script>
                <noscript>enable js</noscript>
              </body>
            </html>"#;

        let text = html_to_text(html);
        assert_eq!(text, "FastHost WordPress\nFastHost\nPlans from\n$2.99/mo");
    }

    #[test]
    fn html_without_text_is_empty() {
        assert_eq!(html_to_text("<html><body><script>x()</script></body></html>"), "");
    }

    #[test]
    fn fetcher_builds_with_timeout() {
        assert!(HttpFetcher::new(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn fetch_returns_visible_text_of_html_pages() {
        let server = OneShotServer::start(
            "200 OK",
            "text/html; charset=utf-8",
            "<html><body><h1>FastHost</h1><script>x()</script><p>$2.99/mo</p></body></html>",
        )
        .await;

        let text = fetcher().fetch(&format!("{}/hosting", server.url)).await;
        assert_eq!(text, Ok("FastHost\n$2.99/mo".to_string()));

        let request = server.request().await;
        assert!(request.starts_with("GET /hosting HTTP/1.1"));
    }

    #[tokio::test]
    async fn fetch_trims_non_html_bodies() {
        let server = OneShotServer::start("200 OK", "text/plain", "  hello <b>\n").await;
        assert_eq!(fetcher().fetch(&server.url).await, Ok("hello <b>".to_string()));
    }

    #[tokio::test]
    async fn fetch_maps_error_status() {
        let server = OneShotServer::start("503 Service Unavailable", "text/html", "down").await;
        assert_eq!(fetcher().fetch(&server.url).await, Err(FetchError::Status(503)));
    }

    #[tokio::test]
    async fn fetch_rejects_pages_without_text() {
        let server = OneShotServer::start(
            "200 OK",
            "text/html",
            "<html><body><script>x()</script></body></html>",
        )
        .await;
        assert_eq!(fetcher().fetch(&server.url).await, Err(FetchError::EmptyContent));
    }

    #[tokio::test]
    async fn fetch_reports_connection_failures() {
        let server = OneShotServer::start("200 OK", "text/plain", "unused").await;
        let url = server.url.clone();
        // Consume the single accept so the next connection is refused.
        let _ = loopback_client().get(&url).send().await;
        let _ = server.request().await;

        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)), "{err:?}");
    }
}
