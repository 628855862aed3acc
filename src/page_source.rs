use std::future::Future;
use std::time::Duration;

use scraper::Html;
use tokio::time::{self, Instant};
use tracing::{debug, instrument, warn};

use crate::fetch_error::FetchError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124 Safari/537.36";

/// Source of raw page HTML.
///
/// `fetch_html` is a plain GET; `render_html` is for pages whose tables are
/// filled in client-side and only returns once `ready_selector` matches.
pub trait PageSource: Send + Sync {
    fn fetch_html(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;

    fn render_html(
        &self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
    user_agent: String,
    render_endpoint: Option<String>,
    poll_interval: Duration,
}

impl HttpPageSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            render_endpoint: None,
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Route `render_html` through a prerender service that takes the page as `?url=`.
    pub fn with_render_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.render_endpoint = endpoint;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn get(&self, request: reqwest::RequestBuilder, url: &str) -> Result<String, FetchError> {
        let response = request
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;
        debug!("Received HTTP response with status: {}", response.status());

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await?;
        debug!("Retrieved HTML content, size: {} bytes", html.len());
        Ok(html)
    }

    async fn fetch_rendered(&self, url: &str) -> Result<String, FetchError> {
        let request = match &self.render_endpoint {
            Some(endpoint) => self.client.get(endpoint).query(&[("url", url)]),
            None => self.client.get(url),
        };
        self.get(request, url).await
    }
}

impl Default for HttpPageSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `css` matches anything in `html`. Kept synchronous so the parsed
/// document never lives across an await point.
fn has_selector(html: &str, css: &str) -> Result<bool, FetchError> {
    let selector =
        scraper::Selector::parse(css).map_err(|_| FetchError::InvalidSelector(css.to_string()))?;
    Ok(Html::parse_document(html).select(&selector).next().is_some())
}

impl PageSource for HttpPageSource {
    #[instrument(skip(self))]
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        debug!("Sending HTTP request");
        self.get(self.client.get(url), url).await
    }

    #[instrument(skip(self), fields(timeout_ms = timeout.as_millis() as u64))]
    async fn render_html(
        &self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let timed_out = || FetchError::RenderTimeout {
            url: url.to_string(),
            selector: ready_selector.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        };
        let deadline = Instant::now() + timeout;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let html = match time::timeout(remaining, self.fetch_rendered(url)).await {
                Ok(result) => result?,
                Err(_) => return Err(timed_out()),
            };

            if has_selector(&html, ready_selector)? {
                debug!("Selector '{}' ready after {} attempt(s)", ready_selector, attempt);
                return Ok(html);
            }

            if Instant::now() + self.poll_interval >= deadline {
                warn!(
                    "Selector '{}' not present after {} attempt(s)",
                    ready_selector, attempt
                );
                return Err(timed_out());
            }
            time::sleep(self.poll_interval).await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_selector() {
        let html = r#"<table id="hourly-forecast-table"><tbody><tr><td>1</td></tr></tbody></table>"#;
        assert!(has_selector(html, "#hourly-forecast-table tbody tr").unwrap());
        assert!(!has_selector("<p>loading</p>", "#hourly-forecast-table tbody tr").unwrap());
    }

    #[test]
    fn test_has_selector_invalid_css() {
        assert!(matches!(
            has_selector("<p></p>", "tr[["),
            Err(FetchError::InvalidSelector(_))
        ));
    }
}
