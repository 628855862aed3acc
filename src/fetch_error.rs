#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Selector '{selector}' did not appear on {url} within {timeout_ms} ms")]
    RenderTimeout {
        url: String,
        selector: String,
        timeout_ms: u64,
    },
    #[error("Invalid ready selector: {0}")]
    InvalidSelector(String),
}
