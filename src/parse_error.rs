#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("No recognizable date in '{0}'")]
    Date(String),
    #[error("Failed to parse clock time: {0}")]
    Clock(String),
    #[error("Failed to parse number: {0}")]
    Number(String),
    #[error("Invalid selector '{0}'")]
    Selector(String),
    #[error("Element not found: {0}")]
    MissingElement(String),
}
