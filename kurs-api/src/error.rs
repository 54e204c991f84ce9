#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn comment_not_found(id: crate::CommentId) -> Error {
        Error::NotFound(format!("comment {}", id.0))
    }

    pub fn rate_not_found(currency_code: &str) -> Error {
        Error::NotFound(format!("rate for {currency_code}"))
    }
}
