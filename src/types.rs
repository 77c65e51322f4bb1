//! Error taxonomy shared across the pipeline.

/// Errors produced by the scrape/embed/store/answer pipeline.
///
/// [`RagError::Fetch`] is the only recovered error: the scrape handler turns
/// it into the status string shown in the UI. Everything else propagates to
/// the request boundary and surfaces as an error response.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    /// The target page answered with a status other than 200 OK. The display
    /// form doubles as the UI status message.
    #[error("Failed to fetch the webpage: {status}")]
    Fetch { status: u16 },

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_message_carries_status_code() {
        let err = RagError::Fetch { status: 503 };
        assert_eq!(err.to_string(), "Failed to fetch the webpage: 503");
    }
}
