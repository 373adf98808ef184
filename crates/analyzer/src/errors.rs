use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("document has no body element")]
    MissingBody,
    #[error("page mutation failed: {0}")]
    Page(#[from] domlens_page::PageError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalyzerError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            AnalyzerError::MissingBody.to_string(),
            "document has no body element"
        );
        assert_eq!(
            AnalyzerError::internal("walk aborted").to_string(),
            "internal error: walk aborted"
        );
    }
}
