use thiserror::Error;

#[derive(Error, Debug)]
pub enum TubesumError {
    #[error("No video id found in URL: {0}")]
    UrlParse(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Language detected but not supported: {0}")]
    LanguageUnsupported(String),

    #[error("Language detection failed: {0}")]
    LanguageDetection(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("max_tokens must be greater than 0 (got {0})")]
    ChunkingPrecondition(usize),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TubesumError {
    /// Human-readable text shown to whoever triggered the pipeline run.
    pub fn user_message(&self) -> String {
        match self {
            TubesumError::UrlParse(url) => format!(
                "Transcript Error: '{}' is not a YouTube watch URL (expected '...watch?v=<id>')",
                url
            ),
            TubesumError::TranscriptUnavailable(reason) => {
                format!("Transcript Error: {}", reason)
            }
            TubesumError::LanguageUnsupported(code) => {
                format!("Language detected but not supported ({}).", code)
            }
            TubesumError::LanguageDetection(reason) => {
                format!("Language detection failed: {}", reason)
            }
            TubesumError::Translation(reason) => format!("Translation failed: {}", reason),
            TubesumError::Summarization(reason) => format!("Summarization failed: {}", reason),
            TubesumError::ChunkingPrecondition(_) | TubesumError::Config(_) => {
                format!("Configuration problem: {}", self)
            }
            other => format!("Something went wrong: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, TubesumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_pipeline_kinds() {
        let err = TubesumError::LanguageUnsupported("xx".to_string());
        assert_eq!(err.user_message(), "Language detected but not supported (xx).");

        let err = TubesumError::TranscriptUnavailable("no captions".to_string());
        assert_eq!(err.user_message(), "Transcript Error: no captions");

        let err = TubesumError::UrlParse("https://youtu.be".to_string());
        assert!(err.user_message().starts_with("Transcript Error:"));
    }

    #[test]
    fn test_user_message_for_precondition() {
        let err = TubesumError::ChunkingPrecondition(0);
        assert_eq!(
            err.user_message(),
            "Configuration problem: max_tokens must be greater than 0 (got 0)"
        );
    }
}
