use crate::error::{Result, TubesumError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HuggingFace Inference API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default YouTube origin used by the transcript fetcher.
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Caption languages tried in order when fetching a transcript.
pub const DEFAULT_PREFERRED_LANGUAGES: [&str; 9] =
    ["en", "de", "fr", "es", "it", "pt", "ru", "uk", "hi"];

/// Where the transcript language is identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// Offline n-gram detection with `whatlang`.
    #[default]
    Whatlang,
    /// Hosted classifier on the Inference API.
    Huggingface,
}

impl std::str::FromStr for DetectorBackend {
    type Err = TubesumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "whatlang" | "local" => Ok(DetectorBackend::Whatlang),
            "huggingface" | "hf" => Ok(DetectorBackend::Huggingface),
            other => Err(TubesumError::Config(format!(
                "Unknown language detector '{}' (expected whatlang or huggingface)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hf_api_token: Option<String>,
    pub api_base_url: String,
    pub youtube_base_url: String,
    pub detector: DetectorBackend,
    pub detection_model: String,
    pub translation_model: String,
    pub summarization_model: String,
    /// Hub model id or path to a local `tokenizer.json`.
    pub tokenizer: String,
    pub max_tokens: usize,
    pub summary_min_length: u32,
    pub summary_max_length: u32,
    pub detection_sample_chars: usize,
    pub preferred_languages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hf_api_token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            detector: DetectorBackend::default(),
            detection_model: "papluca/xlm-roberta-base-language-detection".to_string(),
            translation_model: "facebook/nllb-200-distilled-600M".to_string(),
            summarization_model: "facebook/bart-large-cnn".to_string(),
            tokenizer: "facebook/bart-large-cnn".to_string(),
            max_tokens: 700,
            summary_min_length: 100,
            summary_max_length: 300,
            detection_sample_chars: 2000,
            preferred_languages: DEFAULT_PREFERRED_LANGUAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        // Override with environment variables
        if let Ok(token) = std::env::var("HF_API_TOKEN") {
            config.hf_api_token = Some(token);
        }
        if let Ok(url) = std::env::var("TUBESUM_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(detector) = std::env::var("TUBESUM_DETECTOR") {
            config.detector = detector.parse()?;
        }
        if let Ok(tokenizer) = std::env::var("TUBESUM_TOKENIZER") {
            config.tokenizer = tokenizer;
        }
        if let Ok(max_tokens) = std::env::var("TUBESUM_MAX_TOKENS") {
            config.max_tokens = max_tokens.parse().map_err(|_| {
                TubesumError::Config(format!(
                    "TUBESUM_MAX_TOKENS must be a positive integer, got '{}'",
                    max_tokens
                ))
            })?;
        }

        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            TubesumError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()
            .ok_or_else(|| TubesumError::Config("No config directory available".to_string()))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| TubesumError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hf_api_token.as_deref().map_or(true, str::is_empty) {
            return Err(TubesumError::Config(
                "HF_API_TOKEN not set. Create one at https://huggingface.co/settings/tokens"
                    .to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(TubesumError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.summary_max_length == 0 || self.summary_min_length > self.summary_max_length {
            return Err(TubesumError::Config(format!(
                "Invalid summary length range {}..{}",
                self.summary_min_length, self.summary_max_length
            )));
        }

        if self.preferred_languages.is_empty() {
            return Err(TubesumError::Config(
                "At least one preferred caption language is required".to_string(),
            ));
        }

        Ok(())
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tubesum").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            hf_api_token: Some("hf_test".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_tokens, 700);
        assert_eq!(config.summary_min_length, 100);
        assert_eq!(config.summary_max_length, 300);
        assert_eq!(config.preferred_languages.len(), 9);
        assert_eq!(config.preferred_languages[0], "en");
        assert!(config.hf_api_token.is_none());
    }

    #[test]
    fn test_validate_missing_token() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            hf_api_token: Some(String::new()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_with_token() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_tokens() {
        let config = Config {
            max_tokens: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_length_range() {
        let config = Config {
            summary_min_length: 400,
            summary_max_length: 300,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_languages() {
        let config = Config {
            preferred_languages: vec![],
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("max_tokens = 512\nhf_api_token = \"hf_x\"").unwrap();
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.hf_api_token.as_deref(), Some("hf_x"));
        assert_eq!(config.summarization_model, "facebook/bart-large-cnn");
    }

    #[test]
    fn test_detector_backend() {
        assert_eq!(Config::default().detector, DetectorBackend::Whatlang);
        assert_eq!(
            "HuggingFace".parse::<DetectorBackend>().unwrap(),
            DetectorBackend::Huggingface
        );
        assert!("langdetect".parse::<DetectorBackend>().is_err());

        let config: Config = toml::from_str("detector = \"huggingface\"").unwrap();
        assert_eq!(config.detector, DetectorBackend::Huggingface);
    }

    #[test]
    fn test_toml_roundtrip_keeps_languages() {
        let config = valid_config();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.preferred_languages, config.preferred_languages);
    }
}
