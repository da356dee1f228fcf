//! Tokenizer adapter used to measure and slice text for bounded-context models.

use crate::error::{Result, TubesumError};
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Converts text to token ids and back.
pub trait TokenCodec: Send + Sync {
    /// Encode text without adding special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode ids back to plain text, suppressing special tokens.
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

/// HuggingFace `tokenizers` backed codec.
pub struct HfTokenizer {
    inner: Tokenizer,
}

impl HfTokenizer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let inner = Tokenizer::from_file(path).map_err(|e| {
            TubesumError::Tokenizer(format!("Failed to load {}: {}", path.display(), e))
        })?;
        Ok(Self { inner })
    }

    /// Download (or reuse the hub cache for) the tokenizer of a model.
    pub fn from_pretrained(model_id: &str) -> Result<Self> {
        let inner = Tokenizer::from_pretrained(model_id, None).map_err(|e| {
            TubesumError::Tokenizer(format!("Failed to fetch tokenizer '{}': {}", model_id, e))
        })?;
        Ok(Self { inner })
    }

    /// Treat `source` as a local file when it exists, otherwise as a hub model id.
    pub fn load(source: &str) -> Result<Self> {
        let path = Path::new(source);
        if path.is_file() {
            Self::from_file(path)
        } else {
            Self::from_pretrained(source)
        }
    }
}

impl TokenCodec for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TubesumError::Tokenizer(format!("Encoding failed: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| TubesumError::Tokenizer(format!("Decoding failed: {}", e)))
    }
}

/// Process-wide tokenizer, loaded once on first use.
pub struct SharedTokenizer {
    source: String,
    cell: OnceCell<Arc<dyn TokenCodec>>,
}

impl SharedTokenizer {
    pub fn lazy(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already constructed codec.
    pub fn preloaded(codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            source: String::new(),
            cell: OnceCell::new_with(Some(codec)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn TokenCodec>> {
        let codec = self
            .cell
            .get_or_try_init(|| async {
                info!("Loading tokenizer: {}", self.source);
                let source = self.source.clone();
                let tokenizer = tokio::task::spawn_blocking(move || HfTokenizer::load(&source))
                    .await
                    .map_err(|e| {
                        TubesumError::Tokenizer(format!("Tokenizer loader panicked: {}", e))
                    })??;
                debug!("Tokenizer ready");
                Ok::<Arc<dyn TokenCodec>, TubesumError>(Arc::new(tokenizer))
            })
            .await?;
        Ok(codec.clone())
    }
}
