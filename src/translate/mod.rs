pub mod nllb;

pub use nllb::NllbTranslator;

use crate::error::Result;
use crate::language::LanguageTag;
use async_trait::async_trait;

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: LanguageTag, target: LanguageTag)
        -> Result<String>;
    fn name(&self) -> &'static str;
}
