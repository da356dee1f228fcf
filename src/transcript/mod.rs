pub mod youtube;

pub use youtube::YouTubeFetcher;

use crate::error::Result;
use async_trait::async_trait;

/// One caption fragment with its timing in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionRecord {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: String,
    /// Language code of the caption track that was fetched.
    pub language_code: String,
    pub captions: Vec<CaptionRecord>,
}

impl Transcript {
    /// Caption texts joined with single spaces.
    pub fn text(&self) -> String {
        self.captions
            .iter()
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch captions for a video, trying `preferred_languages` in order.
    async fn fetch(&self, video_id: &str, preferred_languages: &[String]) -> Result<Transcript>;
    fn name(&self) -> &'static str;
}
