use crate::artifact::SummaryArtifact;
use crate::chunk::{split_into_chunks, TextChunk};
use crate::config::{Config, DetectorBackend};
use crate::error::{Result, TubesumError};
use crate::inference::InferenceClient;
use crate::language::{self, HfLanguageDetector, LanguageDetector, LanguageTag, WhatlangDetector};
use crate::summarize::{join_summaries, BartSummarizer, Summarizer, SummaryLength};
use crate::tokenize::SharedTokenizer;
use crate::transcript::{Transcript, TranscriptFetcher, YouTubeFetcher};
use crate::translate::{NllbTranslator, Translator};
use crate::video::extract_video_id;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Collaborators shared by every pipeline run in the process.
#[derive(Clone)]
pub struct Services {
    pub fetcher: Arc<dyn TranscriptFetcher>,
    pub detector: Arc<dyn LanguageDetector>,
    pub translator: Arc<dyn Translator>,
    pub summarizer: Arc<dyn Summarizer>,
    pub tokenizer: Arc<SharedTokenizer>,
}

impl Services {
    /// Build the hosted-model collaborators once.
    ///
    /// Also checks the language table and reports which detector outputs
    /// will be rejected. The tokenizer is loaded lazily on first use.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        language::validate_table()?;

        let client = InferenceClient::new(config.api_base_url.clone(), config.hf_api_token.clone());

        let detector: Arc<dyn LanguageDetector> = match config.detector {
            DetectorBackend::Whatlang => Arc::new(
                WhatlangDetector::new().with_sample_chars(config.detection_sample_chars),
            ),
            DetectorBackend::Huggingface => Arc::new(
                HfLanguageDetector::new(client.clone())
                    .with_model(config.detection_model.clone())
                    .with_sample_chars(config.detection_sample_chars),
            ),
        };
        let translator =
            NllbTranslator::new(client.clone()).with_model(config.translation_model.clone());
        let summarizer = BartSummarizer::new(client).with_model(config.summarization_model.clone());
        let fetcher = YouTubeFetcher::new().with_base_url(config.youtube_base_url.clone());

        let services = Self {
            fetcher: Arc::new(fetcher),
            detector,
            translator: Arc::new(translator),
            summarizer: Arc::new(summarizer),
            tokenizer: Arc::new(SharedTokenizer::lazy(config.tokenizer.clone())),
        };
        services.log_detector_coverage();

        Ok(services)
    }

    fn log_detector_coverage(&self) {
        let coverage = language::detector_coverage(self.detector.vocabulary());
        debug!(
            "Detector '{}' covers {} translatable languages",
            self.detector.name(),
            coverage.supported.len()
        );
        if !coverage.rejected.is_empty() {
            warn!(
                "Detector outputs without a translation tag will be rejected: {}",
                coverage.rejected.join(", ")
            );
        }
    }
}

/// Per-run settings for the summarization pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Token window size for the summarization model.
    pub max_tokens: usize,
    /// Summary length budget per chunk.
    pub summary_length: SummaryLength,
    /// Caption languages tried in order.
    pub preferred_languages: Vec<String>,
    /// Show progress spinners.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            max_tokens: config.max_tokens,
            summary_length: SummaryLength::default(),
            preferred_languages: config.preferred_languages,
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            max_tokens: config.max_tokens,
            summary_length: SummaryLength::new(
                config.summary_min_length,
                config.summary_max_length,
            )?,
            preferred_languages: config.preferred_languages.clone(),
            show_progress: true,
        })
    }
}

/// Timings and sizes of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub fetch_time: Duration,
    pub detection_time: Duration,
    /// Zero when the transcript was already English.
    pub translation_time: Duration,
    pub summarization_time: Duration,
    /// Length of the flattened transcript in characters.
    pub transcript_chars: usize,
    pub chunks: usize,
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    pub video_id: String,
    /// Code of the caption track that was fetched.
    pub caption_language: String,
    /// Language detected from the transcript text.
    pub language: LanguageTag,
    pub translated: bool,
    pub chunk_summaries: Vec<String>,
    /// Chunk summaries joined in order.
    pub summary: String,
    pub stats: PipelineStats,
}

impl PipelineResult {
    pub fn artifact(&self) -> SummaryArtifact {
        SummaryArtifact::new(self.summary.clone())
    }
}

/// Fetch → detect → translate → chunk → summarize, one request at a time.
pub struct Pipeline {
    services: Services,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(services: Services, config: PipelineConfig) -> Self {
        Self { services, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage for one video URL.
    ///
    /// The first failing stage ends the run; nothing is retried and no
    /// partial result is returned.
    pub async fn run(&self, url: &str) -> Result<PipelineResult> {
        let start_time = Instant::now();

        // Stage 1: Transcript
        info!("Stage 1/5: Fetching transcript");
        let fetch_start = Instant::now();
        let pb = self.spinner("Fetching transcript...");
        let transcript = self.fetch_transcript(url).await;
        finish_stage(pb, &transcript, |t| {
            format!("✓ Transcript fetched ({} captions)", t.captions.len())
        });
        let transcript = transcript?;
        let fetch_time = fetch_start.elapsed();

        let text = transcript.text();
        let transcript_chars = text.chars().count();
        info!(
            "Transcript for {}: {} chars in '{}' captions",
            transcript.video_id, transcript_chars, transcript.language_code
        );

        // Stage 2: Language
        info!("Stage 2/5: Detecting language");
        let detection_start = Instant::now();
        let pb = self.spinner("Detecting language...");
        let language = self.detect_language(&text).await;
        finish_stage(pb, &language, |l| format!("✓ Detected language: {}", l.code));
        let language = language?;
        let detection_time = detection_start.elapsed();

        // Stage 3: Translation
        let translation_start = Instant::now();
        let translated = !language.is_english();
        let english = if translated {
            info!("Stage 3/5: Translating {} to English", language);
            let pb = self.spinner("Translating to English...");
            let english = self.translate_to_english(&text, language).await;
            finish_stage(pb, &english, |t| format!("✓ Translated ({} chars)", t.len()));
            english?
        } else {
            info!("Stage 3/5: Transcript is already English, skipping translation");
            text
        };
        let translation_time = if translated {
            translation_start.elapsed()
        } else {
            Duration::ZERO
        };

        // Stage 4: Chunks
        info!("Stage 4/5: Splitting text into token windows");
        let summarization_start = Instant::now();
        let chunks = self.chunk_text(&english).await?;

        // Stage 5: Summaries
        info!("Stage 5/5: Generating summary");
        let chunk_summaries = self.summarize_chunks(&chunks).await?;
        let summarization_time = summarization_start.elapsed();

        let summary = join_summaries(&chunk_summaries);
        info!(
            "Summary complete: {} chunks, {} chars",
            chunk_summaries.len(),
            summary.len()
        );

        let stats = PipelineStats {
            total_time: start_time.elapsed(),
            fetch_time,
            detection_time,
            translation_time,
            summarization_time,
            transcript_chars,
            chunks: chunk_summaries.len(),
        };

        Ok(PipelineResult {
            video_id: transcript.video_id,
            caption_language: transcript.language_code,
            language,
            translated,
            chunk_summaries,
            summary,
            stats,
        })
    }

    /// Resolve a watch URL to its captions.
    pub async fn fetch_transcript(&self, url: &str) -> Result<Transcript> {
        let video_id = extract_video_id(url)?;
        debug!("Video id: {}", video_id);

        let transcript = self
            .services
            .fetcher
            .fetch(&video_id, &self.config.preferred_languages)
            .await
            .map_err(|e| stage_error(e, TubesumError::TranscriptUnavailable))?;

        if transcript.text().is_empty() {
            return Err(TubesumError::TranscriptUnavailable(format!(
                "Caption track for {} is empty",
                video_id
            )));
        }

        Ok(transcript)
    }

    /// Detect the transcript language and map it to its extended tag.
    pub async fn detect_language(&self, text: &str) -> Result<LanguageTag> {
        let code = self
            .services
            .detector
            .detect(text)
            .await
            .map_err(|e| stage_error(e, TubesumError::LanguageDetection))?;
        debug!("Detector returned '{}'", code);

        language::resolve(&code)
    }

    /// Translate the whole text to English, or return it unchanged if it
    /// already is.
    pub async fn translate_to_english(&self, text: &str, source: LanguageTag) -> Result<String> {
        if source.is_english() {
            return Ok(text.to_string());
        }

        self.services
            .translator
            .translate(text, source, LanguageTag::english())
            .await
            .map_err(|e| stage_error(e, TubesumError::Translation))
    }

    /// Chunk English text and summarize each chunk in order.
    pub async fn summarize_text(&self, text: &str) -> Result<Vec<String>> {
        let chunks = self.chunk_text(text).await?;
        self.summarize_chunks(&chunks).await
    }

    /// Split text into windows of at most `max_tokens` model tokens.
    ///
    /// Tokenizer failures are reported as summarization failures.
    pub async fn chunk_text(&self, text: &str) -> Result<Vec<TextChunk>> {
        if self.config.max_tokens == 0 {
            return Err(TubesumError::ChunkingPrecondition(self.config.max_tokens));
        }

        let tokenizer = self
            .services
            .tokenizer
            .get()
            .await
            .map_err(|e| stage_error(e, TubesumError::Summarization))?;
        let chunks = split_into_chunks(text, tokenizer.as_ref(), self.config.max_tokens)
            .map_err(|e| stage_error(e, TubesumError::Summarization))?;
        info!(
            "Split into {} chunks of up to {} tokens",
            chunks.len(),
            self.config.max_tokens
        );
        Ok(chunks)
    }

    /// Summarize chunks one at a time; the first failure stops the run.
    pub async fn summarize_chunks(&self, chunks: &[TextChunk]) -> Result<Vec<String>> {

        let progress_bar = if self.config.show_progress && !chunks.is_empty() {
            let pb = ProgressBar::new(chunks.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} Generating summary... [{bar:40.cyan/blue}] {pos}/{len} chunks")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            debug!("Chunk {}: {} tokens", chunk.index, chunk.token_count);
            let summary = self
                .services
                .summarizer
                .summarize(&chunk.text, self.config.summary_length)
                .await
                .map_err(|e| stage_error(e, TubesumError::Summarization));

            let summary = match summary {
                Ok(summary) => summary,
                Err(e) => {
                    if let Some(pb) = &progress_bar {
                        pb.abandon_with_message("✗ Summarization failed");
                    }
                    return Err(e);
                }
            };
            summaries.push(summary);

            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        Ok(summaries)
    }

    fn spinner(&self, message: &'static str) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

fn finish_stage<T>(pb: Option<ProgressBar>, result: &Result<T>, done: impl FnOnce(&T) -> String) {
    if let Some(pb) = pb {
        match result {
            Ok(value) => pb.finish_with_message(done(value)),
            Err(_) => pb.finish_and_clear(),
        }
    }
}

/// Keep pipeline error kinds, attribute ambient failures to the stage.
fn stage_error(err: TubesumError, wrap: fn(String) -> TubesumError) -> TubesumError {
    match err {
        TubesumError::UrlParse(_)
        | TubesumError::TranscriptUnavailable(_)
        | TubesumError::LanguageUnsupported(_)
        | TubesumError::LanguageDetection(_)
        | TubesumError::Translation(_)
        | TubesumError::Summarization(_)
        | TubesumError::ChunkingPrecondition(_) => err,
        other => wrap(other.to_string()),
    }
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                          Video Summary                         ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("{}", result.summary);
    println!();
    println!("  Video:      {}", result.video_id);
    println!(
        "  Language:   {}{}",
        result.language,
        if result.translated { " → translated to English" } else { "" }
    );
    println!("  Chunks:     {}", result.stats.chunks);
    println!("  Transcript: {} chars", result.stats.transcript_chars);
    println!();
    println!("  Timing:");
    println!("    Fetch:       {:.2}s", result.stats.fetch_time.as_secs_f64());
    println!(
        "    Detect:      {:.2}s",
        result.stats.detection_time.as_secs_f64()
    );
    if result.translated {
        println!(
            "    Translate:   {:.2}s",
            result.stats.translation_time.as_secs_f64()
        );
    }
    println!(
        "    Summarize:   {:.2}s",
        result.stats.summarization_time.as_secs_f64()
    );
    println!(
        "    Total:       {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
