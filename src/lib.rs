pub mod artifact;
pub mod chunk;
pub mod config;
pub mod error;
pub mod inference;
pub mod interactive;
pub mod language;
pub mod pipeline;
pub mod summarize;
pub mod tokenize;
pub mod transcript;
pub mod translate;
pub mod video;

pub use artifact::SummaryArtifact;
pub use config::Config;
pub use error::{Result, TubesumError};
pub use pipeline::{print_summary, Pipeline, PipelineConfig, PipelineResult, PipelineStats, Services};
