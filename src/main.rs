use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tubesum::interactive::run_interactive;
use tubesum::{print_summary, Config, Pipeline, PipelineConfig, Services};

#[derive(Parser)]
#[command(name = "tubesum")]
#[command(version, about = "Summarize YouTube videos in any language")]
#[command(
    long_about = "Fetch a YouTube transcript, detect its language, translate it to English if needed and summarize it with HuggingFace models. Run without a URL for the interactive mode."
)]
struct Cli {
    /// YouTube watch URL (omit for interactive mode)
    url: Option<String>,

    /// Save the summary to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Token window size per summarized chunk
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Hide progress spinners
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tubesum={}", level)));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(max_tokens) = cli.max_tokens {
        config.max_tokens = max_tokens;
    }

    let Some(url) = cli.url else {
        return run_interactive(config).await;
    };

    let services = Services::from_config(&config).context("Configuration validation failed")?;
    let pipeline_config = PipelineConfig {
        show_progress: !cli.no_progress,
        ..PipelineConfig::from_config(&config)?
    };
    let pipeline = Pipeline::new(services, pipeline_config);

    info!("URL:        {}", url);
    info!("Max tokens: {}", config.max_tokens);

    let result = match pipeline.run(&url).await {
        Ok(result) => result,
        Err(e) => anyhow::bail!(e.user_message()),
    };

    print_summary(&result);

    if let Some(output) = cli.output {
        result
            .artifact()
            .save_as(&output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Summary written to {}", output.display());
    }

    Ok(())
}
