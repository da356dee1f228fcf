use crate::artifact::SummaryArtifact;
use crate::config::Config;
use crate::language::LanguageTag;
use crate::pipeline::{Pipeline, PipelineConfig, PipelineResult, Services};
use console::style;
use dialoguer::{Confirm, Input};
use std::path::Path;
use std::time::Duration;

/// Interactive session: one URL per pipeline run, collaborators reused.
pub async fn run_interactive(config: Config) -> anyhow::Result<()> {
    print_header();

    let config = setup_api_key(config)?;
    let services = Services::from_config(&config)?;
    let pipeline = Pipeline::new(services, PipelineConfig::from_config(&config)?);

    loop {
        let url: String = Input::new()
            .with_prompt("Enter YouTube video URL")
            .interact_text()?;

        if Confirm::new()
            .with_prompt("Summarize")
            .default(true)
            .interact()?
        {
            println!();
            match pipeline.run(url.trim()).await {
                Ok(result) => {
                    present_result(&result);
                    offer_download(&result, Path::new("."))?;
                }
                Err(e) => {
                    println!("{} {}", style("✗").red(), style(e.user_message()).red());
                }
            }
        }

        println!();
        if !Confirm::new()
            .with_prompt("Summarize another video?")
            .default(false)
            .interact()?
        {
            break;
        }
    }

    Ok(())
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║     tubesum - Multilingual YouTube Summarizer     ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

fn setup_api_key(mut config: Config) -> anyhow::Result<Config> {
    if config.hf_api_token.as_deref().is_some_and(|t| !t.is_empty()) {
        println!("{} HuggingFace token configured", style("✓").green());
        return Ok(config);
    }

    println!("{} HuggingFace token not found", style("!").yellow());
    println!("  Create one at: https://huggingface.co/settings/tokens\n");

    let token: String = Input::new()
        .with_prompt("Enter your HuggingFace API token")
        .interact_text()?;

    if token.trim().is_empty() {
        anyhow::bail!("API token is required");
    }

    config.hf_api_token = Some(token.trim().to_string());

    if Confirm::new()
        .with_prompt("Save token to config file?")
        .default(true)
        .interact()?
    {
        let path = config.save()?;
        println!(
            "{} Token saved to {}\n",
            style("✓").green(),
            path.display()
        );
    }

    Ok(config)
}

fn present_result(result: &PipelineResult) {
    println!(
        "{} Detected language: {}",
        style("✓").green(),
        describe_language(&result.language, result.translated)
    );
    println!();
    println!("{}", style("📄 Summary:").bold());
    println!("{}", result.summary);
    println!();
    println!(
        "{} Done! ({} chunks in {})",
        style("✅").green(),
        result.stats.chunks,
        format_elapsed(result.stats.total_time)
    );
}

/// Only prompt errors are returned; a failed write is reported and the
/// session goes on.
fn offer_download(result: &PipelineResult, dir: &Path) -> anyhow::Result<()> {
    let artifact = result.artifact();

    if Confirm::new()
        .with_prompt(format!(
            "📥 Download summary as {} ({})?",
            artifact.file_name(),
            artifact.mime()
        ))
        .default(true)
        .interact()?
    {
        match save_summary(&artifact, dir) {
            Ok(message) => println!("{} {}", style("✓").green(), message),
            Err(message) => println!("{} {}", style("✗").red(), style(message).red()),
        }
    }

    Ok(())
}

fn save_summary(artifact: &SummaryArtifact, dir: &Path) -> Result<String, String> {
    artifact
        .save_in(dir)
        .map(|path| format!("Saved {}", path.display()))
        .map_err(|e| format!("Could not save {}: {}", artifact.file_name(), e))
}

fn describe_language(language: &LanguageTag, translated: bool) -> String {
    if translated {
        format!("{} (translated to English)", language.code)
    } else {
        language.code.to_string()
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::resolve;

    #[test]
    fn test_describe_language() {
        assert_eq!(describe_language(&LanguageTag::english(), false), "en");
        assert_eq!(
            describe_language(&resolve("de").unwrap(), true),
            "de (translated to English)"
        );
    }

    #[test]
    fn test_save_summary() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = SummaryArtifact::new("Short summary.");

        let message = save_summary(&artifact, dir.path()).unwrap();
        assert!(message.contains("summary.txt"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("summary.txt")).unwrap(),
            "Short summary."
        );
    }

    #[test]
    fn test_save_summary_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let artifact = SummaryArtifact::new("Short summary.");

        let message = save_summary(&artifact, &missing).unwrap_err();
        assert!(message.starts_with("Could not save summary.txt"));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 05s");
    }
}
