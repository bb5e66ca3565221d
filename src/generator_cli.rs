// src/generator_cli.rs
use crate::config::GeneratorConfig;
use crate::cover_letter::{
    CoverLetterGenerator, GenerationFailure, GenerationReport, JobSource, ProcessedJob,
};
use crate::core::LlmClient;
use crate::environment::EnvironmentConfig;
use crate::errors::classify;
use crate::model_select::{resolve_model, ModelPrompt, ModelRequest};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "cover-letter")]
#[command(about = "Generate tailored cover letters with a local language model")]
pub struct GeneratorCli {
    /// Path to a single job posting file
    #[arg(long, conflicts_with_all = ["job_text", "stdin"])]
    pub job_file: Option<PathBuf>,

    /// Job posting text given directly
    #[arg(long, conflicts_with = "stdin")]
    pub job_text: Option<String>,

    /// Read one job posting from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Process every posting in the input directory (the default when no
    /// single posting is given)
    #[arg(long)]
    pub batch: bool,

    /// Move processed postings into the archive directory with derived names
    #[arg(long)]
    pub move_to_bin: bool,

    /// Model name (default: COVER_LETTER_MODEL / OLLAMA_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Always pick the model from a menu of installed models
    #[arg(long)]
    pub select_model: bool,

    /// Path to the CV file (default: input/resume.tex)
    #[arg(long)]
    pub cv: Option<PathBuf>,

    /// Directory holding job postings (default: input)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output file in single mode, output directory in batch mode
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Archive directory for processed postings (default: bin)
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    /// Inference endpoint (default: OLLAMA_HOST or http://localhost:11434)
    #[arg(long)]
    pub ollama_url: Option<String>,

    /// Sampling temperature (default: 0.7)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate (default: 1000)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Inference request timeout in seconds (default: 300)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Only use text heuristics to name archived postings
    #[arg(long)]
    pub no_model_metadata: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    SingleFile(PathBuf),
    Text(String),
    Stdin,
    Batch,
}

impl GeneratorCli {
    /// An explicit posting (file, text, stdin) always wins over `--batch`.
    pub fn run_mode(&self) -> RunMode {
        let mode = if let Some(path) = &self.job_file {
            RunMode::SingleFile(path.clone())
        } else if let Some(text) = &self.job_text {
            RunMode::Text(text.clone())
        } else if self.stdin {
            RunMode::Stdin
        } else {
            RunMode::Batch
        };

        if self.batch && mode != RunMode::Batch {
            warn!("A single job posting was given; ignoring --batch");
        }
        mode
    }

    /// Layer flags over the environment; the model is filled in later.
    pub fn to_config(&self, env: &EnvironmentConfig, mode: &RunMode) -> GeneratorConfig {
        let mut config = GeneratorConfig::from_environment(env, "")
            .with_move_to_bin(self.move_to_bin)
            .with_model_metadata(!self.no_model_metadata);

        if let Some(path) = &self.cv {
            config = config.with_cv_path(path.clone());
        }
        if let Some(dir) = &self.input_dir {
            config = config.with_input_dir(dir.clone());
        }
        if let Some(dir) = &self.bin_dir {
            config = config.with_bin_dir(dir.clone());
        }
        if let Some(url) = &self.ollama_url {
            config = config.with_ollama_url(url);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if *mode == RunMode::Batch {
            if let Some(dir) = &self.output {
                config = config.with_output_dir(dir.clone());
            }
        }
        config
    }

    /// `--output` is a file path only outside batch mode
    pub fn single_output(&self, mode: &RunMode) -> Option<&Path> {
        match mode {
            RunMode::Batch => None,
            _ => self.output.as_deref(),
        }
    }
}

/// Run one generator invocation. Errors are startup problems (missing CV,
/// unreachable endpoint, no model); per-posting failures are in the report.
pub async fn handle_generator_command(
    cli: GeneratorCli,
    env: &EnvironmentConfig,
    prompt: &dyn ModelPrompt,
) -> Result<GenerationReport> {
    let mode = cli.run_mode();
    let mut config = cli.to_config(env, &mode);

    if !config.cv_path.is_file() {
        anyhow::bail!("CV file not found: {}", config.cv_path.display());
    }
    if let RunMode::SingleFile(path) = &mode {
        if !path.is_file() {
            anyhow::bail!("Job file not found: {}", path.display());
        }
    }

    let probe = LlmClient::new(&config.ollama_url, config.request_timeout_secs)?;
    let available = probe.list_models().await.with_context(|| {
        format!(
            "Inference endpoint unreachable at {}. Is Ollama running?",
            probe.base_url()
        )
    })?;
    info!(
        "Inference endpoint {} has {} model(s)",
        probe.base_url(),
        available.len()
    );

    let request = ModelRequest {
        flag: cli.model.as_deref(),
        env_default: env.default_model.as_deref(),
        force_prompt: cli.select_model,
        interactive: std::io::stdin().is_terminal(),
    };
    let model = resolve_model(&request, &available, prompt)?;
    config = config.with_model(&model);

    let generator = CoverLetterGenerator::new(config).await?;

    match &mode {
        RunMode::Batch => {
            info!(
                "Batch mode: processing postings in {}",
                generator.config().input_dir.display()
            );
            generator.run_batch().await
        }
        RunMode::SingleFile(path) => {
            let source = JobSource::File(path.clone());
            let outcome = generator.process_file(path, cli.single_output(&mode)).await;
            Ok(single_report(source, outcome))
        }
        RunMode::Text(text) => {
            let outcome = generator.process_text(text, cli.single_output(&mode)).await;
            Ok(single_report(JobSource::Text(text.clone()), outcome))
        }
        RunMode::Stdin => {
            let text = read_stdin_posting().await?;
            let outcome = generator.process_text(&text, cli.single_output(&mode)).await;
            Ok(single_report(JobSource::Text(text), outcome))
        }
    }
}

fn single_report(source: JobSource, outcome: Result<ProcessedJob>) -> GenerationReport {
    let mut report = GenerationReport {
        total: 1,
        ..GenerationReport::default()
    };
    match outcome {
        Ok(processed) => {
            println!("\n{}", "=".repeat(80));
            println!("GENERATED COVER LETTER");
            println!("{}\n", "=".repeat(80));
            println!("{}", processed.letter);
            println!("\n{}", "=".repeat(80));
            report.processed.push(processed);
        }
        Err(e) => {
            error!(source = %source.label(), "Generation failed: {:#}", e);
            report.failures.push(GenerationFailure {
                source: source.label(),
                kind: classify(&e),
                reason: format!("{:#}", e),
            });
        }
    }
    report
}

async fn read_stdin_posting() -> Result<String> {
    eprintln!("Paste the job posting, then press Ctrl+D (Ctrl+Z then Enter on Windows):");
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read job posting from stdin")?;
    if text.trim().is_empty() {
        anyhow::bail!("No job posting provided");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::FileDefaults;

    fn bare_env() -> EnvironmentConfig {
        EnvironmentConfig {
            default_model: Some("llama3".into()),
            ollama_url: "http://localhost:11434".into(),
            log_file: None,
            file: FileDefaults::default(),
        }
    }

    #[test]
    fn job_file_wins_over_batch() {
        let cli = GeneratorCli::parse_from(["cover-letter", "--batch", "--job-file", "input/a.txt"]);
        assert_eq!(cli.run_mode(), RunMode::SingleFile(PathBuf::from("input/a.txt")));
    }

    #[test]
    fn batch_is_the_default() {
        let cli = GeneratorCli::parse_from(["cover-letter"]);
        assert_eq!(cli.run_mode(), RunMode::Batch);
    }

    #[test]
    fn single_posting_sources_conflict() {
        assert!(GeneratorCli::try_parse_from([
            "cover-letter",
            "--job-file",
            "a.txt",
            "--job-text",
            "text"
        ])
        .is_err());
        assert!(GeneratorCli::try_parse_from(["cover-letter", "--job-text", "t", "--stdin"]).is_err());
    }

    #[test]
    fn output_flag_meaning_depends_on_mode() {
        let cli = GeneratorCli::parse_from(["cover-letter", "--output", "letters"]);
        let mode = cli.run_mode();
        let config = cli.to_config(&bare_env(), &mode);
        assert_eq!(config.output_dir, PathBuf::from("letters"));
        assert_eq!(cli.single_output(&mode), None);

        let cli = GeneratorCli::parse_from([
            "cover-letter",
            "--job-file",
            "input/a.txt",
            "--output",
            "letter.txt",
        ]);
        let mode = cli.run_mode();
        let config = cli.to_config(&bare_env(), &mode);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(cli.single_output(&mode), Some(Path::new("letter.txt")));
    }

    #[test]
    fn flags_reach_config() {
        let cli = GeneratorCli::parse_from([
            "cover-letter",
            "--move-to-bin",
            "--cv",
            "me.txt",
            "--bin-dir",
            "done",
            "--ollama-url",
            "gpu:11434",
            "--max-tokens",
            "600",
            "--no-model-metadata",
        ]);
        let config = cli.to_config(&bare_env(), &cli.run_mode());
        assert!(config.move_to_bin);
        assert!(!config.model_metadata);
        assert_eq!(config.cv_path, PathBuf::from("me.txt"));
        assert_eq!(config.bin_dir, PathBuf::from("done"));
        assert_eq!(config.ollama_url, "http://gpu:11434");
        assert_eq!(config.sampling.num_predict, 600);
    }
}
