// src/cover_letter/generator.rs
use super::metadata::{heuristic_metadata, parse_model_metadata, JobMetadata};
use super::prompts::{clean_cv_text, cover_letter_messages, metadata_messages};
use super::{
    output_file_name, GenerationFailure, GenerationReport, JobSource, ProcessedJob,
    OUTPUT_SUFFIX,
};
use crate::config::GeneratorConfig;
use crate::core::{FsOps, LlmClient, SamplingOptions};
use crate::errors::classify;
use crate::scrape::{COMBINED_FILE_PREFIX, COMBINED_SEPARATOR_WIDTH};
use crate::utils::{archive_filename, fallback_archive_filename};
use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Extraction replies are short; no need for the full token budget.
const METADATA_MAX_TOKENS: u32 = 200;

pub struct CoverLetterGenerator {
    client: LlmClient,
    config: GeneratorConfig,
    cv_text: String,
}

impl CoverLetterGenerator {
    /// Reads the CV once; a missing or empty CV is fatal.
    pub async fn new(config: GeneratorConfig) -> Result<Self> {
        if !config.cv_path.is_file() {
            anyhow::bail!("CV file not found: {}", config.cv_path.display());
        }
        let raw = FsOps::read_file_safe(&config.cv_path).await?;
        let cv_text = clean_cv_text(&raw);
        if cv_text.is_empty() {
            anyhow::bail!("CV file is empty: {}", config.cv_path.display());
        }
        info!(
            "Loaded CV from {} ({} chars)",
            config.cv_path.display(),
            cv_text.len()
        );

        let client = LlmClient::new(&config.ollama_url, config.request_timeout_secs)?;

        Ok(Self {
            client,
            config,
            cv_text,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    pub async fn generate_cover_letter(&self, posting: &str) -> Result<String> {
        let messages = cover_letter_messages(&self.cv_text, posting);
        self.client
            .chat(&self.config.model, &messages, self.config.sampling)
            .await
            .context("Error generating cover letter")
    }

    /// Company and position for archive naming. Never fails: model problems
    /// degrade to text heuristics, heuristics degrade to `None`.
    pub async fn extract_metadata(&self, posting: &str) -> Option<JobMetadata> {
        if self.config.model_metadata {
            let options = SamplingOptions {
                temperature: 0.0,
                num_predict: METADATA_MAX_TOKENS,
            };
            match self
                .client
                .chat(&self.config.model, &metadata_messages(posting), options)
                .await
            {
                Ok(reply) => match parse_model_metadata(&reply) {
                    Some(metadata) => return Some(metadata),
                    None => debug!("Model metadata reply not usable: {}", reply),
                },
                Err(e) => warn!("Metadata extraction via model failed: {:#}", e),
            }
        }
        heuristic_metadata(posting)
    }

    /// Generate a letter for one posting file; archive it when enabled.
    /// `output` overrides the letter's path.
    pub async fn process_file(&self, path: &Path, output: Option<&Path>) -> Result<ProcessedJob> {
        let posting = FsOps::read_file_safe(path).await?;
        if posting.trim().is_empty() {
            anyhow::bail!("Job posting is empty: {}", path.display());
        }

        let letter = self.generate_cover_letter(&posting).await?;
        let output_path = match output {
            Some(target) => self.write_to(target, &letter).await?,
            None => {
                FsOps::write_unique(&self.config.output_dir, &output_file_name(path), &letter)
                    .await?
            }
        };
        info!("Cover letter saved to: {}", output_path.display());

        let archived = if self.config.move_to_bin {
            let archived = self.archive_posting(path, &posting).await.with_context(|| {
                format!(
                    "Letter saved to {} but archiving {} failed",
                    output_path.display(),
                    path.display()
                )
            })?;
            Some(archived)
        } else {
            None
        };

        Ok(ProcessedJob {
            source: JobSource::File(path.to_path_buf()),
            output: output_path,
            archived,
            letter,
        })
    }

    /// Generate a letter for inline posting text. Nothing gets archived.
    pub async fn process_text(&self, posting: &str, output: Option<&Path>) -> Result<ProcessedJob> {
        if posting.trim().is_empty() {
            anyhow::bail!("No job posting provided");
        }

        let letter = self.generate_cover_letter(posting).await?;
        let output_path = match output {
            Some(target) => self.write_to(target, &letter).await?,
            None => {
                let name = format!("cover_letter_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
                FsOps::write_unique(&self.config.output_dir, &name, &letter).await?
            }
        };
        info!("Cover letter saved to: {}", output_path.display());

        Ok(ProcessedJob {
            source: JobSource::Text(posting.to_string()),
            output: output_path,
            archived: None,
            letter,
        })
    }

    /// Rename the posting after its company/position and move it to the
    /// archive directory.
    pub async fn archive_posting(&self, path: &Path, posting: &str) -> Result<PathBuf> {
        let now = Local::now();
        let file_name = match self.extract_metadata(posting).await {
            Some(metadata) => {
                info!(
                    "Detected {} / {} for {}",
                    metadata.company,
                    metadata.position,
                    path.display()
                );
                archive_filename(&metadata.company, &metadata.position, now)
            }
            None => None,
        }
        .unwrap_or_else(|| {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("job");
            warn!(
                "Could not detect company/position for {}, using fallback name",
                path.display()
            );
            fallback_archive_filename(stem, now)
        });

        FsOps::move_unique(path, &self.config.bin_dir, &file_name).await
    }

    /// Posting files of the input directory. Skips the CV, generated letters
    /// and combined scrape files (by name or by their separator header).
    pub async fn batch_files(&self) -> Result<Vec<PathBuf>> {
        let cv = std::fs::canonicalize(&self.config.cv_path).ok();
        let separator = "=".repeat(COMBINED_SEPARATOR_WIDTH);
        let mut files = Vec::new();

        for path in FsOps::list_text_files(&self.config.input_dir).await? {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name.starts_with(COMBINED_FILE_PREFIX) || name.ends_with(OUTPUT_SUFFIX) {
                debug!("Skipping {}", path.display());
                continue;
            }
            if cv.is_some() && std::fs::canonicalize(&path).ok() == cv {
                continue;
            }
            let content = FsOps::read_file_safe(&path).await?;
            if content.starts_with(&separator) {
                debug!("Skipping combined file {}", path.display());
                continue;
            }
            files.push(path);
        }
        Ok(files)
    }

    /// Process every posting in the input directory. A failing posting is
    /// reported and left in place; the rest still run.
    pub async fn run_batch(&self) -> Result<GenerationReport> {
        let files = self.batch_files().await?;
        self.run_files(&files).await
    }

    pub async fn run_files(&self, files: &[PathBuf]) -> Result<GenerationReport> {
        let mut report = GenerationReport {
            total: files.len(),
            ..GenerationReport::default()
        };

        if files.is_empty() {
            warn!(
                "No job postings found in {}",
                self.config.input_dir.display()
            );
            return Ok(report);
        }

        for (index, path) in files.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, files.len(), path.display());
            match self.process_file(path, None).await {
                Ok(processed) => report.processed.push(processed),
                Err(e) => {
                    error!(file = %path.display(), "Skipping posting: {:#}", e);
                    report.failures.push(GenerationFailure {
                        source: path.display().to_string(),
                        kind: classify(&e),
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn write_to(&self, target: &Path, letter: &str) -> Result<PathBuf> {
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = target
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid output path: {}", target.display()))?;
        FsOps::write_unique(dir, name, letter).await
    }
}
