// src/scrape/job_scraper.rs
use super::extract::extract_page;
use super::{combine_jobs, ScrapeFailure, ScrapeReport, ScrapedJob, COMBINED_FILE_PREFIX};
use crate::config::ScraperConfig;
use crate::core::FsOps;
use crate::errors::{classify, PipelineError};
use anyhow::{Context, Result};
use chrono::Local;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub struct JobScraper {
    client: Client,
    config: ScraperConfig,
}

impl JobScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch one page and extract its posting text.
    pub async fn extract_job_content(&self, url: &str) -> Result<ScrapedJob> {
        info!("Fetching job post: {}", url);

        let parsed = reqwest::Url::parse(url).map_err(|e| PipelineError::InvalidUrl {
            target: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| PipelineError::Network {
                target: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::HttpStatus {
                target: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Network {
                target: url.to_string(),
                message: format!("failed to read body: {}", e),
            })?;

        let page = extract_page(&html);
        if page.text.is_empty() {
            return Err(PipelineError::EmptyContent(url.to_string()).into());
        }

        info!(
            "Successfully scraped {} ({} chars, title: {})",
            url,
            page.text.len(),
            page.title.as_deref().unwrap_or("none")
        );

        Ok(ScrapedJob {
            url: url.to_string(),
            title: page.title,
            content: page.text,
        })
    }

    /// Write one posting into the output directory without overwriting.
    pub async fn save_individual(&self, job: &ScrapedJob) -> Result<PathBuf> {
        let file_name = job.file_name(Local::now());
        FsOps::write_unique(&self.config.output_dir, &file_name, &job.to_file_text()).await
    }

    /// Scrape every URL in order, sleeping between requests. Per-URL failures
    /// are recorded in the report; only output-directory problems abort.
    pub async fn run(&self, urls: &[String]) -> Result<ScrapeReport> {
        FsOps::ensure_dir_exists(&self.config.output_dir).await?;

        let mut report = ScrapeReport {
            total: urls.len(),
            ..ScrapeReport::default()
        };

        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
            info!("[{}/{}] {}", index + 1, urls.len(), url);

            let job = match self.extract_job_content(url).await {
                Ok(job) => job,
                Err(e) => {
                    error!(url = %url, "Failed to scrape: {:#}", e);
                    report.failures.push(ScrapeFailure {
                        url: url.clone(),
                        kind: classify(&e),
                        reason: format!("{:#}", e),
                    });
                    continue;
                }
            };

            if self.config.output.writes_individual() {
                match self.save_individual(&job).await {
                    Ok(path) => {
                        info!("Saved {} to {}", url, path.display());
                        report.saved.push(path);
                    }
                    Err(e) => {
                        error!(url = %url, "Failed to save posting: {:#}", e);
                        report.failures.push(ScrapeFailure {
                            url: url.clone(),
                            kind: classify(&e),
                            reason: format!("{:#}", e),
                        });
                        continue;
                    }
                }
            }

            report.jobs.push(job);
        }

        if let Some(target) = self.config.output.combined_target() {
            if report.jobs.is_empty() {
                warn!("No successful scrapes to combine");
            } else {
                let path = match target {
                    Some(path) => path.clone(),
                    None => self.config.output_dir.join(format!(
                        "{}{}.txt",
                        COMBINED_FILE_PREFIX,
                        Local::now().format("%Y%m%d_%H%M%S")
                    )),
                };
                FsOps::write_file_safe(&path, &combine_jobs(&report.jobs)).await?;
                info!("Combined file created: {}", path.display());
                report.combined = Some(path);
            }
        }

        Ok(report)
    }
}
