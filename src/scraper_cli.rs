// src/scraper_cli.rs
use crate::config::{ScrapeOutput, ScraperConfig, DEFAULT_URLS_FILE, MAX_DELAY_SECS};
use crate::core::FsOps;
use crate::environment::EnvironmentConfig;
use crate::scrape::{parse_url_list, JobScraper, ScrapeReport};
use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "job-scraper")]
#[command(about = "Scrape job postings from URLs into text files")]
pub struct ScraperCli {
    /// A single job URL, or a file with one URL per line
    pub source: Option<String>,

    /// File containing URLs, one per line (default: offers/job_urls.txt)
    #[arg(long)]
    pub urls_file: Option<PathBuf>,

    /// Directory to save scraped jobs (default: input)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Delay between requests in seconds (default: 1.0)
    #[arg(long, value_parser = parse_delay)]
    pub delay: Option<f64>,

    /// Per-request timeout in seconds (default: 10)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Combine all jobs into a single file instead of separate files
    #[arg(long)]
    pub combine: bool,

    /// With --combine, also write the separate files
    #[arg(long, requires = "combine")]
    pub keep_individual: bool,

    /// Path for the combined output file (only with --combine)
    #[arg(long, requires = "combine")]
    pub combined_output: Option<PathBuf>,
}

impl ScraperCli {
    pub fn to_config(&self, env: &EnvironmentConfig) -> ScraperConfig {
        let mut config = ScraperConfig::from_environment(env);
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        if let Some(delay) = self.delay {
            config = config.with_delay_secs(delay);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_fetch_timeout(Duration::from_secs(timeout));
        }
        let output = match (self.combine, self.keep_individual) {
            (false, _) => ScrapeOutput::Individual,
            (true, false) => ScrapeOutput::Combined(self.combined_output.clone()),
            (true, true) => ScrapeOutput::Both(self.combined_output.clone()),
        };
        config.with_output(output)
    }

    /// Positional source first, then `--urls-file`, then the config file,
    /// then the default list path.
    pub async fn collect_urls(&self, env: &EnvironmentConfig) -> Result<Vec<String>> {
        if let Some(source) = &self.source {
            if is_url(source) {
                return Ok(vec![source.trim().to_string()]);
            }
            return read_url_file(Path::new(source)).await;
        }

        let path = self
            .urls_file
            .clone()
            .or_else(|| env.file.urls_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_URLS_FILE));
        read_url_file(&path).await
    }
}

fn parse_delay(raw: &str) -> Result<f64, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw))?;
    if !secs.is_finite() || !(0.0..=MAX_DELAY_SECS).contains(&secs) {
        return Err(format!("delay must be between 0 and {} seconds", MAX_DELAY_SECS));
    }
    Ok(secs)
}

fn is_url(source: &str) -> bool {
    let lowered = source.trim().to_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

async fn read_url_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        anyhow::bail!("URL list not found: {}", path.display());
    }
    let urls = parse_url_list(&FsOps::read_file_safe(path).await?);
    if urls.is_empty() {
        anyhow::bail!("No URLs found in {}", path.display());
    }
    info!("Found {} URLs to scrape in {}", urls.len(), path.display());
    Ok(urls)
}

/// Run a whole scrape. Errors are startup problems; per-URL failures are in
/// the returned report.
pub async fn handle_scraper_command(cli: ScraperCli, env: &EnvironmentConfig) -> Result<ScrapeReport> {
    let urls = cli.collect_urls(env).await?;
    let scraper = JobScraper::new(cli.to_config(env))?;
    info!(
        "Scraping {} URL(s) into {}",
        urls.len(),
        scraper.config().output_dir.display()
    );
    scraper.run(&urls).await
}
