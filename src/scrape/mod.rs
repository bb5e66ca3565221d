// src/scrape/mod.rs
use crate::errors::FailureKind;
use crate::utils::{fallback_scrape_filename, filename_from_title};
use chrono::{DateTime, Local};
use std::path::PathBuf;

pub mod extract;
pub mod job_scraper;

pub use job_scraper::JobScraper;

pub const SOURCE_URL_PREFIX: &str = "Source URL:";
pub const TITLE_PREFIX: &str = "Title:";
pub const COMBINED_SEPARATOR_WIDTH: usize = 80;
pub const COMBINED_FILE_PREFIX: &str = "combined_jobs_";

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedJob {
    pub url: String,
    pub title: Option<String>,
    pub content: String,
}

impl ScrapedJob {
    /// Text written to disk: reference lines, a blank line, then the posting.
    pub fn to_file_text(&self) -> String {
        let mut text = format!("{} {}\n", SOURCE_URL_PREFIX, self.url);
        if let Some(title) = &self.title {
            text.push_str(&format!("{} {}\n", TITLE_PREFIX, title));
        }
        text.push('\n');
        text.push_str(&self.content);
        text.push('\n');
        text
    }

    pub fn file_name(&self, now: DateTime<Local>) -> String {
        self.title
            .as_deref()
            .and_then(filename_from_title)
            .unwrap_or_else(|| {
                let host = reqwest::Url::parse(&self.url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string));
                fallback_scrape_filename(host.as_deref(), now)
            })
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeFailure {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub total: usize,
    pub jobs: Vec<ScrapedJob>,
    pub saved: Vec<PathBuf>,
    pub combined: Option<PathBuf>,
    pub failures: Vec<ScrapeFailure>,
}

impl ScrapeReport {
    pub fn succeeded(&self) -> usize {
        self.jobs.len()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            "=".repeat(60),
            format!(
                "Scraping complete: {}/{} successful",
                self.succeeded(),
                self.total
            ),
        ];
        for path in &self.saved {
            lines.push(format!("  saved    {}", path.display()));
        }
        if let Some(path) = &self.combined {
            lines.push(format!("  combined {}", path.display()));
        }
        for failure in &self.failures {
            lines.push(format!(
                "  failed   {} [{}] {}",
                failure.url, failure.kind, failure.reason
            ));
        }
        lines.push("=".repeat(60));
        lines.join("\n")
    }
}

/// URLs from a newline-delimited list; blank lines and `#` comments skipped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Join postings into the combined-file layout.
pub fn combine_jobs(jobs: &[ScrapedJob]) -> String {
    let separator = "=".repeat(COMBINED_SEPARATOR_WIDTH);
    jobs.iter()
        .map(|job| format!("{}\n{}", separator, job.to_file_text()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job(title: Option<&str>) -> ScrapedJob {
        ScrapedJob {
            url: "https://www.careers.example.org/jobs/42".to_string(),
            title: title.map(str::to_string),
            content: "Build things.".to_string(),
        }
    }

    #[test]
    fn test_parse_url_list() {
        let list = "# saved jobs\nhttps://a.test/1\n\n   https://b.test/2  \n  # indented comment\n";
        assert_eq!(parse_url_list(list), vec!["https://a.test/1", "https://b.test/2"]);
    }

    #[test]
    fn file_text_starts_with_source_url() {
        let text = job(Some("Rust Dev")).to_file_text();
        assert!(text.starts_with("Source URL: https://www.careers.example.org/jobs/42\n"));
        assert!(text.contains("Title: Rust Dev\n\nBuild things."));

        let untitled = job(None).to_file_text();
        assert_eq!(
            untitled,
            "Source URL: https://www.careers.example.org/jobs/42\n\nBuild things.\n"
        );
    }

    #[test]
    fn file_name_uses_title_or_domain() {
        let now = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(job(Some("Rust Dev @ Acme")).file_name(now), "rust-dev-acme.txt");
        assert_eq!(
            job(None).file_name(now),
            "job_careers-example-org_20260102_030405.txt"
        );
    }

    #[test]
    fn combined_layout_separates_postings() {
        let combined = combine_jobs(&[job(Some("One")), job(Some("Two"))]);
        assert_eq!(combined.matches(&"=".repeat(80)).count(), 2);
        assert!(combined.starts_with(&"=".repeat(80)));
        assert!(combined.find("Title: One").unwrap() < combined.find("Title: Two").unwrap());
    }
}
