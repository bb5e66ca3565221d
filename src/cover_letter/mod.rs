// src/cover_letter/mod.rs
use crate::errors::FailureKind;
use std::path::PathBuf;

pub mod generator;
pub mod metadata;
pub mod prompts;

pub use generator::CoverLetterGenerator;
pub use metadata::JobMetadata;

pub const OUTPUT_SUFFIX: &str = "_cover_letter.txt";

/// Where the posting for one generation comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    File(PathBuf),
    Text(String),
}

impl JobSource {
    pub fn label(&self) -> String {
        match self {
            JobSource::File(path) => path.display().to_string(),
            JobSource::Text(_) => "<inline posting>".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedJob {
    pub source: JobSource,
    pub output: PathBuf,
    pub archived: Option<PathBuf>,
    pub letter: String,
}

#[derive(Debug, Clone)]
pub struct GenerationFailure {
    pub source: String,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct GenerationReport {
    pub total: usize,
    pub processed: Vec<ProcessedJob>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "=".repeat(60),
            format!(
                "Generation complete: {}/{} successful",
                self.processed.len(),
                self.total
            ),
        ];
        for job in &self.processed {
            let mut line = format!("  wrote    {}", job.output.display());
            if let Some(archived) = &job.archived {
                line.push_str(&format!(" (posting moved to {})", archived.display()));
            }
            lines.push(line);
        }
        for failure in &self.failures {
            lines.push(format!(
                "  failed   {} [{}] {}",
                failure.source, failure.kind, failure.reason
            ));
        }
        lines.push("=".repeat(60));
        lines.join("\n")
    }
}

/// `<posting-stem>_cover_letter.txt`
pub fn output_file_name(posting_path: &std::path::Path) -> String {
    let stem = posting_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("job");
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("input/rust-engineer-acme.txt")),
            "rust-engineer-acme_cover_letter.txt"
        );
        assert_eq!(output_file_name(Path::new("posting")), "posting_cover_letter.txt");
    }

    #[test]
    fn summary_lists_failures() {
        let report = GenerationReport {
            total: 2,
            processed: vec![],
            failures: vec![GenerationFailure {
                source: "input/a.txt".into(),
                kind: FailureKind::Inference,
                reason: "timed out".into(),
            }],
        };
        let summary = report.summary();
        assert!(summary.contains("Generation complete: 0/2 successful"));
        assert!(summary.contains("input/a.txt [inference] timed out"));
    }
}
