// src/utils.rs
use chrono::{DateTime, Local};

/// Longest file stem produced from a scraped job title.
pub const MAX_STEM_CHARS: usize = 80;
/// Longest company or position component in an archive name.
pub const MAX_COMPONENT_CHARS: usize = 40;

/// Normalize free text into a lowercase, dash-separated, filesystem-safe
/// component of at most `max_chars` characters. Idempotent.
pub fn normalize_component(text: &str, max_chars: usize) -> String {
    let dashed = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    dashed
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

/// File name for a scraped posting with a detected title.
pub fn filename_from_title(title: &str) -> Option<String> {
    let stem = normalize_component(title, MAX_STEM_CHARS);
    if stem.is_empty() {
        None
    } else {
        Some(format!("{}.txt", stem))
    }
}

/// File name for a scraped posting whose title could not be detected.
pub fn fallback_scrape_filename(host: Option<&str>, now: DateTime<Local>) -> String {
    let domain = host
        .map(|h| h.trim_start_matches("www."))
        .map(|h| normalize_component(h, MAX_COMPONENT_CHARS))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    format!("job_{}_{}.txt", domain, now.format("%Y%m%d_%H%M%S"))
}

/// `<company>-<position>-<date>.txt`, or `None` when either part normalizes
/// to nothing.
pub fn archive_filename(company: &str, position: &str, now: DateTime<Local>) -> Option<String> {
    let company = normalize_component(company, MAX_COMPONENT_CHARS);
    let position = normalize_component(position, MAX_COMPONENT_CHARS);
    if company.is_empty() || position.is_empty() {
        return None;
    }
    Some(format!(
        "{}-{}-{}.txt",
        company,
        position,
        now.format("%Y-%m-%d")
    ))
}

/// Archive name used when company/position extraction gave nothing.
pub fn fallback_archive_filename(original_stem: &str, now: DateTime<Local>) -> String {
    let stem = normalize_component(original_stem, MAX_STEM_CHARS);
    let stem = if stem.is_empty() { "job".to_string() } else { stem };
    format!("{}-{}.txt", stem, now.format("%Y%m%d_%H%M%S"))
}

/// Collapse all runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
