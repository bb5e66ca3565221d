// src/cover_letter/metadata.rs
//! Best-effort company/position detection, used only for archive names

use crate::scrape::TITLE_PREFIX;
use crate::utils::collapse_whitespace;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMetadata {
    pub company: String,
    pub position: String,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    company: Option<String>,
    #[serde(alias = "title", alias = "job_title", alias = "role")]
    position: Option<String>,
}

const COMPANY_LABELS: &[&str] = &["company:", "company name:", "employer:", "organization:"];
const POSITION_LABELS: &[&str] = &["position:", "job title:", "role:", "job:"];
const TITLE_SEPARATORS: &[&str] = &[" - ", " | ", " – ", " — ", " · "];
const PLACEHOLDERS: &[&str] = &["", "null", "none", "unknown", "n/a", "na", "not specified"];

fn meaningful(value: Option<String>) -> Option<String> {
    let value = collapse_whitespace(value?.trim_matches(|c: char| c == '"' || c == '\''));
    let lowered = value.to_lowercase();
    if PLACEHOLDERS.contains(&lowered.as_str()) {
        None
    } else {
        Some(value)
    }
}

/// Parse a model reply that should contain `{"company": .., "position": ..}`,
/// possibly wrapped in prose or a code fence.
pub fn parse_model_metadata(reply: &str) -> Option<JobMetadata> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    let raw: RawMetadata = serde_json::from_str(&reply[start..=end]).ok()?;
    Some(JobMetadata {
        company: meaningful(raw.company)?,
        position: meaningful(raw.position)?,
    })
}

/// Look for labelled lines, then fall back to splitting the scraped title.
pub fn heuristic_metadata(posting: &str) -> Option<JobMetadata> {
    let mut company = None;
    let mut position = None;
    let mut title = None;

    for line in posting.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lowered = line.to_lowercase();
        if company.is_none() {
            company = labelled_value(line, &lowered, COMPANY_LABELS);
        }
        if position.is_none() {
            position = labelled_value(line, &lowered, POSITION_LABELS);
        }
        if title.is_none() && lowered.starts_with(&TITLE_PREFIX.to_lowercase()) {
            title = line
                .get(TITLE_PREFIX.len()..)
                .and_then(|rest| meaningful(Some(rest.to_string())));
        }
    }

    if let (Some(company), Some(position)) = (company.clone(), position.clone()) {
        return Some(JobMetadata { company, position });
    }

    let (title_position, title_company) = title.as_deref().and_then(split_title).unzip();
    Some(JobMetadata {
        company: company.or(title_company)?,
        position: position.or(title_position)?,
    })
}

fn labelled_value(line: &str, lowered: &str, labels: &[&str]) -> Option<String> {
    labels
        .iter()
        .find(|label| lowered.starts_with(*label))
        .and_then(|label| line.get(label.len()..))
        .and_then(|rest| meaningful(Some(rest.to_string())))
}

/// `"<position> at <company>"` or `"<position> - <company> | <site>"`.
pub fn split_title(title: &str) -> Option<(String, String)> {
    if let Some((position, company)) = title.split_once(" at ") {
        let company = TITLE_SEPARATORS
            .iter()
            .fold(company, |acc, sep| acc.split(sep).next().unwrap_or(acc));
        return Some((
            meaningful(Some(position.to_string()))?,
            meaningful(Some(company.to_string()))?,
        ));
    }

    let mut segments = vec![title.to_string()];
    for sep in TITLE_SEPARATORS {
        segments = segments
            .iter()
            .flat_map(|s| s.split(sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    let mut segments = segments.into_iter().filter_map(|s| meaningful(Some(s)));
    let position = segments.next()?;
    let company = segments.next()?;
    Some((position, company))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(company: &str, position: &str) -> JobMetadata {
        JobMetadata {
            company: company.to_string(),
            position: position.to_string(),
        }
    }

    #[test]
    fn parses_fenced_json_reply() {
        let reply = "Sure!\n```json\n{\"company\": \"Acme Corp\", \"position\": \"Rust Engineer\"}\n```";
        assert_eq!(parse_model_metadata(reply), Some(meta("Acme Corp", "Rust Engineer")));
    }

    #[test]
    fn parses_alias_keys() {
        let reply = r#"{"company":"Globex","title":"QA Lead"}"#;
        assert_eq!(parse_model_metadata(reply), Some(meta("Globex", "QA Lead")));
    }

    #[test]
    fn rejects_placeholder_values() {
        assert_eq!(parse_model_metadata(r#"{"company": null, "position": "Dev"}"#), None);
        assert_eq!(parse_model_metadata(r#"{"company": "Unknown", "position": "Dev"}"#), None);
        assert_eq!(parse_model_metadata("no json here"), None);
        assert_eq!(parse_model_metadata("} backwards {"), None);
    }

    #[test]
    fn heuristics_prefer_labelled_lines() {
        let posting = "Source URL: https://x.test\nTitle: Something - Else\n\nCompany: Initech\nJob Title: Platform Engineer\n";
        assert_eq!(heuristic_metadata(posting), Some(meta("Initech", "Platform Engineer")));
    }

    #[test]
    fn heuristics_fall_back_to_title() {
        let posting = "Source URL: https://x.test\nTitle: Senior Rust Engineer at Acme | LinkedIn\n\nWe build things.";
        assert_eq!(heuristic_metadata(posting), Some(meta("Acme", "Senior Rust Engineer")));

        let posting = "Title: Data Engineer - Globex - Careers\n\nText";
        assert_eq!(heuristic_metadata(posting), Some(meta("Globex", "Data Engineer")));
    }

    #[test]
    fn heuristics_give_up_without_signals() {
        assert_eq!(heuristic_metadata("Title: Just A Title\n\nWe are hiring."), None);
        assert_eq!(heuristic_metadata(""), None);
    }
}
