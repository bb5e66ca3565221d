// src/cover_letter/prompts.rs
use crate::core::ChatMessage;

/// LaTeX preamble commands that carry no CV content.
const LATEX_PREAMBLE_PREFIXES: &[&str] = &[
    "\\usepackage",
    "\\define",
    "\\setmainfont",
    "\\geometry",
    "\\titleformat",
    "\\newcommand",
];

/// Posting text sent to the metadata extraction prompt is capped; company
/// and title live near the top.
const METADATA_POSTING_CHARS: usize = 4000;

pub const COVER_LETTER_SYSTEM_PROMPT: &str = r#"You are an expert career counselor and cover letter writer. Write compelling, personalized cover letters that:
- Highlight the candidate's most relevant experience and skills
- Address specific requirements from the job posting
- Use a professional yet engaging tone
- Stay concise (300-400 words)
- Include concrete examples and achievements
- Show genuine interest in the role and the company
- Are formatted as a proper business letter with greeting and closing
- Use the candidate's real name and contact details from the CV
Reply with the letter text only."#;

pub const METADATA_SYSTEM_PROMPT: &str = r#"You extract structured data from job postings. Reply with a single JSON object and nothing else, shaped exactly like {"company": "...", "position": "..."}. Use null for a field you cannot find."#;

/// Strip LaTeX preamble lines, `%` comments and blank lines from a CV.
pub fn clean_cv_text(raw: &str) -> String {
    raw.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty()
                && !trimmed.starts_with('%')
                && !LATEX_PREAMBLE_PREFIXES
                    .iter()
                    .any(|prefix| trimmed.starts_with(prefix))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cover_letter_prompt(cv_text: &str, posting: &str) -> String {
    format!(
        r#"Based on this CV and job posting, write a tailored cover letter.

CV:
{}

JOB POSTING:
{}

Write a cover letter that highlights the most relevant experience and skills for this specific role."#,
        cv_text,
        posting.trim()
    )
}

pub fn cover_letter_messages(cv_text: &str, posting: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(COVER_LETTER_SYSTEM_PROMPT),
        ChatMessage::user(cover_letter_prompt(cv_text, posting)),
    ]
}

pub fn metadata_messages(posting: &str) -> Vec<ChatMessage> {
    let excerpt: String = posting.trim().chars().take(METADATA_POSTING_CHARS).collect();
    vec![
        ChatMessage::system(METADATA_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Extract the company name and the position title from this posting.\n\nPOSTING TEXT:\n{}",
            excerpt
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cv_text_drops_preamble() {
        let cv = r#"\documentclass{article}
\usepackage{fontspec}
\setmainfont{Inter}
% personal notes
\begin{document}

\section{Experience}
  Built a compiler at Acme.
\end{document}"#;
        assert_eq!(
            clean_cv_text(cv),
            "\\documentclass{article}\n\\begin{document}\n\\section{Experience}\n  Built a compiler at Acme.\n\\end{document}"
        );
    }

    #[test]
    fn plain_text_cv_keeps_content() {
        assert_eq!(clean_cv_text("Jane Doe\n\nRust, Go\n"), "Jane Doe\nRust, Go");
    }

    #[test]
    fn cover_letter_messages_embed_cv_and_posting() {
        let messages = cover_letter_messages("Jane Doe", "  Rust Engineer at Acme\n");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("CV:\nJane Doe\n\nJOB POSTING:\nRust Engineer at Acme\n"));
    }

    #[test]
    fn metadata_prompt_is_capped() {
        let long = "x".repeat(METADATA_POSTING_CHARS * 2);
        let messages = metadata_messages(&long);
        assert!(messages[1].content.len() < METADATA_POSTING_CHARS + 200);
        assert!(messages[1].content.contains("POSTING TEXT:"));
    }
}
