// src/model_select.rs
//! Decide which model a generator run uses

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Select};
use tracing::{info, warn};

/// Interactive chooser over the endpoint's installed models.
pub trait ModelPrompt {
    /// `Ok(None)` means the user cancelled.
    fn choose(&self, models: &[String], default: Option<usize>) -> Result<Option<String>>;
}

/// Terminal menu
pub struct TerminalPrompt;

impl ModelPrompt for TerminalPrompt {
    fn choose(&self, models: &[String], default: Option<usize>) -> Result<Option<String>> {
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select a model")
            .items(models)
            .default(default.unwrap_or(0))
            .interact_opt()
            .context("Failed to read model selection")?;
        Ok(selection.map(|index| models[index].clone()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelRequest<'a> {
    /// `--model`
    pub flag: Option<&'a str>,
    /// `COVER_LETTER_MODEL` / `OLLAMA_MODEL` / config file
    pub env_default: Option<&'a str>,
    /// `--select-model`
    pub force_prompt: bool,
    /// Whether stdin is a terminal
    pub interactive: bool,
}

/// Flag, then environment default, then the interactive menu.
pub fn resolve_model(
    request: &ModelRequest<'_>,
    available: &[String],
    prompt: &dyn ModelPrompt,
) -> Result<String> {
    let preferred = request.flag.or(request.env_default);

    if request.force_prompt {
        return prompt_for_model(request, available, preferred, prompt);
    }

    if let Some(flag) = request.flag {
        check_installed(flag, available);
        info!("Using model from command line: {}", flag);
        return Ok(flag.to_string());
    }

    if let Some(default) = request.env_default {
        check_installed(default, available);
        info!("Using default model from environment: {}", default);
        return Ok(default.to_string());
    }

    prompt_for_model(request, available, None, prompt)
}

fn prompt_for_model(
    request: &ModelRequest<'_>,
    available: &[String],
    preferred: Option<&str>,
    prompt: &dyn ModelPrompt,
) -> Result<String> {
    if !request.interactive {
        if let Some(model) = preferred {
            warn!("No terminal for model selection; using configured model {}", model);
            check_installed(model, available);
            return Ok(model.to_string());
        }
        anyhow::bail!(
            "No model configured and no terminal for interactive selection. \
             Pass --model or set COVER_LETTER_MODEL"
        );
    }
    if available.is_empty() {
        anyhow::bail!("The inference endpoint reports no installed models");
    }

    let default = preferred.and_then(|name| available.iter().position(|m| same_model(m, name)));
    prompt
        .choose(available, default)?
        .context("Model selection cancelled")
}

fn check_installed(model: &str, available: &[String]) {
    if !available.is_empty() && !available.iter().any(|m| same_model(m, model)) {
        warn!(
            "Model '{}' is not among the installed models: {}",
            model,
            available.join(", ")
        );
    }
}

/// Ollama treats `name` and `name:latest` as the same model.
pub fn same_model(installed: &str, requested: &str) -> bool {
    installed == requested
        || installed.strip_suffix(":latest") == Some(requested)
        || requested.strip_suffix(":latest") == Some(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedPrompt {
        answer: Option<usize>,
        seen_default: RefCell<Option<Option<usize>>>,
    }

    impl ScriptedPrompt {
        fn answering(answer: Option<usize>) -> Self {
            Self {
                answer,
                seen_default: RefCell::new(None),
            }
        }
    }

    impl ModelPrompt for ScriptedPrompt {
        fn choose(&self, models: &[String], default: Option<usize>) -> Result<Option<String>> {
            *self.seen_default.borrow_mut() = Some(default);
            Ok(self.answer.map(|i| models[i].clone()))
        }
    }

    fn installed() -> Vec<String> {
        vec!["llama3:latest".to_string(), "mistral:7b".to_string()]
    }

    #[test]
    fn flag_wins_over_environment() {
        let request = ModelRequest {
            flag: Some("mistral:7b"),
            env_default: Some("llama3"),
            ..ModelRequest::default()
        };
        let prompt = ScriptedPrompt::answering(Some(0));
        assert_eq!(resolve_model(&request, &installed(), &prompt).unwrap(), "mistral:7b");
        assert!(prompt.seen_default.borrow().is_none());
    }

    #[test]
    fn environment_used_without_flag() {
        let request = ModelRequest {
            env_default: Some("llama3"),
            ..ModelRequest::default()
        };
        let prompt = ScriptedPrompt::answering(None);
        assert_eq!(resolve_model(&request, &installed(), &prompt).unwrap(), "llama3");
    }

    #[test]
    fn prompt_used_when_nothing_configured() {
        let request = ModelRequest {
            interactive: true,
            ..ModelRequest::default()
        };
        let prompt = ScriptedPrompt::answering(Some(1));
        assert_eq!(resolve_model(&request, &installed(), &prompt).unwrap(), "mistral:7b");
    }

    #[test]
    fn forced_prompt_preselects_configured_model() {
        let request = ModelRequest {
            env_default: Some("llama3"),
            force_prompt: true,
            interactive: true,
            ..ModelRequest::default()
        };
        let prompt = ScriptedPrompt::answering(Some(1));
        assert_eq!(resolve_model(&request, &installed(), &prompt).unwrap(), "mistral:7b");
        assert_eq!(*prompt.seen_default.borrow(), Some(Some(0)));
    }

    #[test]
    fn forced_prompt_without_terminal_keeps_configured_model() {
        let request = ModelRequest {
            flag: Some("mistral:7b"),
            env_default: Some("llama3"),
            force_prompt: true,
            interactive: false,
        };
        let prompt = ScriptedPrompt::answering(Some(0));
        assert_eq!(resolve_model(&request, &installed(), &prompt).unwrap(), "mistral:7b");
        assert!(prompt.seen_default.borrow().is_none());

        let request = ModelRequest {
            force_prompt: true,
            ..ModelRequest::default()
        };
        assert!(resolve_model(&request, &installed(), &prompt).is_err());
    }

    #[test]
    fn unresolvable_model_is_an_error() {
        let prompt = ScriptedPrompt::answering(Some(0));
        let request = ModelRequest::default();
        assert!(resolve_model(&request, &installed(), &prompt).is_err());

        let request = ModelRequest {
            interactive: true,
            ..ModelRequest::default()
        };
        assert!(resolve_model(&request, &[], &prompt).is_err());

        let cancelled = ScriptedPrompt::answering(None);
        assert!(resolve_model(&request, &installed(), &cancelled).is_err());
    }

    #[test]
    fn test_same_model() {
        assert!(same_model("llama3:latest", "llama3"));
        assert!(same_model("llama3", "llama3:latest"));
        assert!(!same_model("llama3:8b", "llama3"));
    }
}
