// src/config.rs
use crate::core::llm_client::{normalize_base_url, SamplingOptions, DEFAULT_TIMEOUT_SECS};
use crate::environment::EnvironmentConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URLS_FILE: &str = "offers/job_urls.txt";
pub const DEFAULT_INPUT_DIR: &str = "input";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_BIN_DIR: &str = "bin";
pub const DEFAULT_CV_PATH: &str = "input/resume.tex";
pub const DEFAULT_DELAY_SECS: f64 = 1.0;
pub const MAX_DELAY_SECS: f64 = 3600.0;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Where scraped postings end up.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutput {
    /// One file per posting
    Individual,
    /// Everything concatenated into one file; `None` picks a timestamped name
    Combined(Option<PathBuf>),
    /// Both of the above
    Both(Option<PathBuf>),
}

impl ScrapeOutput {
    pub fn writes_individual(&self) -> bool {
        matches!(self, ScrapeOutput::Individual | ScrapeOutput::Both(_))
    }

    pub fn combined_target(&self) -> Option<Option<&PathBuf>> {
        match self {
            ScrapeOutput::Individual => None,
            ScrapeOutput::Combined(path) | ScrapeOutput::Both(path) => Some(path.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub output_dir: PathBuf,
    pub delay: Duration,
    pub fetch_timeout: Duration,
    pub output: ScrapeOutput,
    pub user_agent: String,
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            output: ScrapeOutput::Individual,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }

    /// Start from built-in defaults overlaid with the config file
    pub fn from_environment(env: &EnvironmentConfig) -> Self {
        let mut config = Self::new();
        if let Some(dir) = &env.file.input_dir {
            config.output_dir = dir.clone();
        }
        if let Some(delay) = env.file.delay_secs {
            config = config.with_delay_secs(delay);
        }
        if let Some(timeout) = env.file.fetch_timeout_secs {
            config.fetch_timeout = Duration::from_secs(timeout);
        }
        config
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Negative or non-finite values mean no delay; anything above
    /// `MAX_DELAY_SECS` is capped.
    pub fn with_delay_secs(mut self, secs: f64) -> Self {
        self.delay = if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs.min(MAX_DELAY_SECS))
        } else {
            Duration::ZERO
        };
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_output(mut self, output: ScrapeOutput) -> Self {
        self.output = output;
        self
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub cv_path: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub ollama_url: String,
    pub model: String,
    pub sampling: SamplingOptions,
    pub request_timeout_secs: u64,
    pub move_to_bin: bool,
    /// Ask the model for company/position before falling back to heuristics
    pub model_metadata: bool,
}

impl GeneratorConfig {
    pub fn new(model: &str) -> Self {
        Self {
            cv_path: PathBuf::from(DEFAULT_CV_PATH),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
            ollama_url: crate::core::llm_client::DEFAULT_OLLAMA_URL.to_string(),
            model: model.to_string(),
            sampling: SamplingOptions::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            move_to_bin: false,
            model_metadata: true,
        }
    }

    /// Defaults overlaid with the config file and environment
    pub fn from_environment(env: &EnvironmentConfig, model: &str) -> Self {
        let file = &env.file;
        let mut config = Self::new(model).with_ollama_url(&env.ollama_url);
        if let Some(path) = &file.cv_path {
            config.cv_path = path.clone();
        }
        if let Some(dir) = &file.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(dir) = &file.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &file.bin_dir {
            config.bin_dir = dir.clone();
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(temperature) = file.temperature {
            config.sampling.temperature = temperature;
        }
        if let Some(max_tokens) = file.max_tokens {
            config.sampling.num_predict = max_tokens;
        }
        config
    }

    pub fn with_cv_path(mut self, path: PathBuf) -> Self {
        self.cv_path = path;
        self
    }

    pub fn with_input_dir(mut self, dir: PathBuf) -> Self {
        self.input_dir = dir;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_bin_dir(mut self, dir: PathBuf) -> Self {
        self.bin_dir = dir;
        self
    }

    pub fn with_ollama_url(mut self, url: &str) -> Self {
        self.ollama_url = normalize_base_url(url);
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_move_to_bin(mut self, enabled: bool) -> Self {
        self.move_to_bin = enabled;
        self
    }

    pub fn with_model_metadata(mut self, enabled: bool) -> Self {
        self.model_metadata = enabled;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.sampling.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.sampling.num_predict = max_tokens;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::FileDefaults;

    #[test]
    fn scraper_delay_rejects_negative_values() {
        let config = ScraperConfig::new().with_delay_secs(-3.0);
        assert_eq!(config.delay, Duration::ZERO);
        let config = ScraperConfig::new().with_delay_secs(0.25);
        assert_eq!(config.delay, Duration::from_millis(250));
        let config = ScraperConfig::new().with_delay_secs(1e30);
        assert_eq!(config.delay, Duration::from_secs_f64(MAX_DELAY_SECS));
    }

    #[test]
    fn scrape_output_modes() {
        assert!(ScrapeOutput::Individual.writes_individual());
        assert_eq!(ScrapeOutput::Individual.combined_target(), None);
        assert!(!ScrapeOutput::Combined(None).writes_individual());
        assert_eq!(ScrapeOutput::Combined(None).combined_target(), Some(None));
        let path = PathBuf::from("all.txt");
        assert_eq!(
            ScrapeOutput::Both(Some(path.clone())).combined_target(),
            Some(Some(&path))
        );
    }

    #[test]
    fn generator_config_layers_file_defaults() {
        let env = EnvironmentConfig {
            default_model: Some("llama3".into()),
            ollama_url: "http://gpu:11434".into(),
            log_file: None,
            file: FileDefaults {
                output_dir: Some(PathBuf::from("letters")),
                max_tokens: Some(1500),
                ..FileDefaults::default()
            },
        };

        let config = GeneratorConfig::from_environment(&env, "llama3")
            .with_bin_dir(PathBuf::from("done"))
            .with_temperature(9.0);

        assert_eq!(config.ollama_url, "http://gpu:11434");
        assert_eq!(config.output_dir, PathBuf::from("letters"));
        assert_eq!(config.input_dir, PathBuf::from(DEFAULT_INPUT_DIR));
        assert_eq!(config.bin_dir, PathBuf::from("done"));
        assert_eq!(config.sampling.num_predict, 1500);
        assert_eq!(config.sampling.temperature, 2.0);
    }
}
