pub mod config;
pub mod core;
pub mod cover_letter;
pub mod environment;
pub mod errors;
pub mod generator_cli;
pub mod model_select;
pub mod scrape;
pub mod scraper_cli;
pub mod telemetry;
pub mod utils;

pub use config::{GeneratorConfig, ScrapeOutput, ScraperConfig};
pub use cover_letter::{CoverLetterGenerator, GenerationReport};
pub use environment::EnvironmentConfig;
pub use errors::{FailureKind, PipelineError};
pub use generator_cli::{handle_generator_command, GeneratorCli};
pub use scrape::{JobScraper, ScrapeReport};
pub use scraper_cli::{handle_scraper_command, ScraperCli};
pub use telemetry::{init_process, init_tracing};
