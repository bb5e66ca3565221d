use anyhow::Result;
use clap::Parser;
use cover_letter_kit::model_select::TerminalPrompt;
use cover_letter_kit::{handle_generator_command, init_process, GeneratorCli};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = GeneratorCli::parse();

    let env = init_process()?;

    info!("Inference endpoint: {}", env.ollama_url);

    let report = handle_generator_command(cli, &env, &TerminalPrompt).await?;
    println!("{}", report.summary());
    Ok(())
}
