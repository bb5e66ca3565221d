use anyhow::Result;
use clap::Parser;
use cover_letter_kit::{handle_scraper_command, init_process, ScraperCli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ScraperCli::parse();

    let env = init_process()?;

    let report = handle_scraper_command(cli, &env).await?;
    println!("{}", report.summary());
    Ok(())
}
