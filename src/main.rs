use anyhow::Result;
use tracing::{error, info};

use linkdigest::core::config::AppConfig;
use linkdigest::discord::DiscordBot;
use linkdigest::pipeline::SummaryPipeline;
use linkdigest::summarize::{GeminiClient, WebScraper};

#[tokio::main]
async fn main() {
    linkdigest::setup_logging();
    if let Err(err) = run().await {
        error!("run aborted: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config =
        AppConfig::from_env().map_err(|err| anyhow::anyhow!("configuration error: {err}"))?;

    let bot = DiscordBot::new(&config);
    let scraper = WebScraper::new();
    let summarizer = GeminiClient::new(config.google_api_key.clone(), config.gemini_model.clone());

    let mut pipeline = SummaryPipeline::new(&bot, &scraper, &summarizer, &config);
    let report = pipeline.run().await?;
    info!(
        "run finished: {} posted, {} duplicates, {} skipped, {} failed",
        report.posted, report.duplicates, report.skipped, report.failed
    );
    Ok(())
}
