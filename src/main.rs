use anyhow::Context;
use clap::Parser;
use logostamp::core::runner;
use logostamp::domain::model::Logo;
use logostamp::utils::{logger, validation::Validate};
use logostamp::{App, Bot, CliConfig, JobStore, MediaCompositor};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting logostamp bot");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let wallets = config.wallets();
    if wallets.is_empty() {
        tracing::warn!("no donation wallets configured; /donate will report unavailable");
    }

    let assets_dir = PathBuf::from(&config.assets_dir);
    for logo in [Logo::Forward, Logo::Ford] {
        let path = assets_dir.join(logo.file_name());
        if !path.exists() {
            tracing::warn!(
                "logo asset missing: {} (requests will fall back to {})",
                path.display(),
                Logo::Forward.file_name()
            );
        }
    }

    let tmp_dir = config.tmp_dir();
    std::fs::create_dir_all(&tmp_dir)
        .with_context(|| format!("creating temp dir {}", tmp_dir.display()))?;

    let app = Arc::new(App {
        bot: Bot::new(config.api_base.clone(), config.bot_token.clone()),
        jobs: JobStore::new(),
        compositor: MediaCompositor,
        wallets,
        assets_dir,
        tmp_dir,
    });

    runner::run(app, config.poll_timeout_secs).await?;
    Ok(())
}
