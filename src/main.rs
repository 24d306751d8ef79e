use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;

use tubetag::cli::{Cli, Commands};
use tubetag::core::{init_logger, log_cookies_configuration, Config};
use tubetag::download::extractor::log_ytdlp_version;
use tubetag::download::{DirectorySink, Pipeline, RequestOutcome};
use tubetag::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, RequestSupervisor};

/// Attempts to reach the Bot API at startup before giving up
const STARTUP_MAX_RETRIES: u32 = 12;

/// Main entry point
///
/// Parses CLI arguments and dispatches to the bot or the one-shot downloader.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Panics inside spawned requests are logged instead of only going to stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::from_env()?.into_shared();
    init_logger(&config.log_file)?;
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Some(Commands::Download { query, output }) => run_download(config, query, output).await,
        Some(Commands::Run) => run_bot(config).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(config).await
        }
    }
}

async fn run_bot(config: Arc<Config>) -> Result<()> {
    log::info!("Starting bot...");
    log_cookies_configuration(&config);
    log_ytdlp_version(&config.ytdl_bin).await;

    let bot = create_bot(&config)?;

    let mut startup_retry = 0;
    let me = loop {
        match bot.get_me().await {
            Ok(me) => break me,
            Err(e) => {
                startup_retry += 1;
                if startup_retry >= STARTUP_MAX_RETRIES {
                    return Err(anyhow::anyhow!(
                        "Failed to connect to Bot API after {} retries: {}",
                        startup_retry,
                        e
                    ));
                }
                log::warn!(
                    "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                    startup_retry,
                    STARTUP_MAX_RETRIES,
                    e
                );
                sleep(Duration::from_secs(5)).await;
            }
        }
    };
    log::info!("Bot username: {:?}, Bot ID: {}", me.username, me.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let pipeline = Pipeline::from_config(&config).await?;
    let supervisor = Arc::new(RequestSupervisor::new(pipeline, config.max_concurrent_requests));
    log::info!("Accepting up to {} concurrent request(s)", config.max_concurrent_requests);

    let handler = schema(HandlerDeps::new(Arc::clone(&supervisor)));
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    supervisor.shutdown().await;
    Ok(())
}

async fn run_download(config: Arc<Config>, query: String, output: PathBuf) -> Result<()> {
    log_cookies_configuration(&config);
    log_ytdlp_version(&config.ytdl_bin).await;

    let pipeline = Pipeline::from_config(&config).await?;
    let sink = DirectorySink::new(output);

    match pipeline.process(&query, &sink).await {
        RequestOutcome::Completed { delivered, failed } => {
            println!("✅ {} file(s) saved to {}, {} failed", delivered, sink.output_dir().display(), failed);
            Ok(())
        }
        RequestOutcome::NotFound => Err(anyhow::anyhow!("nothing was downloaded for {}", query)),
        RequestOutcome::Failed { message, .. } => Err(anyhow::anyhow!("download failed: {}", message)),
    }
}
