mod commands;
mod gateway;

use clap::{Parser, Subcommand};
use gateway::{Dispatcher, Gateway};
use std::collections::HashMap;
use std::sync::Arc;
use steamwire_channels::telegram::TelegramChannel;
use steamwire_core::{
    config::{self, BotConfig, Config},
    language::Language,
    ratelimit::RateLimiter,
    traits::Channel,
};
use steamwire_upstream::{
    catalog::CatalogClient, transport::ReqwestTransport, translation::TranslationClient,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(
    name = "steamwire",
    version,
    about = "Steamwire: Steam news, translated, in your chat"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "STEAMWIRE_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and upstream reachability.
    Status,
    /// Fetch and translate news once, printing the reply.
    News {
        /// Game name.
        #[arg(required = true)]
        game: Vec<String>,
        /// Target language code or name.
        #[arg(short, long)]
        lang: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_tracing(&cfg.bot)?;

    let transport = ReqwestTransport::new(&format!(
        "{}/{}",
        cfg.bot.name,
        env!("CARGO_PKG_VERSION")
    ))?;
    let limiter = Arc::new(RateLimiter::new());

    match cli.command {
        Commands::Start => {
            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();

            if let Some(ref tg) = cfg.channel.telegram {
                if tg.enabled {
                    if tg.bot_token.is_empty() {
                        anyhow::bail!(
                            "Telegram is enabled but bot_token is empty. \
                             Set it in config.toml or TELEGRAM_BOT_TOKEN env var."
                        );
                    }
                    let channel = TelegramChannel::new(tg.clone(), transport.client().clone());
                    channels.insert("telegram".to_string(), Arc::new(channel));
                }
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            let dispatcher = build_dispatcher(&cfg, transport, limiter);

            info!(
                "Starting {} | env: {:?} | cooldown: {}s | default language: {}",
                cfg.bot.name,
                cfg.bot.environment,
                cfg.command.cooldown_secs,
                cfg.translation.default_target.code()
            );
            let gw = Arc::new(Gateway::new(channels, Arc::new(dispatcher)));
            gw.run().await?;
        }
        Commands::Status => {
            println!("Steamwire status check\n");
            println!("Config: {}", cli.config);
            println!("Environment: {:?}", cfg.bot.environment);
            println!(
                "Cooldown: {}s | articles per command: {}",
                cfg.command.cooldown_secs, cfg.command.news_count
            );
            println!(
                "Languages: {} (default {})",
                cfg.translation
                    .languages
                    .iter()
                    .map(|l| l.code())
                    .collect::<Vec<_>>()
                    .join(", "),
                cfg.translation.default_target.code()
            );
            println!();

            if let Some(ref tg) = cfg.channel.telegram {
                println!(
                    "  telegram: {}",
                    if tg.enabled && !tg.bot_token.is_empty() {
                        "configured"
                    } else if tg.enabled {
                        "enabled but missing bot_token"
                    } else {
                        "disabled"
                    }
                );
            } else {
                println!("  telegram: not configured");
            }

            let transport = Arc::new(transport);
            let catalog =
                CatalogClient::new(transport.clone(), limiter.clone(), cfg.catalog.clone());
            let translator = TranslationClient::new(transport, limiter, cfg.translation.clone());

            let (catalog_check, translation_check) = futures_util::future::join(
                catalog.search_game("Portal", catalog.timeout()),
                translator.translate(
                    "Hello",
                    Language::French,
                    Some(Language::English),
                    translator.timeout(),
                ),
            )
            .await;
            println!(
                "  steam catalog: {}",
                match catalog_check {
                    Ok(_) => "reachable".to_string(),
                    Err(e) => format!("unreachable ({e})"),
                }
            );
            println!(
                "  translation: {}",
                match translation_check {
                    Ok(_) => "reachable".to_string(),
                    Err(e) => format!("unreachable ({e})"),
                }
            );
        }
        Commands::News { game, lang } => {
            let dispatcher = build_dispatcher(&cfg, transport, limiter);
            let reply = match dispatcher
                .run_news("cli:local", &game.join(" "), lang.as_deref())
                .await
            {
                Ok(delivery) => delivery.text,
                Err(e) => e.user_message(),
            };
            println!("{reply}");
        }
    }

    Ok(())
}

/// Build the news dispatcher over one shared transport and limiter.
fn build_dispatcher(
    cfg: &Config,
    transport: ReqwestTransport,
    limiter: Arc<RateLimiter>,
) -> Dispatcher {
    let transport = Arc::new(transport);
    let catalog = CatalogClient::new(transport.clone(), limiter.clone(), cfg.catalog.clone());
    let translator = TranslationClient::new(transport, limiter.clone(), cfg.translation.clone());
    Dispatcher::new(catalog, translator, limiter, cfg)
}

/// Console logging, plus a daily-rolling file when `log_dir` is set.
///
/// `RUST_LOG` wins over the configured level. The returned guard must live
/// until exit or buffered file lines are lost.
fn init_tracing(bot: &BotConfig) -> anyhow::Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&bot.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if bot.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    }

    let dir = config::shellexpand(&bot.log_dir);
    std::fs::create_dir_all(&dir)?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, "steamwire.log"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}
