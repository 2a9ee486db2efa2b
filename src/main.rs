//! Relay bot — process entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Init logger once (CLI `-v` flags > RUST_LOG > env/config level)
//!   5. Build the completion provider
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Start comms channels and wait for them to exit

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use relay_bot::config;
use relay_bot::error::AppError;
use relay_bot::llm::providers;
use relay_bot::logger;
use relay_bot::subsystems::comms;
use relay_bot::subsystems::handlers::{RelayState, Router};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        bot_name = %config.bot_name,
        provider = %config.llm.provider,
        telegram = config.comms_telegram_should_load(),
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let provider = providers::build(&config.llm, config.llm_api_key.clone())?;
    info!(provider = provider.name(), "completion provider ready");

    let state = Arc::new(RelayState::new(provider));
    let router = Arc::new(Router::default());

    // Shared shutdown token — Ctrl-C cancels it, all channels watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let handle = comms::start(&config, state, router, shutdown)?;
    handle.join().await?;

    info!("shutdown complete");
    Ok(())
}

// ── CLI ───────────────────────────────────────────────────────────────────────

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: relay-bot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: {})", config::DEFAULT_CONFIG_PATH);
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                println!();
                println!("Environment:");
                println!("  {:<26} Telegram bot token (required)", config::TELEGRAM_TOKEN_ENV);
                println!("  {:<26} Completion API key (required for the openai provider)", config::LLM_API_KEY_ENV);
                println!("  {:<26} Log level override", config::LOG_LEVEL_ENV);
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a => {
                if let Some(count) = short_verbosity(a) {
                    verbosity = verbosity.saturating_add(count);
                }
            }
        }
    }

    CliArgs { log_level: logger::level_for_verbosity(verbosity), config_path }
}

/// `-vvv` → `Some(3)`; anything that is not a run of `v`s → `None`.
fn short_verbosity(arg: &str) -> Option<u8> {
    let vs = arg.strip_prefix('-')?;
    if vs.is_empty() || !vs.chars().all(|c| c == 'v') {
        return None;
    }
    Some(u8::try_from(vs.len()).unwrap_or(u8::MAX))
}
