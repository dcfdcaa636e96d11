use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

mod domain;
mod application;
mod infrastructure;

use application::errors::AppError;
use application::services::{RunContext, RunService, RunSummary};
use domain::traits::{Notifier, Store};
use infrastructure::adapters::{ConsoleNotifier, TelegramNotifier};
use infrastructure::config::Config;
use infrastructure::database::Database;
use infrastructure::monitoring;
use infrastructure::tgtg::TgtgClient;

#[derive(Parser)]
#[command(name = "tgtg-notifier")]
#[command(about = "Notify users when their Too Good To Go favorites are back in stock", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,

    /// Re-login given e-mail address even if a token is stored (repeatable)
    #[arg(short, long, value_name = "EMAIL", global = true)]
    login: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll every user's favorites once (default)
    Run,
    /// Register a user to watch
    AddUser {
        #[arg(long)]
        email: String,
        /// Telegram chat receiving the notifications
        #[arg(long)]
        telegram_chat_id: Option<String>,
    },
    /// Print the default config
    InitConfig,
    /// Show version
    Version,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let _sentry = monitoring::init_sentry(&config.sentry);
            block_on(run_once(&config, cli.login)).map(|summary| {
                tracing::info!(
                    "Run complete: {} users, {} skipped, {} notifications",
                    summary.users,
                    summary.skipped,
                    summary.notifications
                );
            })
            .inspect_err(|e| monitoring::report_error(e))
        }
        Commands::AddUser { email, telegram_chat_id } => {
            block_on(add_user(&config, &email, telegram_chat_id.as_deref()))
        }
        Commands::InitConfig => init_config(),
        Commands::Version => {
            println!("tgtg-notifier v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

// Users and stores are processed one at a time, a single thread is enough.
fn block_on<T, F: std::future::Future<Output = Result<T, AppError>>>(future: F) -> Result<T, AppError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(future)
}

async fn run_once(config: &Config, force_login: Vec<String>) -> Result<RunSummary, AppError> {
    let context = RunContext::new(chrono::Utc::now(), config.timezone()?);
    tracing::info!("Starting run at {} ({})", context.now, context.tz);

    let store = Arc::new(Database::new(&config.database.path)?);
    let marketplace = Arc::new(TgtgClient::new(config.marketplace.clone())?);
    let notifier: Arc<dyn Notifier> = match config.telegram_token() {
        Some(token) => Arc::new(TelegramNotifier::new(token)),
        None => {
            tracing::warn!("No Telegram token configured, notifications go to the log");
            Arc::new(ConsoleNotifier::new())
        }
    };

    let service = RunService::new(store, marketplace, notifier).with_force_login(force_login);
    Ok(service.run(&context).await?)
}

async fn add_user(config: &Config, email: &str, telegram_chat_id: Option<&str>) -> Result<(), AppError> {
    let db = Database::new(&config.database.path)?;
    db.add_user(email, telegram_chat_id).await?;
    let user = db.get_user(email)?;
    tracing::info!(
        "User {} registered (chat: {}), the next run will sign in",
        user.email,
        user.telegram_chat_id.as_deref().unwrap_or("none")
    );
    Ok(())
}

fn init_config() -> Result<(), AppError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
