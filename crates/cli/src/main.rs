use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "order-intake")]
#[command(about = "Order intake gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the gateway serving POST /api/order. Telegram and spreadsheet settings come from the config file, overridden by TELEGRAM_* and GOOGLE_SCRIPT_* environment variables.
    Gateway {
        /// Config file path (default: ORDER_INTAKE_CONFIG_PATH or ~/.order-intake/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 8888)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print the resolved order settings as JSON, with secrets redacted.
    Config {
        /// Config file path (default: ORDER_INTAKE_CONFIG_PATH or ~/.order-intake/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("order-intake {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Config { config }) => {
            if let Err(e) = show_config(config) {
                log::error!("config failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    lib::gateway::run_gateway(config).await
}

fn show_config(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    let order = lib::config::resolve_order_config(&config);
    let telegram_configured = order.telegram_configured();
    let sheet_configured = order.sheet_configured();
    let out = serde_json::json!({
        "configPath": path.display().to_string(),
        "gateway": { "bind": config.gateway.bind, "port": config.gateway.port },
        "order": order.redacted(),
        "telegramConfigured": telegram_configured,
        "sheetConfigured": sheet_configured,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
