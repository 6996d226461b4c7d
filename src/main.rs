use anyhow::Result;
use clap::Parser;
use together_studio::app::{App, Mode};
use together_studio::models::Config;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "together-studio")]
#[command(about = "Generate text and images with Together AI")]
struct CliArgs {
    /// Mode: 1 = text, 2 = image, 3 = text and image, 4 = interactive chat.
    #[arg(short = 'o', long = "option", default_value_t = 1)]
    option: i64,

    /// Together API key (falls back to TOGETHER_API_KEY).
    #[arg(short = 'k', long = "api-key", alias = "api_key")]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "together_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let Some(mode) = Mode::from_option(args.option) else {
        println!("Invalid option");
        return Ok(());
    };

    let config = match Config::from_env(args.api_key) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize app: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match app.run(mode, stdin, &mut stdout).await {
        Ok(()) => {
            info!("Option {} completed successfully", mode.option());
            Ok(())
        }
        Err(e) => {
            error!("Option {} failed ({:?}): {}", mode.option(), e.kind(), e);
            std::process::exit(1);
        }
    }
}
