use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use stackrelay_core_sdk::prelude::*;

/// Serve the relay, or run a single chat turn from the terminal.
#[derive(Parser, Debug)]
#[command(name = "stackrelay", version, about = "Laravel assistant chat relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP relay.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: String,
    },

    /// Send one message through a provider and print the reply.
    Ask {
        /// Provider to call: hugging-face or cohere
        #[arg(long, default_value = "hugging-face")]
        provider: ProviderKind,
        #[arg(long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = RelayConfig::from_env().context("load configuration failed")?;
    telemetry::init(&config.telemetry).context("init telemetry failed")?;
    let relay = ChatRelay::new(config).context("build http client failed")?;

    match cli.command {
        Commands::Serve { addr } => {
            info!(
                hugging_face_model = %relay.config().hugging_face.model,
                cohere_model = %relay.config().cohere.model,
                "starting relay"
            );
            server::run(&addr, relay).await?;
        }
        Commands::Ask { provider, message } => {
            let outcome = match ChatRequest::from_json(&json!({ "message": message })) {
                Ok(request) => relay.chat(provider, request).await,
                Err(errors) => Err(ChatError::from(errors)),
            };
            match outcome {
                Ok(result) => println!("{}", result.message),
                Err(err) => {
                    eprintln!("{}", serde_json::to_string_pretty(&err.body())?);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
