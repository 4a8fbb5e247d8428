use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use oxinbox::application::GatewayAdapter;
use oxinbox::domain::entities::{ChannelId, GuildId};
use oxinbox::infrastructure::{
    AppConfig, CliArgs, Command, DiscordConnector, DiscordRestClient, EnvCredentialSource,
    StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn create_adapter(config: &AppConfig) -> Result<GatewayAdapter> {
    let connector = Arc::new(DiscordConnector::new(DiscordRestClient::new()?));
    let credentials = Arc::new(EnvCredentialSource::new(config.token_env.clone()));

    Ok(GatewayAdapter::new(
        connector,
        credentials,
        config.adapter_settings(),
    ))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn watch(adapter: &GatewayAdapter, interval: Duration, limit: Option<usize>) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                info!("Interrupted, stopping watch");
                break;
            }
            _ = ticker.tick() => {
                for item in adapter.drain_inbox(limit) {
                    println!("{}", serde_json::to_string(&item)?);
                }
            }
        }
    }

    Ok(())
}

async fn execute(adapter: &GatewayAdapter, command: Command) -> Result<()> {
    match command {
        Command::Status => print_json(&adapter.status()),
        Command::Servers => print_json(&adapter.list_servers()?),
        Command::Channels { server } => print_json(&adapter.list_channels(GuildId(server))?),
        Command::Send(send) => {
            let id = adapter
                .send_message(ChannelId(send.channel), &send.content, send.options())
                .await?;
            print_json(&serde_json::json!({ "messageId": id }))
        }
        Command::Read { channel, limit } => {
            print_json(&adapter.read_messages(ChannelId(channel), limit).await?)
        }
        Command::Search {
            channel,
            query,
            limit,
        } => print_json(
            &adapter
                .search_messages(ChannelId(channel), &query, limit)
                .await?,
        ),
        Command::Join { invite } => print_json(&adapter.join_via_invite(&invite).await?),
        Command::Watch { interval, limit } => {
            watch(adapter, Duration::from_secs(interval.max(1)), limit).await
        }
    }
}

async fn run(adapter: &GatewayAdapter, command: Command) -> Result<()> {
    let connected = adapter.connect().await;
    if let Ok(tag) = &connected {
        info!(user = %tag, "Connected");
    }

    match command {
        // Status is reported even when the connection fails.
        Command::Status => {
            if let Err(e) = connected {
                warn!(error = %e, "Connect failed");
            }
            print_json(&adapter.status())
        }
        command => {
            connected?;
            execute(adapter, command).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = oxinbox::VERSION, "Starting oxinbox");

    let adapter = create_adapter(&config)?;
    let result = run(&adapter, args.command).await;
    adapter.disconnect().await;

    result
}
