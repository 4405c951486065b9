//! SpaceRoom chat - terminal client for SpaceRoom conversations
//!
//! Replays recorded push events or follows a live push channel and prints
//! the reconciled transcript after every event.

use std::path::Path;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spaceroom_core::{Config, UserId};
use spaceroom_net::PushClient;

mod cli;
mod render;
mod runner;
mod view;

use cli::{conversation_kind, exit_code, Cli, Command};
use view::ChatView;

/// Config stored at `path`, or the defaults when no config location is known
fn load_config(path: Option<&Path>) -> spaceroom_core::Result<Config> {
    match path {
        Some(path) => Config::load_or_default(path),
        None => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_code(&e));
        }
    };

    let config_path = Config::default_path();
    let config = load_config(config_path.as_deref().ok());

    // RUST_LOG wins over the configured filter
    let default_filter = config
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|_| "info".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = &config_path {
        tracing::warn!(error = %e, "Using default config");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting SpaceRoom chat");

    let result = match cli.command {
        Command::Replay {
            path,
            conversation,
            user,
            direct,
        } => {
            let user_id = UserId::new(user.unwrap_or_default());
            let mut view = ChatView::new(&conversation, conversation_kind(direct), user_id, &config);
            let mut stdout = std::io::stdout();
            runner::replay(&path, &mut view, &mut stdout)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
        Command::Connect {
            addr,
            conversation,
            user,
            direct,
        } => {
            let user_id = UserId::new(user);
            match PushClient::connect(addr, conversation.as_str(), user_id.clone()).await {
                Ok(client) => {
                    let mut view =
                        ChatView::new(&conversation, conversation_kind(direct), user_id, &config);
                    runner::follow(client, &mut view)
                        .await
                        .map_err(|e| e.to_string())
                }
                Err(e) => Err(e.to_string()),
            }
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_config_location_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), Config::default());
    }

    #[test]
    fn test_config_file_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("spaceroom.toml");
        fs::write(&path, "[logging]\nfilter = \"debug\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.session, Config::default().session);
    }
}
