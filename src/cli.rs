use crate::chat::{failure_message, GeminiClient};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

/// A themed terminal hub of data cores with ambient effects and an AI chat console
#[derive(Parser, Debug)]
#[command(name = "neurostream", version, long_about = None)]
pub struct Cli {
    /// Use a config file other than ~/.config/neurostream/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Start on the hub without the activation splash
    #[arg(long)]
    pub skip_splash: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one query to the AI core and print the answer
    Ask {
        /// Query text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Print the config path and the effective configuration
    Config,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::utils::get_config_path)
    }

    /// Run a subcommand. Returns false when the TUI should start instead.
    pub fn execute(&self) -> Result<bool> {
        match &self.command {
            Some(Commands::Ask { query }) => {
                Self::cmd_ask(&self.config_path(), &query.join(" "))?;
                Ok(true)
            }
            Some(Commands::Config) => {
                Self::cmd_config(&self.config_path())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn cmd_ask(config_path: &Path, query: &str) -> Result<()> {
        let config =
            Config::load_or_create(config_path).context("Failed to load configuration")?;
        let query = query.trim();
        if query.is_empty() {
            anyhow::bail!("Query is empty");
        }

        let client = GeminiClient::new(config.client_settings())
            .context("Failed to create chat client")?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;

        match runtime.block_on(client.complete(query)) {
            Ok(text) => {
                println!("{text}");
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", failure_message(&e));
                std::process::exit(1);
            }
        }
    }

    fn cmd_config(config_path: &Path) -> Result<()> {
        let mut config =
            Config::load_or_create(config_path).context("Failed to load configuration")?;
        if config.chat.api_key.is_some() {
            config.chat.api_key = Some("********".to_string());
        }

        println!("# {}", config_path.display());
        print!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to serialize config")?
        );
        if config.api_key().is_none() {
            println!(
                "\n# No API key set. Add chat.api_key or export {}.",
                crate::config::API_KEY_ENV
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_starts_tui() {
        let cli = Cli::try_parse_from(["neurostream", "--skip-splash"]).unwrap();
        assert!(cli.skip_splash);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["neurostream", "ask", "status", "of", "the", "core"]).unwrap();
        match cli.command {
            Some(Commands::Ask { query }) => assert_eq!(query.join(" "), "status of the core"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_override() {
        let cli = Cli::try_parse_from(["neurostream", "config", "--config", "/tmp/n.toml"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/n.toml"));
    }

    #[test]
    fn test_ask_requires_query() {
        assert!(Cli::try_parse_from(["neurostream", "ask"]).is_err());
    }
}
