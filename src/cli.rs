//! Command-line interface definition for Searchlens
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive tabbed session plus one-shot commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Searchlens - chat with web search and image analysis from the terminal
///
/// Talks to a backend exposing `/api/chat` and `/api/analyze-image`.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "searchlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file [default: config/config.yaml]
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL (e.g. http://localhost:5000)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Command to execute (defaults to the interactive UI)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for Searchlens
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive session with the chat and image tabs
    Ui {
        /// Tab to open first (chat, image)
        #[arg(short, long)]
        tab: Option<String>,
    },

    /// Send a single chat message and print the answer with its sources
    Ask {
        /// Message to send
        message: String,
    },

    /// Upload an image with a question and print the analysis
    Analyze {
        /// Path to the image (png, jpg, jpeg, gif, webp)
        #[arg(short, long)]
        image: PathBuf,

        /// Question about the image (defaults to the configured prompt)
        #[arg(short, long)]
        question: Option<String>,
    },

    /// Check that the backend is reachable
    Health,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Configuration file to load, falling back to [`DEFAULT_CONFIG_PATH`]
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, None);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_no_subcommand() {
        let cli = Cli::try_parse_from(["searchlens"]).unwrap();
        assert_eq!(cli.config, None);
        assert_eq!(cli.config_path(), "config/config.yaml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_config_path_override() {
        let cli = Cli::try_parse_from(["searchlens", "--config", "/tmp/searchlens.yaml"]).unwrap();
        assert_eq!(cli.config_path(), "/tmp/searchlens.yaml");
    }

    #[test]
    fn test_cli_parse_ui_with_tab() {
        let cli = Cli::try_parse_from(["searchlens", "ui", "--tab", "image"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Ui {
                tab: Some("image".to_string())
            })
        );
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::try_parse_from(["searchlens", "ask", "Current Bitcoin price"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Ask {
                message: "Current Bitcoin price".to_string()
            })
        );
    }

    #[test]
    fn test_cli_parse_analyze() {
        let cli = Cli::try_parse_from([
            "searchlens",
            "analyze",
            "--image",
            "cat.png",
            "--question",
            "What color is the cat?",
        ])
        .unwrap();
        if let Some(Commands::Analyze { image, question }) = cli.command {
            assert_eq!(image, PathBuf::from("cat.png"));
            assert_eq!(question, Some("What color is the cat?".to_string()));
        } else {
            panic!("Expected Analyze command");
        }
    }

    #[test]
    fn test_cli_parse_analyze_requires_image() {
        let result = Cli::try_parse_from(["searchlens", "analyze"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "searchlens",
            "--base-url",
            "http://backend:5000",
            "--no-color",
            "-v",
            "health",
        ])
        .unwrap();
        assert_eq!(cli.base_url, Some("http://backend:5000".to_string()));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert_eq!(cli.command, Some(Commands::Health));
    }
}
