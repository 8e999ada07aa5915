//! Searchlens - terminal client for a web-search chat backend and an
//! image-analysis backend
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: wire types, request error taxonomy and the `Backend` trait with
//!   its HTTP implementation
//! - `views`: tab selector, chat view and image view state machines
//! - `image_file`: image loading, format detection and previews
//! - `commands`: CLI command handlers and the interactive session
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use searchlens::api::create_backend;
//! use searchlens::views::ChatView;
//! use searchlens::Config;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let mut chat = ChatView::new(create_backend(&config.backend)?);
//!     chat.submit("Current Bitcoin price").await;
//!     for message in chat.transcript() {
//!         println!("{}", message.render());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod image_file;
pub mod views;

// Re-export commonly used types
pub use api::{ApiError, Backend, HttpBackend};
pub use config::Config;
pub use error::{Result, SearchlensError};
pub use views::{App, ChatView, ImageView, Tab};

#[cfg(test)]
pub mod test_utils;
