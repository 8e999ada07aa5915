//! Command handlers for Searchlens
//!
//! Each CLI subcommand has a handler here. The interactive UI delegates
//! per-line handling to [`session::Session`].

use crate::api::create_backend;
use crate::config::Config;
use crate::error::{Result, SearchlensError};
use crate::views::{terminal_safe, Tab};

pub mod session;
pub mod special_commands;

// Interactive UI handler
pub mod ui {
    //! Interactive tabbed session.
    //!
    //! Builds the backend from configuration, opens the requested tab and
    //! runs a readline loop feeding each line to the session.

    use super::*;
    use crate::commands::session::{Flow, Session};
    use rustyline::error::ReadlineError;
    use rustyline::{Cmd, DefaultEditor, KeyCode, KeyEvent, Modifiers};

    /// Start the interactive session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `tab` - Optional tab name overriding `ui.default_tab`
    ///
    /// # Errors
    ///
    /// Returns error if the tab name is unknown, the backend client cannot
    /// be built, or the terminal cannot be initialized
    pub async fn run_ui(config: Config, tab: Option<String>) -> Result<()> {
        let initial = match tab.as_deref() {
            Some(name) => Tab::parse_str(name).map_err(SearchlensError::Session)?,
            None => config.ui.default_tab,
        };
        tracing::info!(
            "Starting interactive session on the {} tab against {}",
            initial,
            config.backend.base_url
        );

        let backend = create_backend(&config.backend)?;
        let mut session = Session::new(
            backend,
            initial,
            &config.ui.default_question,
            config.ui.max_image_bytes,
        );

        let mut rl = DefaultEditor::new()?;
        // Enter submits; these insert a newline instead
        rl.bind_sequence(KeyEvent(KeyCode::Enter, Modifiers::ALT), Cmd::Newline);
        rl.bind_sequence(KeyEvent(KeyCode::Enter, Modifiers::SHIFT), Cmd::Newline);

        let mut stdout = std::io::stdout();
        println!("{}\n", session.app().render());
        println!("Type /help for commands.\n");

        loop {
            let prompt = format!("[{}] >> ", session.app().active_tab());
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;

                    if session.handle_line(&line, &mut stdout).await? == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }
}

// One-shot chat handler
pub mod ask {
    //! Single chat turn through the chat view.

    use super::*;
    use crate::views::ChatView;

    /// Send one message and print the reply
    ///
    /// Backend failures are printed as the reply, the same way the
    /// interactive view shows them.
    ///
    /// # Errors
    ///
    /// Returns error if the message is blank or the backend client cannot
    /// be built
    pub async fn run_ask(config: Config, message: String) -> Result<()> {
        let backend = create_backend(&config.backend)?;
        let mut chat = ChatView::new(backend);

        if !chat.submit(&message).await {
            return Err(SearchlensError::Session("Message is empty".to_string()).into());
        }

        if let Some(reply) = chat.transcript().last() {
            println!("{}", reply.render());
        }
        Ok(())
    }
}

// One-shot image analysis handler
pub mod analyze {
    //! Single image analysis through the image view.

    use super::*;
    use crate::image_file::ImageFile;
    use crate::views::ImageView;
    use std::path::Path;

    /// Analyze one image and print the result
    ///
    /// # Errors
    ///
    /// Returns error if the image cannot be loaded or the backend client
    /// cannot be built
    pub async fn run_analyze(config: Config, image: &Path, question: Option<String>) -> Result<()> {
        let file = ImageFile::load(image, config.ui.max_image_bytes).await?;

        let backend = create_backend(&config.backend)?;
        let mut view = ImageView::with_default_question(backend, config.ui.default_question);
        view.select_file_and_preview(file).await;
        if let Some(question) = question {
            view.set_question(question);
        }

        tracing::info!(
            "Analyzing {} with question: {}",
            image.display(),
            view.session().question()
        );
        view.analyze().await;
        println!("{}", terminal_safe(view.session().analysis()));
        Ok(())
    }
}

// Backend health handler
pub mod health {
    //! Backend health check.

    use super::*;

    /// Query `/api/health` and print the status
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or unhealthy
    pub async fn run_health(config: Config) -> Result<()> {
        let backend = create_backend(&config.backend)?;
        let reply = backend.health().await.map_err(|e| {
            SearchlensError::Backend(format!(
                "Health check against {} failed: {}",
                config.backend.base_url, e
            ))
        })?;

        let status = terminal_safe(&reply.status);
        println!("{}: {}", config.backend.base_url, status);
        if reply.status != "OK" {
            return Err(SearchlensError::Backend(format!(
                "Backend reported status {}",
                status
            ))
            .into());
        }
        Ok(())
    }
}
