//! Interactive session driver
//!
//! Routes one line of user input to the active view and writes what the
//! user should see. Output goes through a `Write` so the interactive loop
//! can print to stdout while tests capture it.

use crate::api::Backend;
use crate::commands::special_commands::{
    help_text, parse_special_command, CommandError, SpecialCommand,
};
use crate::image_file::ImageFile;
use crate::views::chat::typing_indicator;
use crate::views::{terminal_safe, App, KeyOutcome, KeyPress, Tab};

use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Whether the session keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Leave the session
    Exit,
}

/// State of one interactive session
pub struct Session {
    app: App,
    backend: Arc<dyn Backend>,
    max_image_bytes: u64,
}

impl Session {
    /// Create a session with `initial` as the open tab
    pub fn new(
        backend: Arc<dyn Backend>,
        initial: Tab,
        default_question: &str,
        max_image_bytes: u64,
    ) -> Self {
        Self {
            app: App::new(Arc::clone(&backend), initial, default_question),
            backend,
            max_image_bytes,
        }
    }

    /// The application shell
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Handle one line of input
    ///
    /// On the chat tab every line that is not a known `/command` is sent as
    /// a message, including unknown `/words` and a bare `exit` or `quit`.
    ///
    /// # Errors
    ///
    /// Returns error only if writing to `out` fails; backend and file
    /// failures are reported to the user and the session continues.
    pub async fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> anyhow::Result<Flow> {
        let on_chat = self.app.active_tab() == Tab::Chat;
        let command = match parse_special_command(line) {
            Ok(SpecialCommand::Exit) if on_chat && !line.trim_start().starts_with('/') => {
                SpecialCommand::None
            }
            Ok(command) => command,
            Err(CommandError::UnknownCommand(_)) if on_chat => SpecialCommand::None,
            Err(e) => {
                writeln!(out, "{}\n", e.to_string().red())?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            SpecialCommand::Exit => return Ok(Flow::Exit),
            SpecialCommand::Help => writeln!(out, "{}", help_text())?,
            SpecialCommand::Show => writeln!(out, "{}\n", self.app.render())?,
            SpecialCommand::SwitchTab(tab) => {
                if self.app.select_tab(tab) {
                    writeln!(out, "{}\n", self.app.render())?;
                } else {
                    writeln!(out, "Already on the {} tab\n", tab)?;
                }
            }
            SpecialCommand::Health => match self.backend.health().await {
                Ok(reply) => writeln!(
                    out,
                    "{} Backend status: {}\n",
                    "✔".green(),
                    terminal_safe(&reply.status)
                )?,
                Err(e) => writeln!(out, "{}\n", format!("Backend unreachable: {}", e).red())?,
            },
            SpecialCommand::SelectFile(path) => self.select_file(&path, out).await?,
            SpecialCommand::SetQuestion(question) => self.set_question(question, out)?,
            SpecialCommand::Analyze => self.analyze(out).await?,
            SpecialCommand::Clear => match self.app.image_mut() {
                Some(image) => {
                    image.clear();
                    writeln!(out, "{}\n", image.render())?;
                }
                None => write_image_tab_hint(out)?,
            },
            SpecialCommand::Literal(text) => self.plain_text(&text, out).await?,
            SpecialCommand::None => self.plain_text(line, out).await?,
        }

        Ok(Flow::Continue)
    }

    async fn plain_text(&mut self, text: &str, out: &mut dyn Write) -> anyhow::Result<()> {
        match self.app.active_tab() {
            Tab::Chat => self.send_chat(text, out).await,
            Tab::Image => self.set_question(text.to_string(), out),
        }
    }

    async fn send_chat(&mut self, line: &str, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(chat) = self.app.chat_mut() else {
            return Ok(());
        };

        chat.set_input(line);
        let pending = match chat.handle_key(KeyPress::Enter { shift: false }) {
            KeyOutcome::Submitted(pending) => pending,
            KeyOutcome::Edited | KeyOutcome::Ignored => return Ok(()),
        };

        writeln!(out, "{}", typing_indicator())?;
        out.flush()?;

        let outcome = pending.send().await;
        chat.finish(outcome);

        if let Some(reply) = chat.transcript().last() {
            writeln!(out, "{}\n", reply.render())?;
        }
        Ok(())
    }

    async fn select_file(&mut self, path: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
        let max_bytes = self.max_image_bytes;
        let Some(image) = self.app.image_mut() else {
            return write_image_tab_hint(out);
        };

        match ImageFile::load(path, max_bytes).await {
            Ok(file) => {
                image.select_file_and_preview(file).await;
                writeln!(out, "{}\n", image.render())?;
            }
            Err(e) => {
                tracing::warn!("Failed to load image {}: {}", path.display(), e);
                writeln!(out, "{}\n", format!("Could not load {}: {}", path.display(), e).red())?;
            }
        }
        Ok(())
    }

    fn set_question(&mut self, question: String, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(image) = self.app.image_mut() else {
            return write_image_tab_hint(out);
        };
        image.set_question(question);
        writeln!(out, "Question: {}\n", image.session().question())?;
        Ok(())
    }

    async fn analyze(&mut self, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some(image) = self.app.image_mut() else {
            return write_image_tab_hint(out);
        };

        let Some(pending) = image.begin_analyze() else {
            writeln!(out, "{}\n", "Select an image first with /file <path>".yellow())?;
            return Ok(());
        };

        writeln!(out, "🔄 Analysing {}...", pending.file().name())?;
        out.flush()?;

        let outcome = pending.send().await;
        image.finish_analysis(outcome);
        writeln!(out, "{}\n", image.render())?;
        Ok(())
    }
}

fn write_image_tab_hint(out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(
        out,
        "{}\n",
        "This command works on the image tab; switch with /image".yellow()
    )?;
    Ok(())
}
