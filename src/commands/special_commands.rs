//! Special commands parser for the interactive session
//!
//! Commands are prefixed with `/`. The command word is case-insensitive;
//! arguments (paths, questions) keep their case. A leading `//` escapes
//! the slash so the rest of the line is taken as text.

use crate::views::Tab;
use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands handled by the session instead of being sent as chat text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Activate a tab
    SwitchTab(Tab),

    /// Load an image from disk into the image view
    SelectFile(PathBuf),

    /// Replace the image question
    SetQuestion(String),

    /// Analyze the selected image
    Analyze,

    /// Reset the image view
    Clear,

    /// Re-render the active view
    Show,

    /// Query backend health
    Health,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// `//`-escaped text for the active view, with the escaping slash removed
    Literal(String),

    /// Not a special command; the input is plain text for the active view
    None,
}

/// Parse user input into a special command
///
/// # Examples
///
/// ```
/// use searchlens::commands::special_commands::{parse_special_command, SpecialCommand};
/// use searchlens::views::Tab;
///
/// assert_eq!(parse_special_command("/image").unwrap(), SpecialCommand::SwitchTab(Tab::Image));
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    if trimmed.starts_with("//") {
        return Ok(SpecialCommand::Literal(input.replacen('/', "", 1)));
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/chat" => Ok(SpecialCommand::SwitchTab(Tab::Chat)),
        "/image" => Ok(SpecialCommand::SwitchTab(Tab::Image)),
        "/tab" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/tab".to_string(),
            usage: "/tab <chat|image>".to_string(),
        }),
        "/tab" => Tab::parse_str(arg)
            .map(SpecialCommand::SwitchTab)
            .map_err(|_| CommandError::UnsupportedArgument {
                command: "/tab".to_string(),
                arg: arg.to_string(),
            }),

        "/file" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/file".to_string(),
            usage: "/file <path>".to_string(),
        }),
        "/file" => Ok(SpecialCommand::SelectFile(PathBuf::from(unquote(arg)))),

        "/question" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/question".to_string(),
            usage: "/question <text>".to_string(),
        }),
        "/question" => Ok(SpecialCommand::SetQuestion(raw_argument(input).to_string())),

        "/analyze" | "/analyse" => Ok(SpecialCommand::Analyze),
        "/clear" => Ok(SpecialCommand::Clear),
        "/show" => Ok(SpecialCommand::Show),
        "/health" => Ok(SpecialCommand::Health),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Everything after the command word, exactly as typed
fn raw_argument(input: &str) -> &str {
    input
        .trim_start()
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest)
        .unwrap_or("")
}

fn unquote(arg: &str) -> &str {
    arg.strip_prefix('"')
        .and_then(|a| a.strip_suffix('"'))
        .or_else(|| arg.strip_prefix('\'').and_then(|a| a.strip_suffix('\'')))
        .unwrap_or(arg)
}

/// Help text for the interactive session
pub fn help_text() -> String {
    let rows = [
        ("/chat, /image", "Switch tab (the new tab starts fresh)"),
        ("/tab <chat|image>", "Same as above"),
        ("/file <path>", "Select an image (png, jpg, jpeg, gif, webp)"),
        ("/question <text>", "Set the question about the image"),
        ("/analyze", "Send the image and question for analysis"),
        ("/clear", "Reset image, preview, question and result"),
        ("/show", "Redraw the current tab"),
        ("/health", "Check that the backend is up"),
        ("/help", "Show this help"),
        ("/exit", "Leave the session (exit/quit also work on the image tab)"),
    ];

    let mut out = format!("{}\n", "Commands".bold());
    for (command, description) in rows {
        out.push_str(&format!("  {:<20} {}\n", command.cyan(), description));
    }
    out.push_str(&format!(
        "\n{}\n  Chat tab: plain text is sent as a message, including unknown /words.\n  Image tab: plain text replaces the question.\n  Start a line with // to send text beginning with /.\n  Alt+Enter (or Shift+Enter where supported) inserts a newline.\n",
        "Input".bold()
    ));
    out
}
