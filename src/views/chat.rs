//! Chat view
//!
//! Owns the transcript, the input buffer and the Idle/Awaiting state. A
//! request failure never escapes this view: it is appended to the
//! transcript as an assistant message and the view returns to Idle.

use crate::api::{ApiError, Backend, ChatReply, Source};
use crate::views::{hyperlink, terminal_safe};

use chrono::{DateTime, Local};
use colored::Colorize;
use std::fmt;
use std::sync::Arc;

/// Example questions shown while the transcript is empty
const WELCOME_EXAMPLES: &[&str] = &[
    "What are the latest news in AI?",
    "Weather in Paris today",
    "Current Bitcoin price",
];

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Typed by the user
    User,
    /// Returned by the backend (or a recovered error)
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "You"),
            Self::Assistant => write!(f, "Assistant"),
        }
    }
}

/// A transcript entry
///
/// Fields are private so entries cannot change once appended, and only
/// [`Message::assistant`] can attach sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    text: String,
    sources: Vec<Source>,
    search_query: Option<String>,
    sent_at: DateTime<Local>,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: Vec::new(),
            search_query: None,
            sent_at: Local::now(),
        }
    }

    /// Create an assistant message with its citations
    pub fn assistant(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources,
            search_query: None,
            sent_at: Local::now(),
        }
    }

    fn from_reply(reply: ChatReply) -> Self {
        let search_query = reply.search_query_used.filter(|_| reply.web_search_performed);
        Self {
            search_query,
            ..Self::assistant(reply.response, reply.sources)
        }
    }

    /// Who wrote the message
    pub fn role(&self) -> Role {
        self.role
    }

    /// Message text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Citations (always empty for user messages)
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Web search query reported by the backend, if it searched
    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    /// Local time the message was appended
    pub fn sent_at(&self) -> DateTime<Local> {
        self.sent_at
    }

    /// Render the entry, with its search query and sources
    ///
    /// Message text, the query and sources pass through [`terminal_safe`].
    pub fn render(&self) -> String {
        let time = self.sent_at.format("%H:%M").to_string();
        let author = match self.role {
            Role::User => self.role.to_string().green().bold(),
            Role::Assistant => self.role.to_string().blue().bold(),
        };
        let mut out = format!("{} {}: {}", time.dimmed(), author, terminal_safe(&self.text));

        if let Some(query) = &self.search_query {
            let searched = format!("🔎 Searched: {}", terminal_safe(query));
            out.push_str(&format!("\n  {}", searched.dimmed()));
        }

        if !self.sources.is_empty() {
            out.push_str("\n  📚 Sources:");
            for source in &self.sources {
                out.push_str(&format!("\n    - {}", hyperlink(&source.title, &source.url)));
            }
        }
        out
    }
}

/// Transient placeholder shown while a reply is pending
pub fn typing_indicator() -> String {
    format!(
        "{}: {}",
        Role::Assistant.to_string().blue().bold(),
        "• • •".dimmed()
    )
}

/// Request state of the chat view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    /// Accepting input
    #[default]
    Idle,
    /// A request is in flight; input is disabled
    Awaiting,
}

/// A keystroke delivered to the input control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// Enter, with the Shift modifier state
    Enter {
        /// Whether Shift was held
        shift: bool,
    },
    /// A printable character
    Char(char),
    /// Delete the last character
    Backspace,
}

/// What a keystroke did
pub enum KeyOutcome {
    /// The input buffer changed
    Edited,
    /// The keystroke started a request
    Submitted(PendingChat),
    /// Nothing happened (busy, or Enter on blank input)
    Ignored,
}

/// A chat request that has been started but not yet sent
pub struct PendingChat {
    backend: Arc<dyn Backend>,
    message: String,
}

impl PendingChat {
    /// Text that will be sent
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Perform the request
    pub async fn send(self) -> Result<ChatReply, ApiError> {
        self.backend.chat(&self.message).await
    }
}

/// Chat view state
pub struct ChatView {
    backend: Arc<dyn Backend>,
    transcript: Vec<Message>,
    state: ChatState,
    input: String,
}

impl ChatView {
    /// Create an empty chat view
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            transcript: Vec::new(),
            state: ChatState::Idle,
            input: String::new(),
        }
    }

    /// Entries in insertion order
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Current request state
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Whether a request is in flight
    pub fn is_busy(&self) -> bool {
        self.state == ChatState::Awaiting
    }

    /// Current input buffer
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the send trigger is enabled
    pub fn can_send(&self) -> bool {
        !self.is_busy() && !self.input.trim().is_empty()
    }

    /// Apply a keystroke to the input control
    ///
    /// Enter without Shift submits the buffer and never inserts a newline;
    /// Shift+Enter inserts one. Editing is ignored while Awaiting.
    pub fn handle_key(&mut self, key: KeyPress) -> KeyOutcome {
        if self.is_busy() {
            return KeyOutcome::Ignored;
        }

        match key {
            KeyPress::Enter { shift: false } => {
                let text = self.input.clone();
                match self.begin_submit(&text) {
                    Some(pending) => KeyOutcome::Submitted(pending),
                    None => KeyOutcome::Ignored,
                }
            }
            KeyPress::Enter { shift: true } => {
                self.input.push('\n');
                KeyOutcome::Edited
            }
            KeyPress::Char(c) => {
                self.input.push(c);
                KeyOutcome::Edited
            }
            KeyPress::Backspace => {
                if self.input.pop().is_some() {
                    KeyOutcome::Edited
                } else {
                    KeyOutcome::Ignored
                }
            }
        }
    }

    /// Start a submission
    ///
    /// Returns `None` without touching any state when `text` is blank or a
    /// request is already in flight. Otherwise appends the user message,
    /// clears the input buffer, enters Awaiting and returns the request to
    /// send.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingChat> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank chat submission");
            return None;
        }
        if self.is_busy() {
            tracing::debug!("Ignoring chat submission while a request is in flight");
            return None;
        }

        self.transcript.push(Message::user(text));
        self.state = ChatState::Awaiting;
        self.input.clear();

        Some(PendingChat {
            backend: Arc::clone(&self.backend),
            message: text.to_string(),
        })
    }

    /// Apply the outcome of the in-flight request and return to Idle
    pub fn finish(&mut self, outcome: Result<ChatReply, ApiError>) {
        if !self.is_busy() {
            tracing::warn!("Dropping chat outcome with no request in flight");
            return;
        }

        let message = match outcome {
            Ok(reply) => Message::from_reply(reply),
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                Message::assistant(format!("Error: {}", e), Vec::new())
            }
        };
        self.transcript.push(message);
        self.state = ChatState::Idle;
    }

    /// Submit `text` and wait for the reply
    ///
    /// Returns whether a request was issued.
    pub async fn submit(&mut self, text: &str) -> bool {
        let Some(pending) = self.begin_submit(text) else {
            return false;
        };
        let outcome = pending.send().await;
        self.finish(outcome);
        true
    }

    /// Submit the current input buffer and wait for the reply
    pub async fn submit_input(&mut self) -> bool {
        let text = self.input.clone();
        self.submit(&text).await
    }

    /// Render the header, transcript and typing indicator
    pub fn render(&self) -> String {
        let mut out = vec![
            "🤖 Chatbot with Web Search".bold().to_string(),
            "Ask your questions, I search the Internet for you!"
                .dimmed()
                .to_string(),
            String::new(),
        ];

        if self.transcript.is_empty() {
            out.push("👋 Hello! Try asking:".to_string());
            for example in WELCOME_EXAMPLES {
                out.push(format!("  • \"{}\"", example));
            }
        }

        for message in &self.transcript {
            out.push(message.render());
        }

        if self.is_busy() {
            out.push(typing_indicator());
        }

        out.join("\n")
    }
}
