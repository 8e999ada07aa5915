//! View state machines for Searchlens
//!
//! - `tabs`: the tab selector and the shell that owns the active view
//! - `chat`: transcript, input buffer and Idle/Awaiting state
//! - `image`: selected image, preview, question and analysis result
//!
//! Each view splits a request into a synchronous `begin_*` step that checks
//! the guards and transitions state, a pending handle that performs the
//! network call, and a `finish*` step that applies the outcome. Rendering
//! returns plain strings so it can be printed or asserted on.

pub mod chat;
pub mod image;
pub mod tabs;

pub use chat::{ChatState, ChatView, KeyOutcome, KeyPress, Message, PendingChat, Role};
pub use image::{AnalysisState, ImageSession, ImageView, PendingAnalysis, PreviewJob, PreviewReady};
pub use tabs::{ActiveView, App, Tab, TabSelector};

use colored::Colorize;

/// Make backend-supplied text safe to print
///
/// Control characters other than newline and tab are replaced with U+FFFD
/// so escape sequences in a response cannot drive the terminal.
///
/// # Examples
///
/// ```
/// use searchlens::views::terminal_safe;
///
/// assert_eq!(terminal_safe("ok\u{1b}[2J"), "ok\u{fffd}[2J");
/// assert_eq!(terminal_safe("line one\nline two"), "line one\nline two");
/// ```
pub fn terminal_safe(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                char::REPLACEMENT_CHARACTER
            } else {
                c
            }
        })
        .collect()
}

/// Render a link the terminal can open in the browser
///
/// Emits an OSC 8 hyperlink when color output is enabled, followed by the
/// plain URL so it stays usable in terminals without hyperlink support.
pub fn hyperlink(title: &str, url: &str) -> String {
    format_hyperlink(title, url, colored::control::SHOULD_COLORIZE.should_colorize())
}

fn format_hyperlink(title: &str, url: &str, osc8: bool) -> String {
    let title = terminal_safe(title);
    let url = terminal_safe(url);
    if osc8 {
        format!(
            "\x1b]8;;{url}\x1b\\{}\x1b]8;;\x1b\\ <{}>",
            title.underline(),
            url.dimmed()
        )
    } else {
        format!("{} <{}>", title, url)
    }
}
