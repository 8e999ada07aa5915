//! Tab selector and the application shell
//!
//! The shell owns exactly one view at a time. Switching tabs drops the
//! previous view and builds the selected one fresh, so a chat transcript
//! lives only as long as its tab stays open.

use crate::api::Backend;
use crate::views::chat::ChatView;
use crate::views::image::ImageView;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Chat with web search
    #[default]
    Chat,
    /// Image analysis
    Image,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Image => write!(f, "image"),
        }
    }
}

impl Tab {
    /// All tabs in navigation order
    pub const ALL: [Tab; 2] = [Tab::Chat, Tab::Image];

    /// Parse a tab from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use searchlens::views::Tab;
    ///
    /// assert_eq!(Tab::parse_str("Image").unwrap(), Tab::Image);
    /// assert!(Tab::parse_str("video").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "image" => Ok(Self::Image),
            other => Err(format!("Unknown tab: {}", other)),
        }
    }

    /// Label shown in the navigation bar
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chat => "💬 Chat with web search",
            Self::Image => "🖼️ Image analysis",
        }
    }
}

/// Holds the active tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabSelector {
    active: Tab,
}

impl TabSelector {
    /// Create a selector with the given tab active
    pub fn new(active: Tab) -> Self {
        Self { active }
    }

    /// Currently active tab
    pub fn active(&self) -> Tab {
        self.active
    }

    /// Activate a tab, returning whether it changed
    pub fn select(&mut self, tab: Tab) -> bool {
        if self.active == tab {
            return false;
        }
        tracing::debug!("Switching tab from {} to {}", self.active, tab);
        self.active = tab;
        true
    }

    /// Render the navigation bar, highlighting the active entry
    pub fn render_nav(&self) -> String {
        Tab::ALL
            .iter()
            .map(|tab| {
                if *tab == self.active {
                    format!("[{}]", tab.label().bold().cyan())
                } else {
                    format!(" {} ", tab.label().dimmed())
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// The single view currently shown
pub enum ActiveView {
    /// Chat tab content
    Chat(ChatView),
    /// Image tab content
    Image(ImageView),
}

/// Application shell: tab selector plus the active view
pub struct App {
    tabs: TabSelector,
    view: ActiveView,
    backend: Arc<dyn Backend>,
    default_question: String,
}

impl App {
    /// Create the shell with `initial` open
    ///
    /// # Arguments
    ///
    /// * `backend` - Backend client injected into every view
    /// * `initial` - Tab to open first
    /// * `default_question` - Prompt pre-filled in the image view
    pub fn new(backend: Arc<dyn Backend>, initial: Tab, default_question: impl Into<String>) -> Self {
        let default_question = default_question.into();
        let view = Self::build_view(initial, &backend, &default_question);
        Self {
            tabs: TabSelector::new(initial),
            view,
            backend,
            default_question,
        }
    }

    fn build_view(tab: Tab, backend: &Arc<dyn Backend>, default_question: &str) -> ActiveView {
        match tab {
            Tab::Chat => ActiveView::Chat(ChatView::new(Arc::clone(backend))),
            Tab::Image => ActiveView::Image(ImageView::with_default_question(
                Arc::clone(backend),
                default_question,
            )),
        }
    }

    /// Currently active tab
    pub fn active_tab(&self) -> Tab {
        self.tabs.active()
    }

    /// Switch tabs; the newly selected view starts from its initial state
    ///
    /// Returns whether the tab changed. Re-selecting the active tab keeps
    /// its view untouched.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        if !self.tabs.select(tab) {
            return false;
        }
        self.view = Self::build_view(tab, &self.backend, &self.default_question);
        true
    }

    /// The active view
    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    /// The chat view, when the chat tab is active
    pub fn chat_mut(&mut self) -> Option<&mut ChatView> {
        match &mut self.view {
            ActiveView::Chat(chat) => Some(chat),
            ActiveView::Image(_) => None,
        }
    }

    /// The image view, when the image tab is active
    pub fn image_mut(&mut self) -> Option<&mut ImageView> {
        match &mut self.view {
            ActiveView::Image(image) => Some(image),
            ActiveView::Chat(_) => None,
        }
    }

    /// Render the navigation bar followed by the active view
    pub fn render(&self) -> String {
        let body = match &self.view {
            ActiveView::Chat(chat) => chat.render(),
            ActiveView::Image(image) => image.render(),
        };
        format!("{}\n\n{}", self.tabs.render_nav(), body)
    }
}
