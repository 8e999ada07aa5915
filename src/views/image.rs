//! Image analysis view
//!
//! Holds the selected image, its preview, the question and the analysis
//! text. Preview derivation runs as a one-shot job that only ever writes the
//! preview, and only for the most recent selection.

use crate::api::{AnalysisReply, ApiError, Backend};
use crate::image_file::{derive_preview, ImageFile, Preview};
use crate::views::terminal_safe;

use colored::Colorize;
use std::sync::Arc;

/// Question pre-filled in the image view
pub const DEFAULT_QUESTION: &str = "Describe this image in detail";

/// Request state of the image view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisState {
    /// Ready to analyze
    #[default]
    Idle,
    /// An upload is in flight
    Analyzing,
}

/// Everything the image view displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSession {
    file: Option<ImageFile>,
    preview: Option<Preview>,
    question: String,
    analysis: String,
    state: AnalysisState,
}

impl ImageSession {
    fn new(question: &str) -> Self {
        Self {
            file: None,
            preview: None,
            question: question.to_string(),
            analysis: String::new(),
            state: AnalysisState::Idle,
        }
    }

    /// Selected image
    pub fn file(&self) -> Option<&ImageFile> {
        self.file.as_ref()
    }

    /// Preview of the selected image, once derived
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Question sent with the next analysis
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Last analysis text or error, empty until a response arrives
    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    /// Request state
    pub fn state(&self) -> AnalysisState {
        self.state
    }
}

/// Preview derivation for one selection
pub struct PreviewJob {
    selection: u64,
    file: ImageFile,
}

impl PreviewJob {
    /// Derive the preview
    pub async fn run(self) -> PreviewReady {
        // let pending UI work run before encoding
        tokio::task::yield_now().await;
        PreviewReady {
            selection: self.selection,
            preview: derive_preview(&self.file),
        }
    }
}

/// A derived preview waiting to be applied
pub struct PreviewReady {
    selection: u64,
    preview: Preview,
}

/// An analysis that has been started but not yet sent
pub struct PendingAnalysis {
    backend: Arc<dyn Backend>,
    file: ImageFile,
    question: String,
}

impl PendingAnalysis {
    /// Image snapshotted when the analysis started
    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    /// Question snapshotted when the analysis started
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Perform the upload
    pub async fn send(self) -> Result<AnalysisReply, ApiError> {
        self.backend.analyze_image(&self.file, &self.question).await
    }
}

/// Image view state
pub struct ImageView {
    backend: Arc<dyn Backend>,
    default_question: String,
    session: ImageSession,
    selection: u64,
}

impl ImageView {
    /// Create an image view with the standard default question
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_default_question(backend, DEFAULT_QUESTION)
    }

    /// Create an image view whose question starts (and resets) to `question`
    pub fn with_default_question(backend: Arc<dyn Backend>, question: impl Into<String>) -> Self {
        let default_question = question.into();
        Self {
            backend,
            session: ImageSession::new(&default_question),
            default_question,
            selection: 0,
        }
    }

    /// Current session state
    pub fn session(&self) -> &ImageSession {
        &self.session
    }

    /// Whether an upload is in flight
    pub fn is_busy(&self) -> bool {
        self.session.state == AnalysisState::Analyzing
    }

    /// Whether the analyze trigger is enabled
    pub fn can_analyze(&self) -> bool {
        self.session.file.is_some() && !self.is_busy()
    }

    /// Replace the selected image
    ///
    /// The question and analysis are untouched. The returned job derives the
    /// preview; apply its result with [`ImageView::apply_preview`].
    pub fn select_file(&mut self, file: ImageFile) -> PreviewJob {
        self.selection += 1;
        tracing::debug!("Selected image {} (selection {})", file.name(), self.selection);
        self.session.file = Some(file.clone());
        PreviewJob {
            selection: self.selection,
            file,
        }
    }

    /// Store a derived preview
    ///
    /// Returns `false` and discards the preview when another file was
    /// selected, or the session cleared, after the job was created.
    pub fn apply_preview(&mut self, ready: PreviewReady) -> bool {
        if ready.selection != self.selection {
            tracing::debug!(
                "Discarding stale preview (selection {}, current {})",
                ready.selection,
                self.selection
            );
            return false;
        }
        self.session.preview = Some(ready.preview);
        true
    }

    /// Select a file and wait for its preview
    pub async fn select_file_and_preview(&mut self, file: ImageFile) {
        let ready = self.select_file(file).run().await;
        self.apply_preview(ready);
    }

    /// Replace the question
    pub fn set_question(&mut self, question: impl Into<String>) {
        self.session.question = question.into();
    }

    /// Start an analysis
    ///
    /// Returns `None` without touching any state when no image is selected
    /// or an upload is already in flight. Otherwise clears the previous
    /// analysis, enters Analyzing and snapshots the image and question.
    pub fn begin_analyze(&mut self) -> Option<PendingAnalysis> {
        if self.is_busy() {
            tracing::debug!("Ignoring analyze while an upload is in flight");
            return None;
        }
        let Some(file) = self.session.file.clone() else {
            tracing::debug!("Ignoring analyze with no image selected");
            return None;
        };

        self.session.state = AnalysisState::Analyzing;
        self.session.analysis.clear();

        Some(PendingAnalysis {
            backend: Arc::clone(&self.backend),
            file,
            question: self.session.question.clone(),
        })
    }

    /// Apply the outcome of the in-flight upload and return to Idle
    pub fn finish_analysis(&mut self, outcome: Result<AnalysisReply, ApiError>) {
        if !self.is_busy() {
            tracing::warn!("Dropping analysis outcome with no upload in flight");
            return;
        }

        self.session.analysis = match outcome {
            Ok(reply) => reply.analysis,
            Err(e) => {
                tracing::warn!("Image analysis failed: {}", e);
                if e.is_transport() {
                    format!("Connection error: {}", e)
                } else {
                    format!("Error: {}", e)
                }
            }
        };
        self.session.state = AnalysisState::Idle;
    }

    /// Analyze the selected image and wait for the result
    ///
    /// Returns whether a request was issued.
    pub async fn analyze(&mut self) -> bool {
        let Some(pending) = self.begin_analyze() else {
            return false;
        };
        let outcome = pending.send().await;
        self.finish_analysis(outcome);
        true
    }

    /// Reset image, preview, analysis and question
    pub fn clear(&mut self) {
        if self.is_busy() {
            tracing::warn!("Clearing image session while an upload is in flight");
        }
        self.selection += 1;
        let state = self.session.state;
        self.session = ImageSession::new(&self.default_question);
        self.session.state = state;
    }

    /// Render the picker, preview, question, triggers and result
    pub fn render(&self) -> String {
        let session = &self.session;
        let mut out = vec![
            "🖼️ Image Analysis with AI".bold().to_string(),
            "Upload an image and ask a question to analyse it"
                .dimmed()
                .to_string(),
            String::new(),
        ];

        match &session.file {
            Some(file) => out.push(format!(
                "📁 {} ({} bytes)",
                terminal_safe(file.name()),
                file.len()
            )),
            None => out.push(format!("📁 {}", "No image selected (use /file <path>)".dimmed())),
        }

        if let Some(preview) = &session.preview {
            let size = match preview.dimensions {
                Some((w, h)) => format!("{}x{}", w, h),
                None => "unknown size".to_string(),
            };
            let mime = session.file.as_ref().map(|f| f.mime_type()).unwrap_or("image");
            out.push(format!(
                "   Preview: {}, {}, {} char data URL",
                mime,
                size,
                preview.data_url.len()
            ));
        }

        out.push(String::new());
        out.push("Question to ask about the image:".to_string());
        out.push(format!("  {}", terminal_safe(&session.question)));
        out.push(String::new());

        let analyze_label = if self.is_busy() {
            "🔄 Analysing..."
        } else {
            "🔍 Analyse Image"
        };
        let analyze = if self.can_analyze() {
            format!("[{}]", analyze_label.bold())
        } else {
            format!("[{}]", analyze_label.dimmed())
        };
        out.push(format!("{}  [{}]", analyze, "🗑️ Clear"));

        if !session.analysis.is_empty() {
            out.push(String::new());
            out.push("📊 Analysis results:".bold().to_string());
            out.push(terminal_safe(&session.analysis));
        }

        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{png_bytes, StubBackend};

    fn view() -> (ImageView, Arc<StubBackend>) {
        let backend = Arc::new(StubBackend::default());
        (ImageView::new(backend.clone()), backend)
    }

    fn cat() -> ImageFile {
        ImageFile::new("cat.png", png_bytes(4, 4))
    }

    #[test]
    fn test_initial_session() {
        let (image, _backend) = view();
        let session = image.session();
        assert!(session.file().is_none());
        assert!(session.preview().is_none());
        assert_eq!(session.question(), DEFAULT_QUESTION);
        assert_eq!(session.analysis(), "");
        assert!(!image.can_analyze());
    }

    #[test]
    fn test_analyze_without_file_is_noop() {
        let (mut image, _backend) = view();
        assert!(image.begin_analyze().is_none());
        assert_eq!(image.session().state(), AnalysisState::Idle);
    }

    #[tokio::test]
    async fn test_analyze_without_file_keeps_previous_analysis() {
        let (mut image, backend) = view();
        image.session.analysis = "Earlier result".to_string();

        assert!(!image.analyze().await);
        assert_eq!(image.session().analysis(), "Earlier result");
        assert!(backend.analyze_calls().is_empty());
    }

    #[test]
    fn test_begin_analyze_snapshots_and_clears() {
        let (mut image, _backend) = view();
        image.select_file(cat());
        image.session.analysis = "old result".to_string();
        image.set_question("What color is the cat?");

        let pending = image.begin_analyze().unwrap();
        assert_eq!(pending.file().name(), "cat.png");
        assert_eq!(pending.question(), "What color is the cat?");
        assert_eq!(image.session().analysis(), "");
        assert!(image.is_busy());
        assert!(image.begin_analyze().is_none());
    }

    #[test]
    fn test_new_selection_does_not_change_in_flight_request() {
        let (mut image, _backend) = view();
        image.select_file(cat());
        let pending = image.begin_analyze().unwrap();

        image.select_file(ImageFile::new("dog.png", png_bytes(2, 2)));
        assert_eq!(pending.file().name(), "cat.png");
        assert_eq!(image.session().file().unwrap().name(), "dog.png");
    }

    #[test]
    fn test_finish_success_and_errors() {
        let (mut image, _backend) = view();
        image.select_file(cat());

        image.begin_analyze().unwrap();
        image.finish_analysis(Ok(AnalysisReply {
            analysis: "A cat.".to_string(),
            question_asked: None,
        }));
        assert_eq!(image.session().analysis(), "A cat.");
        assert!(!image.is_busy());

        image.begin_analyze().unwrap();
        image.finish_analysis(Err(ApiError::Application {
            status: 400,
            message: Some("Unsupported file format".to_string()),
        }));
        assert_eq!(image.session().analysis(), "Error: Unsupported file format");

        image.begin_analyze().unwrap();
        image.finish_analysis(Err(ApiError::Transport("connection refused".to_string())));
        assert_eq!(image.session().analysis(), "Connection error: connection refused");
        assert!(!image.is_busy());

        image.begin_analyze().unwrap();
        image.finish_analysis(Err(ApiError::Malformed(
            "expected value at line 1 column 1".to_string(),
        )));
        assert_eq!(
            image.session().analysis(),
            "Error: Malformed response from server: expected value at line 1 column 1"
        );
        assert!(!image.is_busy());
    }

    #[test]
    fn test_select_file_keeps_question_and_analysis() {
        let (mut image, _backend) = view();
        image.set_question("How many cats?");
        image.session.analysis = "Two cats.".to_string();
        image.select_file(cat());
        assert_eq!(image.session().question(), "How many cats?");
        assert_eq!(image.session().analysis(), "Two cats.");
    }

    #[tokio::test]
    async fn test_preview_last_selection_wins() {
        let (mut image, _backend) = view();
        let first = image.select_file(ImageFile::new("first.png", png_bytes(2, 2)));
        let second = image.select_file(ImageFile::new("second.png", png_bytes(6, 5)));

        // Second completes before the first
        let second_ready = second.run().await;
        let first_ready = first.run().await;
        assert!(image.apply_preview(second_ready));
        assert!(!image.apply_preview(first_ready));

        assert_eq!(image.session().preview().unwrap().dimensions, Some((6, 5)));
        assert_eq!(image.session().file().unwrap().name(), "second.png");
    }

    #[tokio::test]
    async fn test_clear_resets_session_and_discards_pending_preview() {
        let (mut image, _backend) = view();
        image.select_file_and_preview(cat()).await;
        image.set_question("Is it sleeping?");
        image.analyze().await;
        assert!(image.session().preview().is_some());
        assert!(!image.session().analysis().is_empty());

        let job = image.select_file(ImageFile::new("late.png", png_bytes(3, 3)));
        image.clear();
        assert!(!image.apply_preview(job.run().await));

        let session = image.session();
        assert!(session.file().is_none());
        assert!(session.preview().is_none());
        assert_eq!(session.analysis(), "");
        assert_eq!(session.question(), DEFAULT_QUESTION);
    }

    #[test]
    fn test_clear_restores_custom_default_question() {
        let backend = Arc::new(StubBackend::default());
        let mut image = ImageView::with_default_question(backend, "Décris cette image");
        image.set_question("something else");
        image.clear();
        assert_eq!(image.session().question(), "Décris cette image");
    }

    #[test]
    fn test_render_states() {
        colored::control::set_override(false);
        let (mut image, _backend) = view();
        let rendered = image.render();
        assert!(rendered.contains("No image selected"));
        assert!(rendered.contains(DEFAULT_QUESTION));
        assert!(rendered.contains("[🔍 Analyse Image]"));
        assert!(!rendered.contains("Analysis results"));

        image.select_file(cat());
        image.begin_analyze().unwrap();
        assert!(image.render().contains("[🔄 Analysing...]"));

        image.finish_analysis(Ok(AnalysisReply {
            analysis: "A cat.".to_string(),
            question_asked: None,
        }));
        let rendered = image.render();
        assert!(rendered.contains("cat.png"));
        assert!(rendered.contains("📊 Analysis results:\nA cat."));
    }

    #[test]
    fn test_render_neutralizes_escape_sequences_in_analysis() {
        colored::control::set_override(false);
        let (mut image, _backend) = view();
        image.select_file(cat());
        image.begin_analyze().unwrap();
        image.finish_analysis(Ok(AnalysisReply {
            analysis: "A cat.\u{1b}[2J\u{1b}]0;PWNED\u{7}".to_string(),
            question_asked: None,
        }));

        let rendered = image.render();
        assert!(!rendered.contains('\u{1b}'));
        assert!(!rendered.contains('\u{7}'));
        assert!(rendered.contains("A cat.\u{fffd}[2J"));
    }

    #[tokio::test]
    async fn test_render_preview_summary() {
        colored::control::set_override(false);
        let (mut image, _backend) = view();
        image.select_file_and_preview(cat()).await;
        assert!(image.render().contains("Preview: image/png, 4x4"));
    }
}
