//! Test utilities for Searchlens
//!
//! Provides a recording stub backend and in-memory image fixtures.

use crate::api::{AnalysisReply, ApiError, Backend, ChatReply, HealthReply};
use crate::image_file::ImageFile;

use async_trait::async_trait;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Encode a black PNG of the given size
///
/// # Panics
///
/// Panics if encoding fails
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("Failed to encode test PNG");
    out.into_inner()
}

/// Write a PNG into a temporary directory
///
/// # Returns
///
/// Returns the path to the created file
pub fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, png_bytes(width, height)).expect("Failed to write test PNG");
    path
}

/// Backend that returns canned outcomes and records every call
pub struct StubBackend {
    chat_outcome: Result<ChatReply, ApiError>,
    analyze_outcome: Result<AnalysisReply, ApiError>,
    chat_calls: Mutex<Vec<String>>,
    analyze_calls: Mutex<Vec<(String, String)>>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            chat_outcome: Ok(ChatReply {
                response: "stub reply".to_string(),
                sources: Vec::new(),
                search_query_used: None,
                web_search_performed: false,
            }),
            analyze_outcome: Ok(AnalysisReply {
                analysis: "stub analysis".to_string(),
                question_asked: None,
            }),
            chat_calls: Mutex::new(Vec::new()),
            analyze_calls: Mutex::new(Vec::new()),
        }
    }
}

impl StubBackend {
    /// Set the outcome returned by every chat call
    pub fn with_chat(mut self, outcome: Result<ChatReply, ApiError>) -> Self {
        self.chat_outcome = outcome;
        self
    }

    /// Set the outcome returned by every analysis call
    pub fn with_analysis(mut self, outcome: Result<AnalysisReply, ApiError>) -> Self {
        self.analyze_outcome = outcome;
        self
    }

    /// Messages received so far
    pub fn chat_calls(&self) -> Vec<String> {
        self.chat_calls.lock().unwrap().clone()
    }

    /// `(file name, question)` pairs received so far
    pub fn analyze_calls(&self) -> Vec<(String, String)> {
        self.analyze_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        self.chat_calls.lock().unwrap().push(message.to_string());
        self.chat_outcome.clone()
    }

    async fn analyze_image(
        &self,
        image: &ImageFile,
        question: &str,
    ) -> Result<AnalysisReply, ApiError> {
        self.analyze_calls
            .lock()
            .unwrap()
            .push((image.name().to_string(), question.to_string()));
        self.analyze_outcome.clone()
    }

    async fn health(&self) -> Result<HealthReply, ApiError> {
        Ok(HealthReply {
            status: "OK".to_string(),
        })
    }
}
