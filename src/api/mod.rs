//! Backend API module for Searchlens
//!
//! This module defines the wire types exchanged with the backend, the
//! error taxonomy for request failures, and the [`Backend`] trait the
//! views are built against.

pub mod http;

pub use http::HttpBackend;

use crate::config::BackendConfig;
use crate::error::Result;
use crate::image_file::ImageFile;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Message used when the server fails without saying why
pub const SERVER_ERROR_FALLBACK: &str = "Server error";

/// A citation attached to an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Page title shown as the link text
    pub title: String,
    /// Target URL
    pub url: String,
}

impl Source {
    /// Create a new source
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    /// Raw user text
    pub message: &'a str,
}

/// Successful reply from `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    /// Answer text
    pub response: String,

    /// Pages the answer was built from; absent or null means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<Source>,

    /// Query the backend searched the web with, if it searched at all
    #[serde(default)]
    pub search_query_used: Option<String>,

    /// Whether a web search was performed for this answer
    #[serde(default)]
    pub web_search_performed: bool,
}

/// Successful reply from `POST /api/analyze-image`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisReply {
    /// Description produced by the vision model
    pub analysis: String,

    /// Question as the backend received it
    #[serde(default)]
    pub question_asked: Option<String>,
}

/// Reply from `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReply {
    /// Status string, `OK` when healthy
    pub status: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Why a single backend request failed
///
/// Every variant is terminal for that request; the views turn it into an
/// inline message and return to their idle state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset)
    #[error("{0}")]
    Transport(String),

    /// Non-2xx status, with the server's `error` field when it sent one
    #[error("{}", .message.as_deref().unwrap_or(SERVER_ERROR_FALLBACK))]
    Application {
        /// HTTP status code
        status: u16,
        /// Server-provided error message
        message: Option<String>,
    },

    /// 2xx status but the body was not the expected JSON
    #[error("Malformed response from server: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Whether the failure happened before any response arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Client for the chat and image-analysis backend
///
/// Views hold an `Arc<dyn Backend>` so tests can swap in a stub or point an
/// [`HttpBackend`] at a mock server.
///
/// # Examples
///
/// ```no_run
/// use searchlens::api::{AnalysisReply, ApiError, Backend, ChatReply};
/// use searchlens::image_file::ImageFile;
/// use async_trait::async_trait;
///
/// struct EchoBackend;
///
/// #[async_trait]
/// impl Backend for EchoBackend {
///     async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
///         Ok(ChatReply {
///             response: message.to_string(),
///             sources: Vec::new(),
///             search_query_used: None,
///             web_search_performed: false,
///         })
///     }
///
///     async fn analyze_image(
///         &self,
///         _image: &ImageFile,
///         question: &str,
///     ) -> Result<AnalysisReply, ApiError> {
///         Ok(AnalysisReply {
///             analysis: question.to_string(),
///             question_asked: None,
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send one chat message
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, non-2xx statuses and
    /// malformed bodies
    async fn chat(&self, message: &str) -> std::result::Result<ChatReply, ApiError>;

    /// Upload an image with a question
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, non-2xx statuses and
    /// malformed bodies
    async fn analyze_image(
        &self,
        image: &ImageFile,
        question: &str,
    ) -> std::result::Result<AnalysisReply, ApiError>;

    /// Query backend health
    ///
    /// # Default Implementation
    ///
    /// Reports that health checks are not supported.
    async fn health(&self) -> std::result::Result<HealthReply, ApiError> {
        Err(ApiError::Transport(
            "Health checks are not supported by this backend".to_string(),
        ))
    }
}

/// Create the HTTP backend described by the configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(HttpBackend::new(config.clone())?))
}
