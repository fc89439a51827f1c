//! Common types and utilities shared across Trust Issues crates.
//!
//! This crate defines the provider configuration enum, observability helpers,
//! and the shared error taxonomy used throughout the workspace. It stays
//! dependency-light so every crate can depend on it.
//!
//! # Overview
//!
//! - [`LlmConfig`]: Provider-agnostic generative-text configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`TrustError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use trust_common::TrustError;
//!
//! let err = TrustError::Validation("content too short".into());
//! assert_eq!(err.http_status(), 400);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Model used when the configuration names a provider but no model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Configuration for the generative-text provider used by the pipeline.
///
/// See the `trust-llm` crate for the concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum LlmConfig {
    Gemini {
        api_key: String,
        model: String,
    },
    OpenAi {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    /// No provider: every AI-backed stage runs its deterministic fallback.
    #[default]
    None,
}

/// Error types used across the Trust Issues system.
///
/// Only [`TrustError::Config`] and [`TrustError::Validation`] are meant to
/// reach an HTTP caller; the pipeline absorbs the rest into degraded results.
#[derive(thiserror::Error, Debug)]
pub enum TrustError {
    /// Required provider credentials are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request was rejected before the pipeline ran.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider kept rate limiting after the retry budget was spent.
    #[error("Rate limit exceeded after {attempts} attempts: {message}")]
    RateLimited { attempts: u32, message: String },

    /// The provider account is out of quota; retrying will not help.
    #[error("Provider quota exhausted, check your provider account and billing: {0}")]
    QuotaExhausted(String),

    /// A generative-text provider returned an error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The evidence search provider failed.
    #[error("Evidence search error: {0}")]
    Search(String),

    /// A provider reply did not match the expected schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,

    /// The request was cancelled by its caller.
    #[error("Request cancelled")]
    Cancelled,
}

impl TrustError {
    /// HTTP status an outer routing layer should surface for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            TrustError::Config(_) => 500,
            TrustError::Validation(_) => 400,
            TrustError::RateLimited { .. } => 429,
            TrustError::QuotaExhausted(_) => 402,
            TrustError::Timeout | TrustError::Cancelled => 504,
            TrustError::Provider(_) | TrustError::Search(_) | TrustError::Parse(_) => 502,
        }
    }
}

/// Convenient alias for results that use [`TrustError`].
pub type Result<T> = std::result::Result<T, TrustError>;
