//! Sift Core - Embeddable image filtering library.
//!
//! Sift sends images to a locally-hosted vision model and keeps the ones
//! the model affirms for a user-supplied prompt. It speaks two API
//! flavors, the native Ollama API and anything OpenAI-compatible, and
//! figures out which one an endpoint implements by probing it.
//!
//! # Architecture
//!
//! ```text
//! base URL → detect flavor → backend (ollama | openai) → worker → verdicts
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sift_core::{detect_api_type, BackendOptions, FilterWorker, WorkerEvent};
//!
//! let client = reqwest::Client::new();
//! let kind = detect_api_type(&client, "http://localhost:11434", probe_timeout).await;
//! let worker = FilterWorker::new(kind, base_url, "llama3.2-vision", "a cat", 0.0,
//!     BackendOptions::default())?;
//! let (task, mut events) = worker.spawn(images);
//! while let Some(event) = events.recv().await {
//!     if let WorkerEvent::Judged(verdict) = event {
//!         println!("{}: {}", verdict.path.display(), verdict.matched);
//!     }
//! }
//! ```

// Module declarations
pub mod api;
pub mod config;
pub mod error;
pub mod worker;

// Re-exports for convenient access
pub use api::{
    ask_about_image, backend_for, detect_api_type, normalize_base_url, resolve_api_kind, ApiKind,
    BackendOptions, ImageInput, QueryOutcome, VisionAnswer, VisionBackend, VisionQuery,
};
pub use config::Config;
pub use error::{ConfigError, QueryError, QueryResult, Result, SiftError};
pub use worker::{is_affirmative, FilterWorker, ImageVerdict, WorkerControl, WorkerEvent};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
