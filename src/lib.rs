//! # Resumo
//!
//! Client for a remote document-intelligence service: summaries, keywords,
//! entities, topic lists, comparisons, Q&A answers and bullet conversions.
//!
//! ## Layers
//!
//! - **Transport**: [`ApiClient`] with a fixed base URL and timeout; every failure
//!   becomes a normalized [`ApiError`]
//! - **Endpoints**: one async function per capability building a multipart body
//! - **Hooks**: per-capability `{result, is_loading, error}` state with reset
//! - **Health**: a cancellable poller reporting `checking`/`online`/`offline`

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod export;
pub mod health;
pub mod hooks;
pub mod types;
pub mod validation;

pub use client::{ApiClient, RequestOptions};
pub use config::Config;
pub use error::ApiError;
pub use health::{HealthPoller, HealthStatus, PollerHandle};
pub use hooks::{HookError, HookState, OverlapPolicy};
pub use types::{DocumentInput, FileUpload, SummaryType};
