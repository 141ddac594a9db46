//! Conjure - turn natural language into shell commands you can trust.
//!
//! Conjure sends a natural-language request to a language model, shows the
//! resulting shell command together with a danger warning and an explanation,
//! and lets the user revise it, edit it by hand, run it, or walk away.
//!
//! # Architecture
//!
//! - [`config`] - API-key storage (`~/.conjure/config.toml`)
//! - [`error`] - the backend error taxonomy and exit codes
//! - [`http`] - HTTP client abstraction over the messages API
//! - [`backend`] - the four model operations: translate, assess, explain, edit
//! - [`session`] - per-invocation state and user-choice types
//! - [`ui`] - console rendering and prompts
//! - [`executor`] - hands the confirmed command to the shell
//! - [`assistant`] - the confirm/edit interaction loop
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use conjure::{assistant::Assistant, backend::LlmBackend, executor::ShellExecutor,
//!               http::ReqwestHttpClient, ui::ConsoleUi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), conjure::error::AppError> {
//!     let backend = LlmBackend::new(Arc::new(ReqwestHttpClient::new()), "sk-ant-...".into());
//!     let assistant = Assistant::new(
//!         Arc::new(backend),
//!         Arc::new(ConsoleUi::new()),
//!         Arc::new(ShellExecutor::new()),
//!     );
//!     assistant.run("list files modified today").await
//! }
//! ```

pub mod assistant;
pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod session;
pub mod ui;
