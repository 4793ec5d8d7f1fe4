//! Lipsync Session
//!
//! The generation session controller: submits a script to the studio backend,
//! polls the rendering status on an interval, and tears polling down when the
//! session finishes, is replaced, or its owner goes away.
//!
//! Architecture:
//! - Configuration: backend URL, poll interval and presenters from environment or defaults
//! - Scheduler: cancellable repeating timers, one per handle
//! - Session: the aggregate describing the current attempt
//! - Controller: the state machine tying submission, polling and teardown together
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lipsync_client::StudioClient;
//! use lipsync_core::domain::generation::GenerationRequest;
//! use lipsync_session::{Config, SessionController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let client = StudioClient::with_timeout(config.api_url.clone(), config.request_timeout)?;
//!     let controller = SessionController::new(Arc::new(client), &config);
//!
//!     let mut updates = controller.subscribe();
//!     controller
//!         .submit(GenerationRequest::new("Hello world", "emma"))
//!         .await?;
//!
//!     while updates.changed().await.is_ok() {
//!         let view = updates.borrow_and_update().clone();
//!         println!("{}", view.phase);
//!         if view.is_settled() {
//!             break;
//!         }
//!     }
//!
//!     controller.teardown();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod scheduler;
pub mod session;

pub use config::Config;
pub use controller::SessionController;
pub use error::{ConfigError, Result, SessionError, ValidationError};
pub use session::{Outcome, Phase, SessionId, SessionView};
