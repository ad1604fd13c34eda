//! Acima game client core.
//!
//! Talks to the Acima learning backend over JSON/HTTP and plays the narration
//! clips it produces, falling back through several delivery strategies so a
//! missing or slow clip never stalls the game.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use acima::prelude::*;
//!
//! # async fn example() -> acima::error::Result<()> {
//! let client = ApiClient::with_base_url("http://localhost:5000")?;
//! let audio = AudioDeliveryService::new(
//!     client.clone(),
//!     Arc::new(LoggingPlayer::new()),
//!     &AudioConfig::default(),
//! );
//!
//! let question = client.request_new_question(3, "maria@exemplo.com").await?;
//! if let Some(path) = question.narration_path() {
//!     audio.play_path(path).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
