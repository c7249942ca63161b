//! lyricseek - lyric fragment search and lyrics resolution
//!
//! Turns a remembered line of a song into a ranked list of matching songs,
//! each with its lyrics and, when available, a video id.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`search`] - Song search and video lookup collaborators
//! - [`ranking`] - Candidate ordering against the query
//! - [`crawler`] - Fetch strategies with retry, rate limiting and sessions
//! - [`parser`] - Lyric region location and text cleanup
//! - [`resolver`] - Ordered strategy fallback for one candidate
//! - [`pipeline`] - Concurrent batch resolution and the `resolve` entry point
//! - [`models`] - Core data structures and types
//! - [`metrics`] - Prometheus metrics
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use lyricseek::config::Config;
//! use lyricseek::pipeline::LyricsPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = LyricsPipeline::from_config(&config)?;
//!     for record in pipeline.resolve("is this the real life").await? {
//!         println!("{}. {} by {}", record.rank, record.title, record.artist);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod ranking;
pub mod resolver;
pub mod search;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, LyricseekErrorTrait, ResolveError, Result};
    pub use crate::models::{Candidate, LyricsText, ResultRecord, StrategyKind};
    pub use crate::parser::LyricsExtractor;
    pub use crate::pipeline::LyricsPipeline;
}

// Direct re-exports for convenience
pub use models::{Candidate, LyricsText, ResultRecord, StrategyKind};
pub use pipeline::LyricsPipeline;
