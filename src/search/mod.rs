//! External search collaborators
//!
//! - [`SongSearch`] turns a free-text query into candidates ([`GeniusSearch`])
//! - [`VideoLookup`] finds video ids for a candidate ([`YoutubeLookup`])

pub mod genius;
pub mod youtube;

use async_trait::async_trait;

use crate::models::Candidate;
use crate::utils::error::SearchError;

pub use genius::GeniusSearch;
pub use youtube::YoutubeLookup;

/// Song search provider
#[async_trait]
pub trait SongSearch: Send + Sync {
    /// Candidates for the query in the provider's own order
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, SearchError>;
}

/// Video id lookup side-channel
#[async_trait]
pub trait VideoLookup: Send + Sync {
    /// Video ids matching the query, best first; possibly empty
    async fn lookup(&self, query: &str) -> Result<Vec<String>, SearchError>;
}
