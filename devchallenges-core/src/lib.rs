//! DevChallenges Core - shared building blocks for the DevChallenges GitHub feed
//!
//! This crate holds the pieces every other crate needs: layered configuration,
//! GitHub credential resolution and the time-boxed response cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod secrets;

pub use cache::{CacheEntry, CacheStore, Clock, ManualClock, MemoryStore, SystemClock, TtlCache};
pub use config::{CacheConfig, Config, GitHubConfig, ServerConfig};
pub use error::{Error, Result};
pub use secrets::{GitHubToken, Secrets};
