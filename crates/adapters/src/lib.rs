//! eightify adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `youtube`: YouTube Data API and timed-text transcript source
//! - `llm`: LLM provider adapters (OpenAI, Anthropic, stub)
//! - `cache`: In-memory video cache

mod cache_memory;

pub mod llm;
pub mod youtube;

/// Re-exports for cache adapters
pub mod cache {
    pub use crate::cache_memory::{CachePolicy, InMemoryVideoCache};
}
