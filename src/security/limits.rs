//! Request limits.
//!
//! # Design Decisions
//! - The cap is enforced where bodies are read (the JSON extractor), so an
//!   oversized body surfaces as a JSON 413 like every other API error
//! - Bodyless routes never buffer and are unaffected

use axum::extract::DefaultBodyLimit;

/// Body size cap for all extractors.
pub fn body_limit(max_body_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_body_size)
}
