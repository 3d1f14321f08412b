//! dateme-core: Core chat model, MBTI scoring, and prompt assembly.
//!
//! This crate defines the data model, the provider and store traits, and the
//! chat session that the rest of dateme builds on.

pub mod config;
pub mod error;
pub mod mbti;
pub mod model;
pub mod prompt;
pub mod session;
pub mod traits;
