//! dateme-providers: LLM provider integrations.
//!
//! Implements the `ChatProvider` trait for OpenAI-compatible chat completion
//! endpoints, plus a scripted mock for tests.

pub mod factory;
pub mod mock;
pub mod openai;

pub use dateme_core::error::ProviderError;
pub use factory::create_provider;
