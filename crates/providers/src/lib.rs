//! LLM Provider implementations for Shopbot.
//!
//! All providers implement the `shopbot_core::Provider` trait.
//! The router builds the one selected by configuration or `--provider`.

pub mod gigachat;
pub mod openai_compat;
pub mod router;

pub use gigachat::GigaChatProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_provider;
