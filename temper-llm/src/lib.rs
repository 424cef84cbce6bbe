//! # temper-llm: text generation for temper
//!
//! Provides one interface, [`TextGenerator`], over every backend a
//! conversation may use:
//!   - **Ollama** (local)
//!   - **OpenAI-compatible APIs** (Groq, OpenAI, Together, ...)
//!   - [`ScriptedGenerator`] for tests and offline tooling
//!
//! Providers are combined with [`FallbackChain`], which tries them strictly
//! in priority order. Output text is never trusted: callers pass it through
//! `temper_core::extract` or use it only as a reply.
//!
//! # Tiers
//!
//! ```text
//! Fast:    mood classification, low temperature, short JSON output
//! Quality: in-character reply, the persona prompt plus the mood block
//! ```

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod scripted;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use error::LlmError;
pub use generator::{FallbackChain, TextGenerator};
pub use scripted::ScriptedGenerator;
pub use types::{LlmRequest, LlmResponse, ModelTier};
