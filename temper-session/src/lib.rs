//! # temper-session: conversation turns over temper-core and temper-llm
//!
//! Wires the synchronous mood engine to a [`temper_llm::TextGenerator`]:
//!
//! - [`MoodClassifier`] turns one user message into an updated mood with a
//!   single generation call, keeping the prior mood if that call fails.
//! - [`ConversationSession`] owns every character's mood and the shared
//!   history, and runs single and group turns under a turn budget.
//! - [`providers::build_chain`] builds the priority-ordered provider chain
//!   from configuration.
//!
//! Request builders live in [`prompts`] so tooling can render exactly what
//! would be sent without calling a model.

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod session;

pub use classifier::MoodClassifier;
pub use error::SessionError;
pub use session::{CharacterReply, ConversationSession, Participant, SessionId};
