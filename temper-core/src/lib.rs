//! # temper-core
//!
//! Mood inference and behavior-rule engine for conversational characters.
//!
//! Every character in a conversation carries a [`MoodState`]: a mood from a
//! closed set, an intensity in `[0, 1]`, the reason behind it, the words that
//! triggered it and a short trail of earlier moods. Each user turn runs:
//!
//! ```text
//! history ──► filter_history_for_character ──► (classifier, in temper-session)
//!                                                   │  raw model text
//!                                                   ▼
//!                                         extract::extract_verdict
//!                                                   │
//!                                  adjust::personality + trajectory
//!                                                   │
//!                                         MoodState::transition
//!                                                   │
//!                   rules::match_rules ──► instructions::assemble_instructions
//! ```
//!
//! Everything in this crate is synchronous and deterministic. The only
//! suspending step, the text generation call, lives in `temper-llm`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adjust;
pub mod config;
pub mod error;
pub mod extract;
pub mod history;
pub mod instructions;
pub mod mood;
pub mod persistence;
pub mod persona;
pub mod rules;

pub use config::{ClassifierConfig, ProviderConfig, ProviderKind, SessionConfig, TemperConfig};
pub use error::TemperError;
pub use extract::{MoodVerdict, extract_verdict};
pub use history::{HistoryEntry, Role, filter_history_for_character};
pub use instructions::assemble_instructions;
pub use mood::{MOOD_HISTORY_CAP, Mood, MoodState};
pub use persistence::MoodRecord;
pub use persona::{CharacterPersona, CharacterRoster};
pub use rules::{BehaviorRule, BehaviorRuleTable, RuleMatch, match_rules};
