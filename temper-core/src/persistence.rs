//! Flat persisted form of a [`MoodState`].
//!
//! The record carries exactly: `mood`, `intensity`, `reason`,
//! `trigger_keywords`, `previous_mood` and `mood_history` (at most
//! [`MOOD_HISTORY_CAP`] entries). Whatever store the caller uses must keep
//! these fields as they are. Decoding normalizes instead of rejecting: an
//! unknown mood name becomes neutral, intensity is clamped and the history
//! keeps its newest entries.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TemperError};
use crate::mood::{MOOD_HISTORY_CAP, Mood, MoodState};

/// Flat, string-typed mirror of [`MoodState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    /// Mood name.
    pub mood: String,
    /// Intensity. Stored as `f64` so the `f32` state value survives a
    /// decimal round trip exactly.
    pub intensity: f64,
    /// Reason text.
    pub reason: String,
    /// Trigger keywords.
    #[serde(default)]
    pub trigger_keywords: Vec<String>,
    /// Previous mood name, if any.
    #[serde(default)]
    pub previous_mood: Option<String>,
    /// Prior mood names, oldest first.
    #[serde(default)]
    pub mood_history: Vec<String>,
}

impl From<&MoodState> for MoodRecord {
    fn from(state: &MoodState) -> Self {
        Self {
            mood: state.mood().as_str().to_string(),
            intensity: f64::from(state.intensity()),
            reason: state.reason().to_string(),
            trigger_keywords: state.trigger_keywords().to_vec(),
            previous_mood: state.previous_mood().map(|m| m.as_str().to_string()),
            mood_history: state.history().map(|m| m.as_str().to_string()).collect(),
        }
    }
}

impl MoodRecord {
    /// Rebuild the state, normalizing invalid values.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn into_state(self) -> MoodState {
        let mood = parse_or_neutral(&self.mood);
        let previous = self.previous_mood.as_deref().map(parse_or_neutral);
        if self.mood_history.len() > MOOD_HISTORY_CAP {
            warn!(
                len = self.mood_history.len(),
                cap = MOOD_HISTORY_CAP,
                "persisted mood history over cap, keeping newest entries"
            );
        }
        let history = self
            .mood_history
            .iter()
            .map(|m| parse_or_neutral(m))
            .collect::<Vec<_>>();

        MoodState::from_parts(
            mood,
            self.intensity as f32,
            self.reason,
            self.trigger_keywords,
            previous,
            history,
        )
    }
}

fn parse_or_neutral(raw: &str) -> Mood {
    Mood::parse_lenient(raw).unwrap_or_else(|| {
        warn!(mood = %raw, "unknown mood in persisted record, using neutral");
        Mood::Neutral
    })
}

/// Encode a state as a JSON record.
///
/// # Errors
/// Returns `TemperError::Serialization` if encoding fails.
pub fn to_json(state: &MoodState) -> Result<String> {
    serde_json::to_string(&MoodRecord::from(state))
        .map_err(|e| TemperError::Serialization(e.to_string()))
}

/// Decode a state from a JSON record.
///
/// # Errors
/// Returns `TemperError::InvalidRecord` if the text is not a record at all.
/// Bad field values are normalized, not rejected.
pub fn from_json(json: &str) -> Result<MoodState> {
    let record: MoodRecord =
        serde_json::from_str(json).map_err(|e| TemperError::InvalidRecord(e.to_string()))?;
    Ok(record.into_state())
}
