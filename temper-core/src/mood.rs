//! Mood model: the closed set of emotional categories and the per-character
//! [`MoodState`] that the classifier mutates once per user turn.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Maximum number of prior moods kept in [`MoodState::history`].
pub const MOOD_HISTORY_CAP: usize = 5;

/// Intensity used whenever a value cannot be interpreted.
pub const FALLBACK_INTENSITY: f32 = 0.5;

/// Reason recorded when a transition arrives without one.
pub const PLACEHOLDER_REASON: &str = "Reacting to the user's latest message";

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// A named emotional category. The set is closed: anything outside it is
/// normalized to [`Mood::Neutral`] before it reaches a [`MoodState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Balanced, no particular reaction.
    #[default]
    Neutral,
    /// Satisfied with how things are going.
    Pleased,
    /// Hopeful, warming up.
    Encouraged,
    /// Won over by competence.
    Impressed,
    /// Regards the user as an equal.
    Respectful,
    /// Doubts what is being said.
    Skeptical,
    /// Wants things to move faster.
    Impatient,
    /// Mildly irritated.
    Annoyed,
    /// Losing patience.
    Frustrated,
    /// Let down.
    Disappointed,
    /// Refuses to take the user seriously.
    Dismissive,
    /// Feels attacked and pushes back.
    Defensive,
    /// Openly angry.
    Angry,
    /// Openly aggressive toward the user.
    Hostile,
    /// Looks down on the user.
    Contemptuous,
    /// Steering the user through pressure or guilt.
    Manipulative,
    /// Coldly weighing options.
    Calculating,
}

/// Coarse emotional direction of a [`Mood`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valence {
    /// Moods that move the conversation forward.
    Positive,
    /// Only [`Mood::Neutral`].
    Neutral,
    /// Moods that push back on the user.
    Negative,
    /// Manipulative or calculating: neither warm nor openly hostile.
    Strategic,
}

impl Mood {
    /// Every mood, in declaration order.
    pub const ALL: [Mood; 17] = [
        Mood::Neutral,
        Mood::Pleased,
        Mood::Encouraged,
        Mood::Impressed,
        Mood::Respectful,
        Mood::Skeptical,
        Mood::Impatient,
        Mood::Annoyed,
        Mood::Frustrated,
        Mood::Disappointed,
        Mood::Dismissive,
        Mood::Defensive,
        Mood::Angry,
        Mood::Hostile,
        Mood::Contemptuous,
        Mood::Manipulative,
        Mood::Calculating,
    ];

    /// The wire name of this mood (lower-case).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Pleased => "pleased",
            Self::Encouraged => "encouraged",
            Self::Impressed => "impressed",
            Self::Respectful => "respectful",
            Self::Skeptical => "skeptical",
            Self::Impatient => "impatient",
            Self::Annoyed => "annoyed",
            Self::Frustrated => "frustrated",
            Self::Disappointed => "disappointed",
            Self::Dismissive => "dismissive",
            Self::Defensive => "defensive",
            Self::Angry => "angry",
            Self::Hostile => "hostile",
            Self::Contemptuous => "contemptuous",
            Self::Manipulative => "manipulative",
            Self::Calculating => "calculating",
        }
    }

    /// Coarse direction of this mood.
    #[must_use]
    pub fn valence(self) -> Valence {
        match self {
            Self::Neutral => Valence::Neutral,
            Self::Pleased | Self::Encouraged | Self::Impressed | Self::Respectful => {
                Valence::Positive
            }
            Self::Skeptical
            | Self::Impatient
            | Self::Annoyed
            | Self::Frustrated
            | Self::Disappointed
            | Self::Dismissive
            | Self::Defensive
            | Self::Angry
            | Self::Hostile
            | Self::Contemptuous => Valence::Negative,
            Self::Manipulative | Self::Calculating => Valence::Strategic,
        }
    }

    /// Whether this mood pushes back on the user.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.valence() == Valence::Negative
    }

    /// Whether this mood is warm toward the user.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.valence() == Valence::Positive
    }

    /// Strongly negative moods from which a sudden jump to a positive mood
    /// is implausible.
    #[must_use]
    pub fn is_volatile_negative(self) -> bool {
        matches!(
            self,
            Self::Angry | Self::Hostile | Self::Contemptuous | Self::Frustrated | Self::Dismissive
        )
    }

    /// Parse a mood name leniently: surrounding whitespace and quotes are
    /// ignored and matching is case-insensitive.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
            .trim()
            .to_ascii_lowercase();
        cleaned.parse().ok()
    }

    /// Comma-separated list of every mood name, for prompts.
    #[must_use]
    pub fn catalogue() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown mood: '{s}'"))
    }
}

/// Clamp an intensity into `[0, 1]`. Non-finite input maps to
/// [`FALLBACK_INTENSITY`].
#[must_use]
pub fn clamp_intensity(value: f32) -> f32 {
    if !value.is_finite() {
        warn!(intensity = value, "non-finite intensity replaced with {FALLBACK_INTENSITY}");
        return FALLBACK_INTENSITY;
    }
    if !(0.0..=1.0).contains(&value) {
        warn!(intensity = value, "intensity out of range, clamping");
    }
    value.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// MoodState
// ---------------------------------------------------------------------------

/// A character's current emotional state.
///
/// Owned exclusively by one conversation session. The only mutation after
/// construction is [`MoodState::transition`], which keeps `intensity` inside
/// `[0, 1]` and the history at most [`MOOD_HISTORY_CAP`] entries long.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodState {
    current_mood: Mood,
    intensity: f32,
    reason: String,
    trigger_keywords: Vec<String>,
    previous_mood: Option<Mood>,
    history: VecDeque<Mood>,
}

impl MoodState {
    /// Create a fresh state, e.g. at scenario start.
    #[must_use]
    pub fn new(mood: Mood, intensity: f32, reason: impl Into<String>) -> Self {
        Self {
            current_mood: mood,
            intensity: clamp_intensity(intensity),
            reason: normalize_reason(reason.into()),
            trigger_keywords: Vec::new(),
            previous_mood: None,
            history: VecDeque::with_capacity(MOOD_HISTORY_CAP + 1),
        }
    }

    /// Rebuild a state from persisted parts. The history keeps only its
    /// [`MOOD_HISTORY_CAP`] most recent entries.
    pub(crate) fn from_parts(
        mood: Mood,
        intensity: f32,
        reason: String,
        trigger_keywords: Vec<String>,
        previous_mood: Option<Mood>,
        history: impl IntoIterator<Item = Mood>,
    ) -> Self {
        let mut history: VecDeque<Mood> = history.into_iter().collect();
        while history.len() > MOOD_HISTORY_CAP {
            history.pop_front();
        }
        Self {
            current_mood: mood,
            intensity: clamp_intensity(intensity),
            reason: normalize_reason(reason),
            trigger_keywords,
            previous_mood,
            history,
        }
    }

    /// Move to a new mood. The current mood is pushed onto the history
    /// (oldest entry discarded past the cap) and recorded as the previous
    /// mood before being overwritten.
    pub fn transition(
        &mut self,
        new_mood: Mood,
        intensity: f32,
        reason: impl Into<String>,
        triggers: Vec<String>,
    ) {
        self.history.push_back(self.current_mood);
        while self.history.len() > MOOD_HISTORY_CAP {
            self.history.pop_front();
        }
        self.previous_mood = Some(self.current_mood);
        self.current_mood = new_mood;
        self.intensity = clamp_intensity(intensity);
        self.reason = normalize_reason(reason.into());
        self.trigger_keywords = triggers;
    }

    /// The current mood.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.current_mood
    }

    /// Strength of the current mood, always within `[0, 1]`.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Why the character feels this way.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Words from the user's message that justified the current mood.
    #[must_use]
    pub fn trigger_keywords(&self) -> &[String] {
        &self.trigger_keywords
    }

    /// The mood before the last transition, if any transition happened.
    #[must_use]
    pub fn previous_mood(&self) -> Option<Mood> {
        self.previous_mood
    }

    /// Prior moods, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = Mood> + '_ {
        self.history.iter().copied()
    }

    /// Whether the last transition changed the mood.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous_mood.is_some_and(|p| p != self.current_mood)
    }

    /// Compressed trail of recent moods ending in the current one, e.g.
    /// `angry → frustrated → skeptical`.
    #[must_use]
    pub fn trail(&self) -> String {
        self.history
            .iter()
            .chain(std::iter::once(&self.current_mood))
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

fn normalize_reason(reason: String) -> String {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        PLACEHOLDER_REASON.to_string()
    } else if trimmed.len() == reason.len() {
        reason
    } else {
        trimmed.to_string()
    }
}
