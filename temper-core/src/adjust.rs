//! Deterministic post-classification adjustments.
//!
//! Two local passes run over every extracted verdict before it is
//! committed, neither of which needs another model call:
//!
//! - **personality**: aggressive characters feel negative moods harder;
//!   empathetic characters soften when the user sounds vulnerable.
//! - **trajectory**: a large single-step jump from a volatile negative mood
//!   to a positive one is damped, not forbidden.

use tracing::debug;

use crate::config::ClassifierConfig;
use crate::extract::MoodVerdict;
use crate::mood::{Mood, clamp_intensity};
use crate::persona::CharacterPersona;

/// Phrases that signal the user is exposing something vulnerable.
pub const VULNERABILITY_MARKERS: &[&str] = &[
    "sorry",
    "scared",
    "afraid",
    "struggling",
    "worried",
    "overwhelmed",
    "anxious",
    "hurt",
    "sad",
    "stressed",
    "i feel",
    "i'm trying",
    "help me",
    "i don't know what to do",
];

/// Whether `message` contains any [`VULNERABILITY_MARKERS`].
#[must_use]
pub fn shows_vulnerability(message: &str) -> bool {
    let lowered = message.to_lowercase();
    VULNERABILITY_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Personality-driven intensity adjustment.
#[must_use]
pub fn apply_personality(
    mut verdict: MoodVerdict,
    persona: &CharacterPersona,
    user_message: &str,
    config: &ClassifierConfig,
) -> MoodVerdict {
    let before = verdict.intensity;
    if persona.is_aggressive() && verdict.mood.is_negative() {
        verdict.intensity = clamp_intensity(verdict.intensity + config.aggressive_boost);
    }
    if persona.is_empathetic() && shows_vulnerability(user_message) {
        verdict.intensity = clamp_intensity(verdict.intensity - config.empathetic_reduction);
    }
    if (verdict.intensity - before).abs() > f32::EPSILON {
        debug!(
            character = %persona.id,
            mood = %verdict.mood,
            before,
            after = verdict.intensity,
            "personality adjustment"
        );
    }
    verdict
}

/// Damp an implausible reversal from a volatile negative mood straight into
/// a strongly positive one.
#[must_use]
pub fn apply_trajectory(
    mut verdict: MoodVerdict,
    prior: Mood,
    config: &ClassifierConfig,
) -> MoodVerdict {
    if prior.is_volatile_negative()
        && verdict.mood.is_positive()
        && verdict.intensity > config.reversal_threshold
    {
        debug!(
            from = %prior,
            to = %verdict.mood,
            intensity = verdict.intensity,
            cap = config.reversal_cap,
            "damping implausible mood reversal"
        );
        verdict.intensity = verdict.intensity.min(config.reversal_cap);
    }
    verdict
}

/// Both passes, personality first.
#[must_use]
pub fn reconcile(
    verdict: MoodVerdict,
    prior: Mood,
    persona: &CharacterPersona,
    user_message: &str,
    config: &ClassifierConfig,
) -> MoodVerdict {
    let adjusted = apply_personality(verdict, persona, user_message, config);
    apply_trajectory(adjusted, prior, config)
}
