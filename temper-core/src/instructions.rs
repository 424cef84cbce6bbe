//! Instruction assembly: render mood state and matched rules into the block
//! appended to a character's static system prompt.
//!
//! Section order is fixed:
//!
//! 1. emotional-state header (mood, intensity, reason, transition)
//! 2. one section per matched rule, in table order
//! 3. an intensity-banded note
//! 4. the no-rule fallback sentence, only when nothing matched

use std::fmt::Write as _;

use crate::mood::MoodState;
use crate::persona::CharacterPersona;
use crate::rules::RuleMatch;

/// At or above this intensity emotions dominate the reply.
pub const STRONG_BAND: f32 = 0.8;

/// At or above this intensity emotions color the reply.
pub const MODERATE_BAND: f32 = 0.5;

/// Render the per-turn instruction block. Pure and deterministic.
#[must_use]
pub fn assemble_instructions(
    persona: &CharacterPersona,
    state: &MoodState,
    matches: &[RuleMatch<'_>],
) -> String {
    let mut out = String::with_capacity(512);

    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "### CURRENT EMOTIONAL STATE: {} (Intensity: {:.1})\nWhy you feel this way: {}",
        state.mood().as_str().to_uppercase(),
        state.intensity(),
        state.reason(),
    );
    if let Some(previous) = state.previous_mood().filter(|p| *p != state.mood()) {
        let _ = write!(out, "\nMood transition: you were {previous} → now {}", state.mood());
    }

    if !matches.is_empty() {
        out.push_str("\n\n### BEHAVIORAL INSTRUCTIONS:\n");
        out.push_str("Based on your current mood and what the user just said, follow these specific behaviors:");
        for (i, m) in matches.iter().enumerate() {
            let _ = write!(out, "\n\nRule {} (triggered by: {}):", i + 1, m.matched_keywords.join(", "));
            for behavior in &m.rule.behaviors {
                let _ = write!(out, "\n- {behavior}");
            }
        }
    }

    out.push_str("\n\n");
    out.push_str(intensity_note(state.intensity()));

    if matches.is_empty() {
        let _ = write!(
            out,
            "\n\nNo specific behavioral rule fired this turn, so respond as {} normally would, relying on your baseline personality and communication style.",
            persona.name
        );
    }

    out
}

/// Severity commentary for an intensity.
#[must_use]
pub fn intensity_note(intensity: f32) -> &'static str {
    if intensity >= STRONG_BAND {
        "YOUR EMOTIONS ARE VERY STRONG: let them significantly affect your tone and word choice."
    } else if intensity >= MODERATE_BAND {
        "Your emotions are moderately affecting how you respond."
    } else {
        "Your emotions are mild right now and only lightly color your response."
    }
}
