//! Request builders: fill the prompt templates from personas, mood state and
//! the character-scoped history.
//!
//! Nothing here calls a model, so `temper-dev show-prompt` and the tests can
//! inspect exactly what would be sent.

use temper_core::config::{ClassifierConfig, LlmConfig};
use temper_core::history::{filter_history_for_character, recent_window, render_transcript};
use temper_core::persona::is_aggressive_scenario;
use temper_core::{CharacterPersona, HistoryEntry, Mood, MoodState};
use temper_llm::LlmRequest;
use temper_llm::prompt::{
    AGGRESSIVE_SCENARIO_BLOCK, PromptEngine, PromptId, SUPPORTIVE_SCENARIO_BLOCK,
};

const NO_HISTORY: &str = "(no earlier messages)";
const DEFAULT_SCENARIO: &str = "General conversation";
const DEFAULT_ROLE: &str = "General character interaction";

/// The mood classification request for one character and one user message.
///
/// `history` is the shared conversation; it is filtered to the character's
/// point of view and cut to the configured window here.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn analysis_request(
    engine: &PromptEngine,
    persona: &CharacterPersona,
    state: &MoodState,
    history: &[HistoryEntry],
    scenario_context: &str,
    user_message: &str,
    classifier: &ClassifierConfig,
    llm: &LlmConfig,
) -> LlmRequest {
    let view = filter_history_for_character(history, &persona.name);
    let window = recent_window(&view, classifier.history_window);
    let recent = if window.is_empty() {
        NO_HISTORY.to_string()
    } else {
        render_transcript(window)
    };

    let personality = persona
        .personality_traits
        .iter()
        .take(classifier.max_traits)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let biography = excerpt(&persona.describe(), classifier.biography_excerpt_chars);
    let scenario = excerpt(
        non_empty(scenario_context, DEFAULT_SCENARIO),
        classifier.scenario_excerpt_chars,
    );
    let intensity = format!("{:.2}", state.intensity());
    let trail = state.trail();
    let moods = Mood::catalogue();

    let vars = [
        ("character_name", persona.name.as_str()),
        ("personality", non_empty(&personality, "(not specified)")),
        ("communication_style", non_empty(&persona.communication_style, "(not specified)")),
        ("biography_excerpt", biography.as_str()),
        ("current_mood", state.mood().as_str()),
        ("current_intensity", intensity.as_str()),
        ("mood_trail", trail.as_str()),
        ("scenario_excerpt", scenario.as_str()),
        ("recent_conversation", recent.as_str()),
        ("user_message", user_message),
        ("available_moods", moods.as_str()),
    ];
    engine
        .request(PromptId::MoodAnalysis, &vars)
        .with_overrides(llm.classification_temperature, llm.classification_max_tokens)
        .with_timeout(llm.request_timeout_ms)
}

/// The character's static system instructions for a scenario.
#[must_use]
pub fn persona_system_prompt(
    engine: &PromptEngine,
    persona: &CharacterPersona,
    scenario_context: &str,
    role_context: &str,
) -> String {
    let background = match &persona.reference {
        Some(reference) => format!(
            "{} Act and respond the way your real-life counterpart {reference} would. Never identify yourself as anything other than {}.",
            persona.describe(),
            persona.name
        ),
        None => persona.describe(),
    };
    let scenario_block = match (is_aggressive_scenario(scenario_context), persona.is_aggressive()) {
        (true, true) => AGGRESSIVE_SCENARIO_BLOCK,
        (true, false) => SUPPORTIVE_SCENARIO_BLOCK,
        (false, _) => "",
    };

    let vars = [
        ("character_name", persona.name.as_str()),
        ("background", background.as_str()),
        ("scenario_context", non_empty(scenario_context, DEFAULT_SCENARIO)),
        ("role_context", non_empty(role_context, DEFAULT_ROLE)),
        ("scenario_block", scenario_block),
        ("communication_style", non_empty(&persona.communication_style, "(not specified)")),
    ];
    engine.request(PromptId::CharacterReply, &vars).system
}

/// The reply request: static instructions with the mood block appended,
/// plus the character-scoped transcript.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn reply_request(
    engine: &PromptEngine,
    persona: &CharacterPersona,
    scenario_context: &str,
    role_context: &str,
    mood_block: &str,
    history: &[HistoryEntry],
    user_message: &str,
    llm: &LlmConfig,
) -> LlmRequest {
    let system = format!(
        "{}\n\n{mood_block}",
        persona_system_prompt(engine, persona, scenario_context, role_context)
    );

    let view = filter_history_for_character(history, &persona.name);
    let transcript = if view.is_empty() {
        NO_HISTORY.to_string()
    } else {
        render_transcript(&view)
    };
    let vars = [
        ("transcript", transcript.as_str()),
        ("user_message", user_message),
        ("character_name", persona.name.as_str()),
    ];
    let request = engine
        .request(PromptId::CharacterReply, &vars)
        .with_overrides(llm.reply_temperature, llm.reply_max_tokens)
        .with_timeout(llm.request_timeout_ms);

    LlmRequest { system, ..request }
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

/// The first `max_chars` characters of `text`, with an ellipsis when cut.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
