//! Mood classification: one generation call per character per turn.

use std::sync::Arc;

use temper_core::adjust::reconcile;
use temper_core::config::{ClassifierConfig, LlmConfig};
use temper_core::extract::extract;
use temper_core::{CharacterPersona, HistoryEntry, MoodState};
use temper_llm::TextGenerator;
use temper_llm::prompt::PromptEngine;
use tracing::{debug, info, warn};

use crate::prompts::analysis_request;

/// Updates a character's [`MoodState`] from one user message.
pub struct MoodClassifier {
    generator: Arc<dyn TextGenerator>,
    prompts: Arc<PromptEngine>,
    config: ClassifierConfig,
    llm: LlmConfig,
}

impl MoodClassifier {
    /// Create a classifier over `generator`.
    #[must_use]
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompts: Arc<PromptEngine>,
        config: ClassifierConfig,
        llm: LlmConfig,
    ) -> Self {
        Self {
            generator,
            prompts,
            config,
            llm,
        }
    }

    /// Classification policy in use.
    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the character's reaction to `user_message` and commit it.
    ///
    /// `history` is the shared conversation; the character's own view of it
    /// is derived here. Exactly one generation call is made. If that call
    /// fails the input state is returned unchanged; malformed output still
    /// yields a valid (possibly neutral) verdict.
    pub async fn classify_and_update(
        &self,
        persona: &CharacterPersona,
        user_message: &str,
        mut state: MoodState,
        history: &[HistoryEntry],
        scenario_context: &str,
    ) -> MoodState {
        let request = analysis_request(
            &self.prompts,
            persona,
            &state,
            history,
            scenario_context,
            user_message,
            &self.config,
            &self.llm,
        );

        let response = match self.generator.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    character = %persona.name,
                    provider = self.generator.name(),
                    error = %e,
                    "mood classification failed, keeping prior mood"
                );
                return state;
            }
        };

        let extraction = extract(&response.text);
        debug!(
            character = %persona.name,
            stage = %extraction.stage,
            raw_mood = %extraction.verdict.mood,
            raw_intensity = extraction.verdict.intensity,
            "mood verdict extracted"
        );

        let prior = state.mood();
        let verdict = reconcile(extraction.verdict, prior, persona, user_message, &self.config);
        state.transition(verdict.mood, verdict.intensity, verdict.reason, verdict.trigger_keywords);

        info!(
            character = %persona.name,
            from = %prior,
            mood = %state.mood(),
            intensity = state.intensity(),
            "mood updated"
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temper_core::Mood;
    use temper_llm::{LlmError, ScriptedGenerator};

    fn marcus() -> CharacterPersona {
        CharacterPersona::new("marcus", "Marcus").with_traits(&["Demanding", "Impatient"])
    }

    fn classifier(generator: Arc<ScriptedGenerator>) -> MoodClassifier {
        MoodClassifier::new(
            generator,
            Arc::new(PromptEngine::builtin()),
            ClassifierConfig::default(),
            LlmConfig::default(),
        )
    }

    #[tokio::test]
    async fn commits_a_reconciled_verdict() {
        let generator = Arc::new(ScriptedGenerator::new("mock").then_text(
            r#"{"mood": "angry", "intensity": 0.7, "reason": "Excuses again", "trigger_keywords": ["excuse"]}"#,
        ));
        let state = MoodState::new(Mood::Impatient, 0.6, "start");

        let next = classifier(generator.clone())
            .classify_and_update(&marcus(), "Another excuse, sorry", state, &[], "A deadline")
            .await;

        assert_eq!(next.mood(), Mood::Angry);
        // Demanding persona, negative mood: boosted by 0.1.
        assert!((next.intensity() - 0.8).abs() < 1e-6);
        assert_eq!(next.previous_mood(), Some(Mood::Impatient));
        assert_eq!(next.trigger_keywords(), ["excuse".to_string()]);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn empathetic_character_softens_when_user_is_vulnerable() {
        let casey = CharacterPersona::new("casey", "Casey").with_traits(&["Nurturing", "Empathetic"]);
        let generator = Arc::new(ScriptedGenerator::new("mock").then_text(
            r#"{"mood": "disappointed", "intensity": 0.6, "reason": "Missed the deadline", "triggers": ["deadline"]}"#,
        ));

        let next = classifier(generator)
            .classify_and_update(
                &casey,
                "I'm sorry, I'm struggling to keep up with the deadline",
                MoodState::new(Mood::Neutral, 0.3, "start"),
                &[],
                "",
            )
            .await;

        assert_eq!(next.mood(), Mood::Disappointed);
        assert!((next.intensity() - 0.45).abs() < 1e-6);
        assert_eq!(next.trigger_keywords(), ["deadline".to_string()]);
    }

    #[tokio::test]
    async fn provider_failure_keeps_state() {
        let generator = Arc::new(ScriptedGenerator::new("mock").then_error(LlmError::Timeout(30_000)));
        let state = MoodState::new(Mood::Skeptical, 0.4, "start");

        let next = classifier(generator.clone())
            .classify_and_update(&marcus(), "hello", state.clone(), &[], "")
            .await;

        assert_eq!(next, state);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn unparseable_output_still_transitions_to_neutral() {
        let generator = Arc::new(ScriptedGenerator::new("mock").then_text("I'd rather not say."));
        let state = MoodState::new(Mood::Skeptical, 0.4, "start");

        let next = classifier(generator)
            .classify_and_update(&marcus(), "hello", state, &[], "")
            .await;

        assert_eq!(next.mood(), Mood::Neutral);
        assert!((next.intensity() - 0.5).abs() < f32::EPSILON);
        assert_eq!(next.previous_mood(), Some(Mood::Skeptical));
    }

    #[tokio::test]
    async fn prompt_uses_the_character_view_of_history() {
        let generator = Arc::new(ScriptedGenerator::new("mock").then_text(r#"{"mood": "neutral"}"#));
        let history = vec![
            HistoryEntry::user("Alex", "Morning"),
            HistoryEntry::character("Marcus", "Make it quick."),
            HistoryEntry::character("Sarah", "Be nice, Marcus."),
        ];

        classifier(generator.clone())
            .classify_and_update(&marcus(), "ok", MoodState::new(Mood::Neutral, 0.3, "start"), &history, "")
            .await;

        let sent = &generator.requests()[0].user;
        assert!(sent.contains("you said: Make it quick."));
        assert!(sent.contains("Sarah said: Be nice, Marcus."));
    }
}
