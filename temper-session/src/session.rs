//! Conversation sessions: one scenario, one user, one or more characters.
//!
//! Each turn runs strictly in sequence for a character:
//!
//! ```text
//! classify ──► match_rules ──► assemble_instructions ──► generate reply
//! ```
//!
//! The whole pipeline runs under the session's turn budget. The character's
//! [`MoodState`] is only replaced once the pipeline has finished, so a turn
//! that times out leaves the pre-turn mood in place.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use temper_core::config::{LlmConfig, SessionConfig};
use temper_core::{
    CharacterPersona, HistoryEntry, Mood, MoodState, TemperConfig, assemble_instructions, match_rules,
};
use temper_llm::TextGenerator;
use temper_llm::prompt::PromptEngine;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::MoodClassifier;
use crate::error::{Result, SessionError};
use crate::prompts::reply_request;

/// Reason recorded on every character's opening mood.
pub const SCENARIO_START_REASON: &str = "Scenario start";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// A fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Participants and turn results
// ---------------------------------------------------------------------------

/// A character taking part in a session.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Persona, shared read-only.
    pub persona: Arc<CharacterPersona>,
    /// What this character is in the scenario (e.g. "your manager").
    pub role_context: String,
    state: MoodState,
}

impl Participant {
    /// The character's current mood state.
    #[must_use]
    pub fn state(&self) -> &MoodState {
        &self.state
    }
}

/// What happened for one character in one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterReply {
    /// Character id.
    pub character_id: String,
    /// Character display name.
    pub character_name: String,
    /// Reply text (the canned fallback if generation failed).
    pub text: String,
    /// Mood after the turn.
    pub mood: Mood,
    /// Intensity after the turn.
    pub intensity: f32,
    /// How many behavior rules fired.
    pub rules_fired: usize,
    /// Whether `text` is the canned fallback.
    pub fallback: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A running conversation. Owns every participant's [`MoodState`] and the
/// shared history.
pub struct ConversationSession {
    id: SessionId,
    started_at: DateTime<Utc>,
    scenario: String,
    user_name: String,
    participants: Vec<Participant>,
    history: Vec<HistoryEntry>,
    classifier: MoodClassifier,
    generator: Arc<dyn TextGenerator>,
    prompts: Arc<PromptEngine>,
    config: SessionConfig,
    llm: LlmConfig,
}

impl ConversationSession {
    /// Start a session for `scenario` using the built-in prompts.
    #[must_use]
    pub fn new(
        scenario: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
        config: &TemperConfig,
    ) -> Self {
        Self::with_prompts(scenario, generator, Arc::new(PromptEngine::builtin()), config)
    }

    /// Start a session with an explicit prompt engine.
    #[must_use]
    pub fn with_prompts(
        scenario: impl Into<String>,
        generator: Arc<dyn TextGenerator>,
        prompts: Arc<PromptEngine>,
        config: &TemperConfig,
    ) -> Self {
        let id = SessionId::new();
        let scenario = scenario.into();
        info!(session = %id, generator = generator.name(), "session started");
        Self {
            id,
            started_at: Utc::now(),
            scenario,
            user_name: "User".to_string(),
            participants: Vec::new(),
            history: Vec::new(),
            classifier: MoodClassifier::new(
                generator.clone(),
                prompts.clone(),
                config.classifier.clone(),
                config.llm.clone(),
            ),
            generator,
            prompts,
            config: config.session.clone(),
            llm: config.llm.clone(),
        }
    }

    /// Name recorded on the user's history lines.
    #[must_use]
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = name.into();
        self
    }

    /// Add a character. Its opening mood comes from
    /// [`CharacterPersona::initial_mood`] at the configured intensity.
    ///
    /// # Errors
    /// Returns `SessionError::DuplicateCharacter` if the id is taken.
    pub fn add_character(
        &mut self,
        persona: impl Into<Arc<CharacterPersona>>,
        role_context: impl Into<String>,
    ) -> Result<()> {
        let persona = persona.into();
        if self.position(&persona.id).is_some() {
            return Err(SessionError::DuplicateCharacter(persona.id.clone()));
        }
        let state = MoodState::new(
            persona.initial_mood(&self.scenario),
            self.config.initial_intensity,
            SCENARIO_START_REASON,
        );
        debug!(
            session = %self.id,
            character = %persona.name,
            mood = %state.mood(),
            "character joined"
        );
        self.participants.push(Participant {
            persona,
            role_context: role_context.into(),
            state,
        });
        Ok(())
    }

    /// Session id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// When the session started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Scenario description.
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Shared history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Participants in insertion order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// A character's mood, by id or name (case-insensitive).
    #[must_use]
    pub fn mood_of(&self, character: &str) -> Option<&MoodState> {
        self.position(character).map(|i| &self.participants[i].state)
    }

    /// Replace a character's mood, e.g. with one restored from a
    /// `MoodRecord`.
    ///
    /// # Errors
    /// Returns `SessionError::UnknownCharacter` if the character is absent.
    pub fn restore_mood(&mut self, character: &str, state: MoodState) -> Result<()> {
        let idx = self.require(character)?;
        self.participants[idx].state = state;
        Ok(())
    }

    /// One user message answered by one character.
    ///
    /// Never fails because of the model: a classification failure keeps the
    /// prior mood and a reply failure or timeout yields the canned fallback
    /// reply, which is not written to history.
    ///
    /// # Errors
    /// Returns `SessionError::UnknownCharacter` if the character is absent.
    pub async fn respond(&mut self, character: &str, user_message: &str) -> Result<CharacterReply> {
        let idx = self.require(character)?;
        self.record_user(user_message);
        let reply = self.character_turn(idx, user_message).await;
        if !reply.fallback {
            self.record_character(&reply);
        }
        Ok(reply)
    }

    /// One user message answered by every character, in insertion order.
    ///
    /// Each reply is committed to history before the next character is
    /// classified, so later characters can react to earlier ones. A
    /// character whose turn fails is skipped.
    pub async fn group_turn(&mut self, user_message: &str) -> Vec<CharacterReply> {
        self.record_user(user_message);
        let mut replies = Vec::with_capacity(self.participants.len());
        for idx in 0..self.participants.len() {
            let reply = self.character_turn(idx, user_message).await;
            if reply.fallback {
                warn!(
                    session = %self.id,
                    character = %reply.character_name,
                    "no reply this turn, skipping character"
                );
                continue;
            }
            self.record_character(&reply);
            replies.push(reply);
        }
        replies
    }

    /// Run the pipeline for one character under the turn budget and commit
    /// the resulting mood.
    async fn character_turn(&mut self, idx: usize, user_message: &str) -> CharacterReply {
        let budget = Duration::from_millis(self.config.turn_timeout_ms);
        let outcome = tokio::time::timeout(budget, self.run_pipeline(idx, user_message)).await;

        let participant = &mut self.participants[idx];
        let (text, rules_fired, fallback) = match outcome {
            Ok((state, reply, rules_fired)) => {
                participant.state = state;
                match reply {
                    Some(text) => (text, rules_fired, false),
                    None => (self.config.fallback_reply.clone(), rules_fired, true),
                }
            }
            Err(_) => {
                warn!(
                    session = %self.id,
                    character = %participant.persona.name,
                    budget_ms = self.config.turn_timeout_ms,
                    "turn timed out, keeping pre-turn mood"
                );
                (self.config.fallback_reply.clone(), 0, true)
            }
        };

        CharacterReply {
            character_id: participant.persona.id.clone(),
            character_name: participant.persona.name.clone(),
            text,
            mood: participant.state.mood(),
            intensity: participant.state.intensity(),
            rules_fired,
            fallback,
        }
    }

    /// classify → match → assemble → generate. Reads only; the caller
    /// commits the returned state.
    async fn run_pipeline(&self, idx: usize, user_message: &str) -> (MoodState, Option<String>, usize) {
        let participant = &self.participants[idx];
        let persona = participant.persona.as_ref();

        let state = self
            .classifier
            .classify_and_update(
                persona,
                user_message,
                participant.state.clone(),
                &self.history,
                &self.scenario,
            )
            .await;

        let matches = match_rules(&state, user_message, &persona.rules);
        let block = assemble_instructions(persona, &state, &matches);
        let rules_fired = matches.len();

        let request = reply_request(
            &self.prompts,
            persona,
            &self.scenario,
            &participant.role_context,
            &block,
            &self.history,
            user_message,
            &self.llm,
        );

        let reply = match self.generator.generate(&request).await {
            Ok(response) if !response.text.trim().is_empty() => Some(response.text.trim().to_string()),
            Ok(_) => {
                warn!(character = %persona.name, "empty reply from generator");
                None
            }
            Err(e) => {
                warn!(character = %persona.name, error = %e, "reply generation failed");
                None
            }
        };

        (state, reply, rules_fired)
    }

    fn record_user(&mut self, content: &str) {
        let entry = HistoryEntry::user(self.user_name.clone(), content);
        self.push_history(entry);
    }

    fn record_character(&mut self, reply: &CharacterReply) {
        let entry = HistoryEntry::character(reply.character_name.clone(), reply.text.clone());
        self.push_history(entry);
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        let limit = self.config.history_limit.max(1);
        if self.history.len() > limit {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        self.participants.iter().position(|p| {
            p.persona.id.eq_ignore_ascii_case(key) || p.persona.name.eq_ignore_ascii_case(key)
        })
    }

    fn require(&self, key: &str) -> Result<usize> {
        self.position(key)
            .ok_or_else(|| SessionError::UnknownCharacter(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temper_llm::ScriptedGenerator;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn opening_moods_follow_personas() {
        let generator = Arc::new(ScriptedGenerator::new("mock"));
        let mut session = ConversationSession::new("An unrealistic deadline", generator, &TemperConfig::default());
        session
            .add_character(CharacterPersona::new("marcus", "Marcus").with_traits(&["Demanding"]), "Manager")
            .expect("add marcus");
        session
            .add_character(CharacterPersona::new("sarah", "Sarah"), "Peer")
            .expect("add sarah");

        let marcus = session.mood_of("Marcus").expect("marcus");
        assert_eq!(marcus.mood(), Mood::Impatient);
        assert!((marcus.intensity() - 0.3).abs() < f32::EPSILON);
        assert_eq!(marcus.reason(), SCENARIO_START_REASON);
        assert_eq!(session.mood_of("sarah").map(MoodState::mood), Some(Mood::Neutral));
    }

    #[test]
    fn duplicate_character_is_rejected() {
        let generator = Arc::new(ScriptedGenerator::new("mock"));
        let mut session = ConversationSession::new("", generator, &TemperConfig::default());
        session.add_character(CharacterPersona::new("casey", "Casey"), "").expect("first");
        assert!(matches!(
            session.add_character(CharacterPersona::new("casey", "Casey"), ""),
            Err(SessionError::DuplicateCharacter(_))
        ));
    }

    #[test]
    fn history_is_bounded() {
        let generator = Arc::new(ScriptedGenerator::new("mock"));
        let mut config = TemperConfig::default();
        config.session.history_limit = 3;
        let mut session = ConversationSession::new("", generator, &config);
        for i in 0..5 {
            session.record_user(&format!("line {i}"));
        }
        let contents: Vec<_> = session.history().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["line 2", "line 3", "line 4"]);
    }
}
