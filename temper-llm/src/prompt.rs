//! Prompt templates for mood analysis and in-character replies.
//!
//! Every prompt is a versioned, testable artifact. Built-in templates are
//! compiled in below; the same templates ship as TOML under `prompts/v1` and
//! can be overridden by loading a directory with
//! [`PromptEngine::from_directory`].

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::types::{LlmRequest, ModelTier};

/// System prompt for the mood analyst.
pub const MOOD_ANALYSIS_SYSTEM: &str =
    "You are a psychological analyst who reads how fictional characters feel. Respond only with valid JSON.";

/// Mood analysis task: one combined verdict (mood, intensity, reason,
/// triggers) per user message.
pub const MOOD_ANALYSIS_USER: &str = r#"Decide how {character_name} feels right after the user's latest message.

CHARACTER PROFILE:
- Name: {character_name}
- Personality: {personality}
- Communication style: {communication_style}
- Background: {biography_excerpt}
- Current mood: {current_mood} (intensity: {current_intensity})
- Recent mood trail: {mood_trail}

SCENARIO:
{scenario_excerpt}

RECENT CONVERSATION:
{recent_conversation}

USER'S LATEST MESSAGE:
"{user_message}"

Work out, in a single pass:
1. The MOOD {character_name} feels now.
2. How INTENSE it is, from 0.0 to 1.0.
3. WHY they feel it.
4. Which WORDS in the user's message triggered it.

Available moods: {available_moods}

Take the character into account:
- Aggressive characters (demanding, intimidating, bullying) escalate to anger quickly.
- Manipulative characters turn calculating when they are challenged.
- Empathetic characters soften when the user shows vulnerability.
- Follow the TRAJECTORY: is the user making things better or worse?

Reply with JSON only, in exactly this shape:
{"mood": "<one available mood>", "intensity": 0.7, "reason": "<short explanation>", "trigger_keywords": ["<word>", "<word>"]}

Example (user making excuses to a demanding boss):
{"mood": "frustrated", "intensity": 0.8, "reason": "The user is making excuses instead of owning the problem", "trigger_keywords": ["excuse", "can't", "difficult"]}

Example (user offering a concrete plan to a doubtful boss):
{"mood": "skeptical", "intensity": 0.6, "reason": "There is a plan, but it still has to prove itself", "trigger_keywords": ["plan", "proposal"]}

Example (user pushing back with evidence):
{"mood": "impressed", "intensity": 0.7, "reason": "The user held their ground with real data", "trigger_keywords": ["data", "specifically", "timeline"]}"#;

/// Static character instructions. The per-turn mood block is appended after
/// this text.
pub const CHARACTER_SYSTEM: &str = r#"You are {character_name}. {background}

CRITICAL: Always stay in character as {character_name}. Never break character or describe yourself as anything other than {character_name}.

Scenario: {scenario_context}

Your role in this scenario: {role_context}

Pay close attention to both the scenario and your role, and behave exactly as the role describes.

Guidelines:
- Keep replies short and natural, usually 10 to 50 words and never more than 50.
- Do not over-explain or sound robotic.
- React to the user's approach and tone.
- Remember what was said earlier in the conversation.
- You may refer back to your own earlier lines (for example "As I said before...").
- You may react to what other characters said (for example "I disagree with Sarah...").
- Stay consistent with your position and personality.{scenario_block}

Respond as {character_name} would, in your own communication style: {communication_style}. Never be sycophantic."#;

/// Extra directives for naturally aggressive characters in a conflict
/// scenario.
pub const AGGRESSIVE_SCENARIO_BLOCK: &str = r"
- Be confrontational and challenging from the start.
- Do not be sympathetic or understanding at first.
- Put pressure on the user and make them uncomfortable.
- Use your power or position to intimidate.
- Get defensive when challenged.
- Make the user work hard to get through to you.";

/// Directive for every other character in a conflict scenario.
pub const SUPPORTIVE_SCENARIO_BLOCK: &str = r"
- Act as your character would in this situation.";

/// Reply task: the character-scoped transcript and the new message.
pub const CHARACTER_USER: &str = r#"Conversation so far:
{transcript}

The user's latest message was: "{user_message}"

Reply as {character_name}."#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value in a single pass over the
/// template, so braces inside substituted values are never expanded.
/// Unknown placeholders and JSON braces are left in place.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match substitution {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

// ---------------------------------------------------------------------------
// PromptEngine: versioned TOML template loader
// ---------------------------------------------------------------------------

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Mood classification (fast tier).
    MoodAnalysis,
    /// In-character reply (quality tier).
    CharacterReply,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::MoodAnalysis => "mood_analysis.toml",
            Self::CharacterReply => "character_reply.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[Self::MoodAnalysis, Self::CharacterReply]
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MoodAnalysis => "mood_analysis",
            Self::CharacterReply => "character_reply",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mood_analysis" => Ok(Self::MoodAnalysis),
            "character_reply" => Ok(Self::CharacterReply),
            _ => Err(format!("unknown prompt id: '{s}'")),
        }
    }
}

/// Metadata and templates parsed from a TOML prompt file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: PromptTemplate,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromptTemplate {
    /// Prompt version string (e.g., "1.0").
    pub version: String,
    /// Model tier this prompt is written for.
    pub tier: ModelTier,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// System prompt template (contains `{key}` placeholders).
    pub system: String,
    /// User prompt template (contains `{key}` placeholders).
    pub user: String,
}

/// Engine that loads versioned TOML prompt templates and renders them.
///
/// # Example
///
/// ```no_run
/// use temper_llm::prompt::{PromptEngine, PromptId};
///
/// let engine = PromptEngine::from_directory("temper-llm/prompts/v1").unwrap();
/// let (system, user) = engine
///     .render(PromptId::CharacterReply, &[("character_name", "Marcus")])
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl PromptEngine {
    /// Create a `PromptEngine` pre-loaded with the compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = PromptId::all()
            .iter()
            .map(|id| (*id, builtin_template(*id)))
            .collect();
        Self { templates }
    }

    /// Load prompt templates from a directory of TOML files.
    ///
    /// Each TOML file must match a known [`PromptId`] filename. Unknown
    /// files are ignored; a known prompt missing from the directory keeps
    /// its built-in template.
    ///
    /// # Errors
    ///
    /// Returns an error if no known file exists, or if one exists but
    /// cannot be parsed.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, String> {
        let dir = dir.as_ref();
        let mut engine = Self::builtin();
        let mut loaded = 0usize;

        for id in PromptId::all() {
            let path: PathBuf = dir.join(id.filename());
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
                let parsed: TomlPromptFile = toml::from_str(&content)
                    .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
                engine.templates.insert(*id, parsed.prompt);
                loaded += 1;
            }
        }

        if loaded == 0 {
            return Err(format!(
                "no prompt templates found in directory: {}",
                dir.display()
            ));
        }

        Ok(engine)
    }

    /// Get a loaded prompt template by ID.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Render both system and user prompts for a given ID.
    ///
    /// Returns `(system_prompt, user_prompt)` with all known `{key}`
    /// placeholders replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt ID is not loaded.
    pub fn render(
        &self,
        id: PromptId,
        vars: &[(&str, &str)],
    ) -> Result<(String, String), String> {
        let tpl = self.get(id).ok_or_else(|| {
            format!("prompt template '{id}' not loaded")
        })?;

        let system = render_template(&tpl.system, vars);
        let user = render_template(&tpl.user, vars);
        Ok((system, user))
    }

    /// Render a prompt into a ready-to-send request carrying the template's
    /// tier and sampling settings.
    ///
    /// A prompt missing from this engine renders from its compiled-in
    /// template.
    #[must_use]
    pub fn request(&self, id: PromptId, vars: &[(&str, &str)]) -> LlmRequest {
        let tpl = self.get(id).cloned().unwrap_or_else(|| builtin_template(id));
        LlmRequest {
            system: render_template(&tpl.system, vars),
            user: render_template(&tpl.user, vars),
            tier: tpl.tier,
            max_tokens: tpl.max_tokens,
            temperature: tpl.temperature,
            timeout_ms: LlmRequest::DEFAULT_TIMEOUT_MS,
        }
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// List all loaded prompt IDs.
    #[must_use]
    pub fn loaded_ids(&self) -> Vec<PromptId> {
        self.templates.keys().copied().collect()
    }
}

fn builtin_template(id: PromptId) -> PromptTemplate {
    match id {
        PromptId::MoodAnalysis => PromptTemplate {
            version: "builtin".into(),
            tier: ModelTier::Fast,
            max_tokens: 300,
            temperature: 0.3,
            system: MOOD_ANALYSIS_SYSTEM.into(),
            user: MOOD_ANALYSIS_USER.into(),
        },
        PromptId::CharacterReply => PromptTemplate {
            version: "builtin".into(),
            tier: ModelTier::Quality,
            max_tokens: 500,
            temperature: 0.7,
            system: CHARACTER_SYSTEM.into(),
            user: CHARACTER_USER.into(),
        },
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::builtin()
    }
}
