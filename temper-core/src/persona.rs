//! Character personas: the static identity the engine reasons about, and the
//! roster they are loaded from.
//!
//! Personas are content data. The engine never mutates them; sessions share
//! one roster read-only.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TemperError};
use crate::mood::Mood;
use crate::rules::BehaviorRuleTable;

/// Traits that mark a character as naturally aggressive.
pub const AGGRESSIVE_TRAITS: &[&str] = &[
    "aggressive",
    "intimidating",
    "demanding",
    "confrontational",
    "bullying",
    "manipulative",
];

/// Traits that mark a character as empathetic.
pub const EMPATHETIC_TRAITS: &[&str] = &[
    "empathetic",
    "understanding",
    "supportive",
    "caring",
    "nurturing",
];

/// Scenario words that put an aggressive character on edge from the start.
pub const CONFLICT_KEYWORDS: &[&str] = &[
    "harassment",
    "bullying",
    "deadline",
    "unrealistic",
    "confronting",
];

/// Scenario words under which aggressive characters get the confrontational
/// block in their system prompt.
pub const AGGRESSIVE_SCENARIO_KEYWORDS: &[&str] = &[
    "harassment",
    "bullying",
    "abuse",
    "manipulation",
    "discrimination",
    "sabotage",
    "deadline",
    "unrealistic",
    "demanding",
    "confronting",
    "addiction",
    "denial",
    "ghosting",
    "cheating",
    "infidelity",
];

/// A character's stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPersona {
    /// Stable lookup key, e.g. `marcus`.
    pub id: String,
    /// Display name, e.g. `Marcus`.
    pub name: String,
    /// Background text. See [`CharacterPersona::describe`] when empty.
    #[serde(default)]
    pub biography: String,
    /// Personality traits, most defining first.
    #[serde(default)]
    pub personality_traits: Vec<String>,
    /// How the character talks.
    #[serde(default)]
    pub communication_style: String,
    /// Real-life person the character is modeled on.
    #[serde(default)]
    pub reference: Option<String>,
    /// Mood at scenario start. Derived from traits when absent.
    #[serde(default)]
    pub default_mood: Option<Mood>,
    /// Ordered behavior rules. The shared baseline table when absent.
    #[serde(default = "BehaviorRuleTable::default_table")]
    pub rules: BehaviorRuleTable,
}

impl CharacterPersona {
    /// A persona with the baseline rule table and no optional data.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            biography: String::new(),
            personality_traits: Vec::new(),
            communication_style: String::new(),
            reference: None,
            default_mood: None,
            rules: BehaviorRuleTable::default_table(),
        }
    }

    /// Set the biography.
    #[must_use]
    pub fn with_biography(mut self, biography: impl Into<String>) -> Self {
        self.biography = biography.into();
        self
    }

    /// Set the real-life reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Set the personality traits.
    #[must_use]
    pub fn with_traits(mut self, traits: &[&str]) -> Self {
        self.personality_traits = traits.iter().map(|t| (*t).to_string()).collect();
        self
    }

    /// Set the communication style.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.communication_style = style.into();
        self
    }

    /// Set the scenario-start mood.
    #[must_use]
    pub fn with_default_mood(mut self, mood: Mood) -> Self {
        self.default_mood = Some(mood);
        self
    }

    /// Replace the rule table. An empty table falls back to the baseline.
    #[must_use]
    pub fn with_rules(mut self, rules: BehaviorRuleTable) -> Self {
        self.rules = rules;
        self.normalize();
        self
    }

    /// Substitute the baseline rule table for an empty one.
    fn normalize(&mut self) {
        if self.rules.is_empty() {
            self.rules = BehaviorRuleTable::default_table();
        }
    }

    /// The biography, or one derived from name, traits and reference when
    /// none was given.
    #[must_use]
    pub fn describe(&self) -> String {
        if !self.biography.trim().is_empty() {
            return self.biography.clone();
        }
        let traits = self
            .personality_traits
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.reference {
            Some(reference) => format!(
                "You are {}, a character with {traits} traits. You act similar to {reference}.",
                self.name
            ),
            None => format!("You are {}, a character with {traits} traits.", self.name),
        }
    }

    fn has_any_trait(&self, set: &[&str]) -> bool {
        self.personality_traits
            .iter()
            .any(|t| set.contains(&t.trim().to_lowercase().as_str()))
    }

    /// Whether any trait is in [`AGGRESSIVE_TRAITS`] (case-insensitive).
    #[must_use]
    pub fn is_aggressive(&self) -> bool {
        self.has_any_trait(AGGRESSIVE_TRAITS)
    }

    /// Whether any trait is in [`EMPATHETIC_TRAITS`] (case-insensitive).
    #[must_use]
    pub fn is_empathetic(&self) -> bool {
        self.has_any_trait(EMPATHETIC_TRAITS)
    }

    /// Mood at scenario start. An explicit default wins; otherwise
    /// aggressive characters start impatient in a conflict scenario and
    /// skeptical elsewhere, everyone else neutral.
    #[must_use]
    pub fn initial_mood(&self, scenario_context: &str) -> Mood {
        if let Some(mood) = self.default_mood {
            return mood;
        }
        if !self.is_aggressive() {
            return Mood::Neutral;
        }
        if contains_any(scenario_context, CONFLICT_KEYWORDS) {
            Mood::Impatient
        } else {
            Mood::Skeptical
        }
    }
}

/// Whether `scenario_context` names any of the aggressive-scenario themes.
#[must_use]
pub fn is_aggressive_scenario(scenario_context: &str) -> bool {
    contains_any(scenario_context, AGGRESSIVE_SCENARIO_KEYWORDS)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    needles.iter().any(|n| lowered.contains(n))
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// An ordered set of personas loaded from TOML.
///
/// ```toml
/// [[characters]]
/// id = "marcus"
/// name = "Marcus"
/// personality_traits = ["Demanding", "Intimidating"]
///
/// [[characters.rules]]
/// mood = "frustrated"
/// trigger_keywords = ["plan", "timeline"]
/// intensity_threshold = 0.6
/// behaviors = ["Ask ONE hard question"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterRoster {
    #[serde(default)]
    characters: Vec<CharacterPersona>,
}

impl CharacterRoster {
    /// Build a roster from personas. Duplicate ids are rejected.
    ///
    /// # Errors
    /// Returns `TemperError::Config` on a duplicate id.
    pub fn new(characters: Vec<CharacterPersona>) -> Result<Self> {
        let mut roster = Self { characters };
        roster.validate()?;
        Ok(roster)
    }

    /// Load a roster from a TOML string.
    ///
    /// # Errors
    /// Returns `TemperError::Config` if the TOML is invalid or ids repeat.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut roster: Self =
            toml::from_str(toml_str).map_err(|e| TemperError::Config(e.to_string()))?;
        roster.validate()?;
        Ok(roster)
    }

    /// Load a roster from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    fn validate(&mut self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for persona in &mut self.characters {
            if !seen.insert(persona.id.to_lowercase()) {
                return Err(TemperError::Config(format!(
                    "duplicate character id: '{}'",
                    persona.id
                )));
            }
            for rule in persona.rules.rules() {
                if !(0.0..=1.0).contains(&rule.intensity_threshold) {
                    warn!(
                        character = %persona.id,
                        mood = %rule.mood,
                        threshold = rule.intensity_threshold,
                        "rule threshold outside [0, 1]"
                    );
                }
            }
            persona.normalize();
        }
        Ok(())
    }

    /// Look a persona up by id or display name, case-insensitively.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CharacterPersona> {
        let key = key.trim();
        self.characters
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(key) || p.name.eq_ignore_ascii_case(key))
    }

    /// Like [`CharacterRoster::get`] but fails on a miss.
    ///
    /// # Errors
    /// Returns `TemperError::UnknownCharacter` if nothing matches.
    pub fn require(&self, key: &str) -> Result<&CharacterPersona> {
        self.get(key)
            .ok_or_else(|| TemperError::UnknownCharacter(key.to_string()))
    }

    /// Personas in file order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterPersona> {
        self.characters.iter()
    }

    /// Number of personas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
