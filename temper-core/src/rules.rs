//! Behavior rules: conditional mappings from (mood, intensity, keywords) to
//! directive text, and the pure matcher over an ordered rule table.
//!
//! A rule is inert unless all three of its conditions hold at once:
//!
//! - the character's current mood equals the rule's mood exactly
//! - the current intensity is at least the rule's threshold
//! - at least one trigger keyword occurs in the lower-cased user message
//!
//! Every satisfied rule is returned, in table order.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::mood::{Mood, MoodState};

/// A conditional mapping from a mood, a keyword set and an intensity floor
/// to a list of imperative directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRule {
    /// The mood this rule activates under.
    pub mood: Mood,
    /// Substrings, any one of which must appear in the user message.
    pub trigger_keywords: Vec<String>,
    /// Minimum intensity (inclusive).
    pub intensity_threshold: f32,
    /// Directives handed to the generator when the rule fires.
    pub behaviors: Vec<String>,
}

impl BehaviorRule {
    /// Build a rule from borrowed string slices.
    #[must_use]
    pub fn new(mood: Mood, triggers: &[&str], intensity_threshold: f32, behaviors: &[&str]) -> Self {
        Self {
            mood,
            trigger_keywords: triggers.iter().map(|s| (*s).to_string()).collect(),
            intensity_threshold,
            behaviors: behaviors.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Keywords of this rule found in `lowered_message`, in rule order.
    /// Blank keywords never match.
    fn keywords_in<'r>(&'r self, lowered_message: &str) -> Vec<&'r str> {
        self.trigger_keywords
            .iter()
            .map(String::as_str)
            .filter(|k| {
                let k = k.trim();
                !k.is_empty() && lowered_message.contains(&k.to_lowercase())
            })
            .collect()
    }
}

/// A rule that fired, with the keywords that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<'t> {
    /// The matched rule.
    pub rule: &'t BehaviorRule,
    /// Keywords of the rule present in the message, in rule order.
    pub matched_keywords: Vec<&'t str>,
}

impl Deref for RuleMatch<'_> {
    type Target = BehaviorRule;

    fn deref(&self) -> &Self::Target {
        self.rule
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// An ordered, read-only collection of behavior rules owned by one persona.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehaviorRuleTable {
    rules: Vec<BehaviorRule>,
}

impl BehaviorRuleTable {
    /// A table with exactly these rules, in this order.
    #[must_use]
    pub fn new(rules: Vec<BehaviorRule>) -> Self {
        Self { rules }
    }

    /// The shared baseline table used by characters without custom rules.
    #[must_use]
    pub fn default_table() -> Self {
        Self {
            rules: Mood::ALL.into_iter().flat_map(default_rules_for).collect(),
        }
    }

    /// Rules in table order.
    #[must_use]
    pub fn rules(&self) -> &[BehaviorRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules keyed on `mood`, in table order.
    pub fn for_mood(&self, mood: Mood) -> impl Iterator<Item = &BehaviorRule> {
        self.rules.iter().filter(move |r| r.mood == mood)
    }

    /// See [`match_rules`].
    #[must_use]
    pub fn matching(&self, state: &MoodState, user_message: &str) -> Vec<RuleMatch<'_>> {
        match_rules(state, user_message, self)
    }
}

/// Every rule in `table` whose mood, threshold and keyword conditions all
/// hold for `state` and `user_message`, in table order.
///
/// Pure: identical inputs always produce identical, identically ordered
/// output.
#[must_use]
pub fn match_rules<'t>(
    state: &MoodState,
    user_message: &str,
    table: &'t BehaviorRuleTable,
) -> Vec<RuleMatch<'t>> {
    let lowered = user_message.to_lowercase();
    table
        .rules
        .iter()
        .filter(|rule| rule.mood == state.mood() && state.intensity() >= rule.intensity_threshold)
        .filter_map(|rule| {
            let matched_keywords = rule.keywords_in(&lowered);
            (!matched_keywords.is_empty()).then_some(RuleMatch {
                rule,
                matched_keywords,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Baseline content
// ---------------------------------------------------------------------------

/// Baseline rules for one mood. Moods without baseline behavior return an
/// empty list; adding a mood forces a decision here.
#[must_use]
pub fn default_rules_for(mood: Mood) -> Vec<BehaviorRule> {
    match mood {
        Mood::Angry => vec![
            BehaviorRule::new(
                mood,
                &["excuse", "can't", "impossible", "but", "however", "difficult"],
                0.7,
                &[
                    "Use CAPS to emphasize your anger and frustration",
                    "Interrupt or dismiss their excuses immediately",
                    "Threaten consequences (e.g., 'If you can't handle this...')",
                    "Question their competence directly",
                    "Be openly hostile and confrontational",
                ],
            ),
            BehaviorRule::new(
                mood,
                &["sorry", "apologize", "my fault"],
                0.6,
                &[
                    "Don't accept the apology immediately",
                    "Point out the damage caused",
                    "Stay angry but slightly less hostile",
                    "Demand specific changes, not just words",
                ],
            ),
        ],
        Mood::Frustrated => vec![
            BehaviorRule::new(
                mood,
                &["excuse", "reason", "because", "explain", "justify"],
                0.6,
                &[
                    "Use short, terse responses (5-15 words)",
                    "Make pointed comments about time-wasting",
                    "Show visible impatience in your tone",
                    "Cut them off with 'I don't want to hear it'",
                ],
            ),
            BehaviorRule::new(
                mood,
                &["plan", "proposal", "solution", "alternative"],
                0.5,
                &[
                    "Show slight interest but remain skeptical",
                    "Demand details and proof",
                    "Don't soften completely, stay guarded",
                    "Test their plan with hard questions",
                ],
            ),
        ],
        Mood::Skeptical => vec![
            BehaviorRule::new(
                mood,
                &["promise", "guarantee", "definitely", "trust me"],
                0.5,
                &[
                    "Challenge their claims with specific questions",
                    "Ask for evidence or proof",
                    "Reference past failures or broken promises",
                    "Make them work to convince you",
                ],
            ),
            BehaviorRule::new(
                mood,
                &["data", "proof", "evidence", "example", "specifically"],
                0.4,
                &[
                    "Acknowledge they're being concrete",
                    "Still maintain some doubt",
                    "Ask follow-up questions to verify",
                    "Soften slightly if evidence is solid",
                ],
            ),
        ],
        Mood::Impatient => vec![BehaviorRule::new(
            mood,
            &["need time", "more time", "wait", "later", "eventually"],
            0.5,
            &[
                "Express urgency and time pressure",
                "Push for immediate action",
                "Show irritation at delays",
                "Demand specific timelines, not vague promises",
            ],
        )],
        Mood::Impressed => vec![BehaviorRule::new(
            mood,
            &["solution", "plan", "analysis", "data", "strategy"],
            0.6,
            &[
                "Acknowledge their competence (grudgingly if aggressive character)",
                "Show genuine interest in their proposal",
                "Ask constructive questions instead of attacking",
                "Still maintain your authority but be less hostile",
            ],
        )],
        Mood::Defensive => vec![BehaviorRule::new(
            mood,
            &["wrong", "mistake", "fault", "blame", "should have"],
            0.5,
            &[
                "Immediately justify your position",
                "Shift blame to external factors or others",
                "Get aggressive when feeling attacked",
                "Refuse to take responsibility initially",
            ],
        )],
        Mood::Dismissive => vec![BehaviorRule::new(
            mood,
            &["concern", "worried", "afraid", "feel", "think"],
            0.6,
            &[
                "Minimize or trivialize their concerns",
                "Use condescending language",
                "Make it clear their opinion doesn't matter",
                "Focus on 'facts' to dismiss their feelings",
            ],
        )],
        Mood::Pleased => vec![BehaviorRule::new(
            mood,
            &["done", "completed", "finished", "success", "results"],
            0.5,
            &[
                "Show approval (within character limits)",
                "Acknowledge good work",
                "Be more open to future collaboration",
                "Still maintain professional distance if aggressive character",
            ],
        )],
        Mood::Neutral
        | Mood::Encouraged
        | Mood::Respectful
        | Mood::Annoyed
        | Mood::Disappointed
        | Mood::Hostile
        | Mood::Contemptuous
        | Mood::Manipulative
        | Mood::Calculating => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(mood: Mood, intensity: f32) -> MoodState {
        MoodState::new(mood, intensity, "test")
    }

    fn single(mood: Mood, triggers: &[&str], threshold: f32) -> BehaviorRuleTable {
        BehaviorRuleTable::new(vec![BehaviorRule::new(
            mood,
            triggers,
            threshold,
            &["do the thing"],
        )])
    }

    #[test]
    fn threshold_is_inclusive() {
        let table = single(Mood::Angry, &["late"], 0.7);
        assert!(match_rules(&state(Mood::Angry, 0.69), "you're late", &table).is_empty());
        assert_eq!(match_rules(&state(Mood::Angry, 0.70), "you're late", &table).len(), 1);
    }

    #[test]
    fn mood_must_match_exactly() {
        let table = single(Mood::Angry, &["late"], 0.1);
        assert!(match_rules(&state(Mood::Frustrated, 1.0), "late late late", &table).is_empty());
    }

    #[test]
    fn keyword_required() {
        let table = single(Mood::Angry, &["late"], 0.1);
        assert!(match_rules(&state(Mood::Angry, 1.0), "on time today", &table).is_empty());
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let table = single(Mood::Skeptical, &["Trust Me"], 0.1);
        let matches = match_rules(&state(Mood::Skeptical, 0.5), "Honestly, TRUST ME on this", &table);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_keywords, vec!["Trust Me"]);
    }

    #[test]
    fn blank_keywords_never_match() {
        let table = single(Mood::Angry, &["", "  "], 0.0);
        assert!(match_rules(&state(Mood::Angry, 1.0), "anything", &table).is_empty());
    }

    #[test]
    fn all_matches_returned_in_table_order() {
        let table = BehaviorRuleTable::default_table();
        let s = state(Mood::Angry, 0.9);
        let matches = match_rules(&s, "Sorry, but it's impossible", &table);
        assert_eq!(matches.len(), 2);
        assert!(matches[0].trigger_keywords.contains(&"excuse".to_string()));
        assert_eq!(matches[0].matched_keywords, vec!["impossible", "but"]);
        assert_eq!(matches[1].matched_keywords, vec!["sorry"]);
    }

    #[test]
    fn matching_is_repeatable() {
        let table = BehaviorRuleTable::default_table();
        let s = state(Mood::Frustrated, 0.8);
        let msg = "Because of the plan, I have a reason to explain";
        assert_eq!(match_rules(&s, msg, &table), match_rules(&s, msg, &table));
    }

    #[test]
    fn default_table_covers_baseline_moods() {
        let table = BehaviorRuleTable::default_table();
        for mood in [
            Mood::Angry,
            Mood::Frustrated,
            Mood::Skeptical,
            Mood::Impatient,
            Mood::Impressed,
            Mood::Defensive,
            Mood::Dismissive,
            Mood::Pleased,
        ] {
            assert!(table.for_mood(mood).count() >= 1, "no baseline rule for {mood}");
        }
        assert_eq!(table.for_mood(Mood::Neutral).count(), 0);
        assert_eq!(table.len(), 11);
    }

    #[test]
    fn empty_table_matches_nothing() {
        let table = BehaviorRuleTable::default();
        assert!(table.is_empty());
        assert!(table.matching(&state(Mood::Angry, 1.0), "excuse").is_empty());
    }
}
