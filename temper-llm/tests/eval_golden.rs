//! Prompt quality evaluation: golden test set.
//!
//! A curated set of template + variables pairs with the text the rendered
//! prompt must (and must not) contain. These run offline and catch template
//! edits that drop a variable, lose the JSON contract or break character
//! framing.

use temper_llm::prompt::{self, PromptEngine, PromptId};

/// A golden test case for prompt evaluation.
struct GoldenCase {
    /// Human-readable name for the test case.
    name: &'static str,
    /// Which prompt template constant to use (system or user).
    template: &'static str,
    /// Template variables to fill in.
    vars: Vec<(&'static str, &'static str)>,
    /// Strings that MUST appear in the rendered prompt.
    prompt_must_contain: Vec<&'static str>,
    /// Strings that MUST NOT appear in the rendered prompt.
    prompt_must_not_contain: Vec<&'static str>,
}

fn analysis_vars(
    name: &'static str,
    mood: &'static str,
    message: &'static str,
) -> Vec<(&'static str, &'static str)> {
    vec![
        ("character_name", name),
        ("personality", "Results-driven, Impatient, Demanding"),
        ("communication_style", "Direct and confrontational"),
        ("biography_excerpt", "Thirty years in the industry..."),
        ("current_mood", mood),
        ("current_intensity", "0.6"),
        ("mood_trail", "skeptical → impatient"),
        ("scenario_excerpt", "The user must explain a missed deadline..."),
        ("recent_conversation", "User: Good morning\nyou said: Make it quick."),
        ("user_message", message),
        ("available_moods", "neutral, pleased, frustrated, angry"),
    ]
}

fn golden_cases() -> Vec<GoldenCase> {
    vec![
        // ---------------------------------------------------------------
        // 1. Mood analysis: excuses to a demanding boss
        // ---------------------------------------------------------------
        GoldenCase {
            name: "analysis_excuse_to_boss",
            template: prompt::MOOD_ANALYSIS_USER,
            vars: analysis_vars("Marcus", "impatient", "I can't make that deadline, it's too difficult"),
            prompt_must_contain: vec![
                "Marcus",
                "Current mood: impatient (intensity: 0.6)",
                "skeptical → impatient",
                "\"I can't make that deadline, it's too difficult\"",
                "you said: Make it quick.",
                "Available moods: neutral, pleased",
            ],
            prompt_must_not_contain: vec![
                "{character_name}",
                "{user_message}",
                "{mood_trail}",
                "TODO",
            ],
        },
        // ---------------------------------------------------------------
        // 2. Mood analysis: first turn, empty history
        // ---------------------------------------------------------------
        GoldenCase {
            name: "analysis_first_turn",
            template: prompt::MOOD_ANALYSIS_USER,
            vars: vec![
                ("character_name", "Sarah"),
                ("personality", "Empathetic, Supportive"),
                ("communication_style", "Warm"),
                ("biography_excerpt", "A mentor..."),
                ("current_mood", "neutral"),
                ("current_intensity", "0.3"),
                ("mood_trail", "(no earlier moods)"),
                ("scenario_excerpt", "A first one-on-one..."),
                ("recent_conversation", "(no earlier messages)"),
                ("user_message", "Hi, I'm a bit nervous"),
                ("available_moods", "neutral, pleased"),
            ],
            prompt_must_contain: vec![
                "Sarah",
                "(no earlier messages)",
                "(no earlier moods)",
                "nervous",
            ],
            prompt_must_not_contain: vec!["{recent_conversation}", "{current_intensity}"],
        },
        // ---------------------------------------------------------------
        // 3. Mood analysis keeps its JSON contract after rendering
        // ---------------------------------------------------------------
        GoldenCase {
            name: "analysis_json_contract",
            template: prompt::MOOD_ANALYSIS_USER,
            vars: analysis_vars("Patricia", "disappointed", "Here's my detailed project plan"),
            prompt_must_contain: vec![
                "\"mood\":",
                "\"intensity\":",
                "\"reason\":",
                "\"trigger_keywords\":",
                "JSON",
            ],
            prompt_must_not_contain: vec!["{available_moods}"],
        },
        GoldenCase {
            name: "analysis_system_demands_json",
            template: prompt::MOOD_ANALYSIS_SYSTEM,
            vars: vec![],
            prompt_must_contain: vec!["JSON"],
            prompt_must_not_contain: vec!["{"],
        },
        // ---------------------------------------------------------------
        // 4. Character system prompt: aggressive boss in a conflict
        // ---------------------------------------------------------------
        GoldenCase {
            name: "character_aggressive_conflict",
            template: prompt::CHARACTER_SYSTEM,
            vars: vec![
                ("character_name", "Marcus"),
                ("background", "You are a veteran executive who hates excuses."),
                ("scenario_context", "An unrealistic deadline"),
                ("role_context", "Your direct manager"),
                ("scenario_block", prompt::AGGRESSIVE_SCENARIO_BLOCK),
                ("communication_style", "Direct, confrontational"),
            ],
            prompt_must_contain: vec![
                "You are Marcus.",
                "stay in character as Marcus",
                "Scenario: An unrealistic deadline",
                "Your role in this scenario: Your direct manager",
                "Be confrontational",
                "Direct, confrontational",
            ],
            prompt_must_not_contain: vec!["{scenario_block}", "{background}"],
        },
        // ---------------------------------------------------------------
        // 5. Character system prompt: supportive colleague, no block
        // ---------------------------------------------------------------
        GoldenCase {
            name: "character_supportive_no_block",
            template: prompt::CHARACTER_SYSTEM,
            vars: vec![
                ("character_name", "Sarah"),
                ("background", "You are a patient team lead."),
                ("scenario_context", "Asking for feedback"),
                ("role_context", "A supportive colleague"),
                ("scenario_block", ""),
                ("communication_style", "Warm and encouraging"),
            ],
            prompt_must_contain: vec!["You are Sarah.", "A supportive colleague", "Never be sycophantic"],
            prompt_must_not_contain: vec!["Be confrontational", "{scenario_block}"],
        },
        // ---------------------------------------------------------------
        // 6. Character system prompt with a real-life reference
        // ---------------------------------------------------------------
        GoldenCase {
            name: "character_with_reference",
            template: prompt::CHARACTER_SYSTEM,
            vars: vec![
                ("character_name", "Michael"),
                ("background", "You run a paper company. Act and respond the way Michael Scott would."),
                ("scenario_context", "A team meeting"),
                ("role_context", "The regional manager"),
                ("scenario_block", ""),
                ("communication_style", "Awkward, eager"),
            ],
            prompt_must_contain: vec!["Michael Scott", "The regional manager"],
            prompt_must_not_contain: vec!["{role_context}"],
        },
        // ---------------------------------------------------------------
        // 7. Reply prompt with a character-scoped transcript
        // ---------------------------------------------------------------
        GoldenCase {
            name: "reply_group_transcript",
            template: prompt::CHARACTER_USER,
            vars: vec![
                ("transcript", "User: We need to talk\nMarcus said: Talk fast.\nyou said: Let them finish.\nUser: Thanks, Sarah"),
                ("user_message", "Thanks, Sarah"),
                ("character_name", "Sarah"),
            ],
            prompt_must_contain: vec![
                "Marcus said: Talk fast.",
                "you said: Let them finish.",
                "latest message was: \"Thanks, Sarah\"",
                "Reply as Sarah.",
            ],
            prompt_must_not_contain: vec!["{transcript}"],
        },
        GoldenCase {
            name: "reply_first_turn",
            template: prompt::CHARACTER_USER,
            vars: vec![
                ("transcript", "(no earlier messages)"),
                ("user_message", "Hello"),
                ("character_name", "Casey"),
            ],
            prompt_must_contain: vec!["(no earlier messages)", "was: \"Hello\"", "Reply as Casey."],
            prompt_must_not_contain: vec!["{user_message}"],
        },
        // ---------------------------------------------------------------
        // 8. Aggressive block on its own
        // ---------------------------------------------------------------
        GoldenCase {
            name: "aggressive_block_directives",
            template: prompt::AGGRESSIVE_SCENARIO_BLOCK,
            vars: vec![],
            prompt_must_contain: vec!["\n- Be confrontational", "intimidate", "defensive"],
            prompt_must_not_contain: vec!["{"],
        },
        // ---------------------------------------------------------------
        // 9. Character system prompt: supportive colleague in a conflict
        // ---------------------------------------------------------------
        GoldenCase {
            name: "character_supportive_conflict",
            template: prompt::CHARACTER_SYSTEM,
            vars: vec![
                ("character_name", "Sarah"),
                ("background", "You are a patient team lead."),
                ("scenario_context", "The user missed an unrealistic deadline"),
                ("role_context", "A colleague in the room"),
                ("scenario_block", prompt::SUPPORTIVE_SCENARIO_BLOCK),
                ("communication_style", "Warm and encouraging"),
            ],
            prompt_must_contain: vec![
                "personality.\n- Act as your character would in this situation.",
            ],
            prompt_must_not_contain: vec!["Be confrontational", "{scenario_block}"],
        },
    ]
}

// ---------------------------------------------------------------------------
// Offline Tests: Template Rendering Validation
// ---------------------------------------------------------------------------

#[test]
fn golden_prompts_render_without_unresolved_vars() {
    let cases = golden_cases();

    for case in &cases {
        let vars: Vec<(&str, &str)> = case.vars.clone();
        let rendered = prompt::render_template(case.template, &vars);

        for needle in &case.prompt_must_contain {
            assert!(
                rendered.contains(needle),
                "Golden case '{}': rendered prompt must contain '{}' but doesn't.\nRendered:\n{}",
                case.name,
                needle,
                rendered
            );
        }

        for needle in &case.prompt_must_not_contain {
            assert!(
                !rendered.contains(needle),
                "Golden case '{}': rendered prompt must NOT contain '{}' but does.\nRendered:\n{}",
                case.name,
                needle,
                rendered
            );
        }
    }
}

#[test]
fn golden_set_has_minimum_coverage() {
    let cases = golden_cases();
    assert!(
        cases.len() >= 10,
        "Golden set must have at least 10 test cases, got {}",
        cases.len()
    );
}

#[test]
fn shipped_templates_match_builtins() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/v1");
    let shipped = PromptEngine::from_directory(dir).expect("shipped prompts load");
    let builtin = PromptEngine::builtin();

    for id in PromptId::all() {
        let a = shipped.get(*id).expect("shipped template");
        let b = builtin.get(*id).expect("builtin template");
        assert_eq!(a.system, b.system, "system prompt drifted for {id}");
        assert_eq!(a.user, b.user, "user prompt drifted for {id}");
        assert_eq!(a.tier, b.tier, "tier drifted for {id}");
        assert_eq!(a.max_tokens, b.max_tokens, "max_tokens drifted for {id}");
        assert!(
            (a.temperature - b.temperature).abs() < f32::EPSILON,
            "temperature drifted for {id}"
        );
    }
}

#[test]
fn system_prompts_establish_identity() {
    let system_prompts = [
        ("mood_analysis", prompt::MOOD_ANALYSIS_SYSTEM),
        ("character", prompt::CHARACTER_SYSTEM),
    ];

    for (name, template) in &system_prompts {
        assert!(
            template.starts_with("You are"),
            "System prompt '{name}' must establish identity with 'You are'"
        );
    }
}
