//! temper benchmark suite.
//!
//! Everything between the two model calls of a turn is synchronous and runs
//! on the conversation's task, so it has to stay well under a millisecond:
//!   extract_clean_json ............... < 20μs
//!   extract_worst_case_fallback ...... < 100μs
//!   match_rules_default_table ........ < 10μs
//!   assemble_instructions_three_rules  < 20μs
//!   full_sync_turn ................... < 150μs

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use temper_core::adjust::reconcile;
use temper_core::extract::extract_verdict;
use temper_core::{
    BehaviorRule, BehaviorRuleTable, CharacterPersona, ClassifierConfig, HistoryEntry, Mood,
    MoodState, assemble_instructions, filter_history_for_character, match_rules,
};

const CLEAN: &str = r#"{"mood": "frustrated", "intensity": 0.8, "reason": "Excuses instead of ownership", "trigger_keywords": ["can't", "difficult"]}"#;

/// Prose, a broken fence and a literal newline inside a string: forces the
/// extractor down to its field-regex stage.
const WORST_CASE: &str = "Let me think about this {carefully.\nThe character would be:\n\"mood\": \"angry\",\n\"intensity\": 0.9,\n\"reason\": \"Late again and\nstill making excuses\",\n\"trigger_keywords\": \"late, excuse\"";

const MESSAGE: &str = "Sorry, I can't make that deadline, it's too difficult and there's no plan yet";

fn persona() -> CharacterPersona {
    CharacterPersona::new("marcus", "Marcus")
        .with_traits(&["Results-driven", "Impatient", "Demanding", "Intimidating"])
        .with_rules(BehaviorRuleTable::new(vec![
            BehaviorRule::new(Mood::Frustrated, &["excuse", "can't", "difficult"], 0.6, &["Cut them off"]),
            BehaviorRule::new(Mood::Frustrated, &["plan", "proposal", "timeline"], 0.6, &["Ask ONE hard question"]),
            BehaviorRule::new(Mood::Frustrated, &["sorry"], 0.5, &["Wave the apology away", "Demand a date"]),
        ]))
}

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_clean_json", |b| {
        b.iter(|| black_box(extract_verdict(black_box(CLEAN))));
    });
    c.bench_function("extract_worst_case_fallback", |b| {
        b.iter(|| black_box(extract_verdict(black_box(WORST_CASE))));
    });
}

fn bench_match_rules(c: &mut Criterion) {
    let table = BehaviorRuleTable::default_table();
    let state = MoodState::new(Mood::Frustrated, 0.8, "excuses");
    c.bench_function("match_rules_default_table", |b| {
        b.iter(|| black_box(match_rules(black_box(&state), black_box(MESSAGE), &table)));
    });
}

fn bench_assemble(c: &mut Criterion) {
    let persona = persona();
    let mut state = MoodState::new(Mood::Impatient, 0.6, "start");
    state.transition(Mood::Frustrated, 0.9, "excuses", vec!["can't".into()]);
    let matches = match_rules(&state, MESSAGE, &persona.rules);
    assert_eq!(matches.len(), 3);

    c.bench_function("assemble_instructions_three_rules", |b| {
        b.iter(|| black_box(assemble_instructions(&persona, black_box(&state), &matches)));
    });
}

fn bench_full_sync_turn(c: &mut Criterion) {
    let persona = persona();
    let config = ClassifierConfig::default();
    let history: Vec<HistoryEntry> = (0..20)
        .map(|i| {
            if i % 2 == 0 {
                HistoryEntry::user("Alex", format!("message {i}"))
            } else {
                HistoryEntry::character(if i % 3 == 0 { "Sarah" } else { "Marcus" }, format!("reply {i}"))
            }
        })
        .collect();

    c.bench_function("full_sync_turn", |b| {
        b.iter(|| {
            let view = filter_history_for_character(black_box(&history), "Marcus");
            let mut state = MoodState::new(Mood::Impatient, 0.6, "start");
            let verdict = reconcile(extract_verdict(black_box(CLEAN)), state.mood(), &persona, MESSAGE, &config);
            state.transition(verdict.mood, verdict.intensity, verdict.reason, verdict.trigger_keywords);
            let matches = match_rules(&state, MESSAGE, &persona.rules);
            black_box((view, assemble_instructions(&persona, &state, &matches)))
        });
    });
}

criterion_group!(
    benches,
    bench_extract,
    bench_match_rules,
    bench_assemble,
    bench_full_sync_turn,
);
criterion_main!(benches);
