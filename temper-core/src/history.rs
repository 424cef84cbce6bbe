//! Conversation history and its per-character view.
//!
//! The shared history of a multi-character conversation is never shown to a
//! model as-is. Each character sees its own lines as "you said" and other
//! characters' lines attributed by name, which keeps self-references
//! consistent without exposing anyone's internal mood.

use serde::{Deserialize, Serialize};

/// Who produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human participant.
    User,
    /// One of the characters.
    Character,
}

/// One line of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who spoke.
    pub role: Role,
    /// What was said.
    pub content: String,
    /// Display name of the speaker.
    pub speaker_name: String,
}

impl HistoryEntry {
    /// A line from the user.
    #[must_use]
    pub fn user(speaker_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            speaker_name: speaker_name.into(),
        }
    }

    /// A line from a character.
    #[must_use]
    pub fn character(speaker_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Character,
            content: content.into(),
            speaker_name: speaker_name.into(),
        }
    }
}

/// Rewrite `history` from `character_name`'s point of view.
///
/// The character's own lines become `you said: ...`, other characters' lines
/// become `<name> said: ...` and user lines pass through unchanged. Names
/// compare case-insensitively. The input is never modified.
#[must_use]
pub fn filter_history_for_character(history: &[HistoryEntry], character_name: &str) -> Vec<HistoryEntry> {
    let target = character_name.trim();
    history
        .iter()
        .map(|entry| match entry.role {
            Role::User => entry.clone(),
            Role::Character => {
                let content = if entry.speaker_name.trim().eq_ignore_ascii_case(target) {
                    format!("you said: {}", entry.content)
                } else {
                    format!("{} said: {}", entry.speaker_name, entry.content)
                };
                HistoryEntry {
                    role: Role::Character,
                    content,
                    speaker_name: entry.speaker_name.clone(),
                }
            }
        })
        .collect()
}

/// The last `n` entries of `history` (all of them if shorter).
#[must_use]
pub fn recent_window(history: &[HistoryEntry], n: usize) -> &[HistoryEntry] {
    &history[history.len().saturating_sub(n)..]
}

/// Render entries as prompt lines: `User: ...` for user lines, the
/// already-attributed content for character lines.
#[must_use]
pub fn render_transcript(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|e| match e.role {
            Role::User => format!("User: {}", e.content),
            Role::Character => e.content.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry::user("Alex", "I need more time on the report"),
            HistoryEntry::character("Marcus", "Time is the one thing you don't have."),
            HistoryEntry::character("Sarah", "Let's hear Alex out."),
            HistoryEntry::user("Alex", "Thanks, Sarah"),
        ]
    }

    #[test]
    fn own_lines_become_first_person() {
        let view = filter_history_for_character(&sample(), "marcus");
        assert_eq!(view[1].content, "you said: Time is the one thing you don't have.");
        assert_eq!(view[2].content, "Sarah said: Let's hear Alex out.");
    }

    #[test]
    fn user_lines_pass_through() {
        let history = sample();
        let view = filter_history_for_character(&history, "Marcus");
        assert_eq!(view[0], history[0]);
        assert_eq!(view[3], history[3]);
    }

    #[test]
    fn input_is_not_mutated() {
        let history = sample();
        let before = history.clone();
        let _ = filter_history_for_character(&history, "Sarah");
        assert_eq!(history, before);
    }

    #[test]
    fn empty_history_gives_empty_view() {
        assert!(filter_history_for_character(&[], "Marcus").is_empty());
    }

    #[test]
    fn recent_window_takes_suffix() {
        let history = sample();
        assert_eq!(recent_window(&history, 2), &history[2..]);
        assert_eq!(recent_window(&history, 10).len(), 4);
        assert!(recent_window(&history, 0).is_empty());
    }

    #[test]
    fn transcript_prefixes_user_lines() {
        let view = filter_history_for_character(&sample()[..2], "Sarah");
        assert_eq!(
            render_transcript(&view),
            "User: I need more time on the report\nMarcus said: Time is the one thing you don't have."
        );
    }
}
