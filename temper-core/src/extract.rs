//! Response extraction: recover a mood verdict from untrusted model text.
//!
//! Stages run in order and the first one that yields a record containing a
//! `mood` field wins:
//!
//! 1. brace-matched object (after stripping a markdown code fence)
//! 2. first flat `{...}` span with no nested braces
//! 3. the whole trimmed text as one object
//! 4. field-by-field regexes tolerant of missing quotes and raw newlines
//! 5. the default neutral record
//!
//! Whatever survives is validated into a [`MoodVerdict`]. Nothing here can
//! fail: the worst case is the default record.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::mood::{FALLBACK_INTENSITY, Mood, PLACEHOLDER_REASON, clamp_intensity};

/// Reason carried by the default record when nothing could be recovered.
pub const PARSE_FAILED_REASON: &str = "parsing failed";

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|JSON)?\s*\n?([\s\S]*?)\n?```").expect("static pattern")
});
static FLAT_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("static pattern"));

// The leading group stands in for a word boundary that also rejects `_`, so
// `previous_mood` never matches as `mood`.
static MOOD_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[^a-z0-9_])["']?mood["']?\s*[:=]\s*["']?([a-z]+)"#)
        .expect("static pattern")
});
static INTENSITY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[^a-z0-9_])["']?intensity["']?\s*[:=]\s*["']?(-?\d*\.?\d+)"#)
        .expect("static pattern")
});
static REASON_QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(?:^|[^a-z0-9_])["']?reason["']?\s*[:=]\s*"((?:[^"\\]|\\.)*)""#)
        .expect("static pattern")
});
static REASON_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[^a-z0-9_])["']?reason["']?\s*[:=]\s*"?([^"\n}]+)"#)
        .expect("static pattern")
});
static TRIGGERS_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(?:^|[^a-z0-9_])["']?trigger(?:_keywords|s)["']?\s*[:=]\s*\[(.*?)\]"#)
        .expect("static pattern")
});
static TRIGGERS_STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(?:^|[^a-z0-9_])["']?trigger(?:_keywords|s)["']?\s*[:=]\s*"((?:[^"\\]|\\.)*)""#)
        .expect("static pattern")
});
static TRIGGERS_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[^a-z0-9_])["']?trigger(?:_keywords|s)["']?\s*[:=]\s*([^\n\]}]+)"#)
        .expect("static pattern")
});
static QUOTED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("static pattern"));

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A validated mood classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodVerdict {
    /// A member of the closed mood set.
    pub mood: Mood,
    /// Within `[0, 1]`.
    pub intensity: f32,
    /// Non-empty rationale.
    pub reason: String,
    /// Trimmed, non-empty keywords.
    pub trigger_keywords: Vec<String>,
}

impl Default for MoodVerdict {
    fn default() -> Self {
        Self {
            mood: Mood::Neutral,
            intensity: FALLBACK_INTENSITY,
            reason: PARSE_FAILED_REASON.to_string(),
            trigger_keywords: Vec::new(),
        }
    }
}

/// Which extraction stage produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    /// Brace-matched object.
    BraceMatched,
    /// Flat `{...}` span.
    FlatObject,
    /// Whole input decoded.
    WholeText,
    /// Individual field regexes.
    FieldRegex,
    /// Nothing recovered.
    Default,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BraceMatched => "brace_matched",
            Self::FlatObject => "flat_object",
            Self::WholeText => "whole_text",
            Self::FieldRegex => "field_regex",
            Self::Default => "default",
        })
    }
}

/// A verdict together with the stage that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The validated verdict.
    pub verdict: MoodVerdict,
    /// The stage that produced it.
    pub stage: ExtractionStage,
}

/// Unvalidated fields as recovered from the text.
#[derive(Debug, Default)]
struct RawFields {
    mood: Option<String>,
    intensity: Option<String>,
    reason: Option<String>,
    trigger_keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Recover a validated verdict from arbitrary text. Never fails.
#[must_use]
pub fn extract_verdict(raw: &str) -> MoodVerdict {
    extract(raw).verdict
}

/// Like [`extract_verdict`] but also reports which stage succeeded.
#[must_use]
pub fn extract(raw: &str) -> Extraction {
    let trimmed = raw.trim();
    let unfenced = strip_code_fence(trimmed);

    let (stage, fields) = brace_matched(unfenced)
        .and_then(decode_object)
        .map(|f| (ExtractionStage::BraceMatched, f))
        .or_else(|| {
            FLAT_OBJECT_RE
                .find(trimmed)
                .and_then(|m| decode_object(m.as_str()))
                .map(|f| (ExtractionStage::FlatObject, f))
        })
        .or_else(|| decode_object(trimmed).map(|f| (ExtractionStage::WholeText, f)))
        .or_else(|| field_regex(trimmed).map(|f| (ExtractionStage::FieldRegex, f)))
        .unwrap_or((ExtractionStage::Default, RawFields::default()));

    if stage == ExtractionStage::Default {
        warn!(input_len = raw.len(), "no mood verdict recoverable, using default");
        return Extraction {
            verdict: MoodVerdict::default(),
            stage,
        };
    }

    let verdict = validate(fields);
    debug!(%stage, mood = %verdict.mood, intensity = verdict.intensity, "extracted mood verdict");
    Extraction { verdict, stage }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

fn strip_code_fence(input: &str) -> &str {
    CODE_FENCE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map_or(input, |m| m.as_str())
}

/// The span from the first `{` to its matching `}`, string-aware.
fn brace_matched(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let tail = &input[start..];
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in tail.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&tail[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strict decode into an object that carries a `mood` key.
fn decode_object(candidate: &str) -> Option<RawFields> {
    let Value::Object(map) = serde_json::from_str::<Value>(candidate).ok()? else {
        return None;
    };
    let mood = map.get("mood")?;

    Some(RawFields {
        mood: Some(scalar_to_string(mood)),
        intensity: map.get("intensity").map(scalar_to_string),
        reason: map
            .get("reason")
            .filter(|v| !v.is_null())
            .map(scalar_to_string),
        trigger_keywords: map
            .get("trigger_keywords")
            .or_else(|| map.get("triggers"))
            .map(keywords_from_value)
            .unwrap_or_default(),
    })
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn keywords_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(scalar_to_string)
            .collect(),
        Value::String(s) => split_commas(s),
        _ => Vec::new(),
    }
}

fn field_regex(input: &str) -> Option<RawFields> {
    let mood = MOOD_FIELD_RE.captures(input)?.get(1)?.as_str().to_string();

    let intensity = INTENSITY_FIELD_RE
        .captures(input)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let reason = REASON_QUOTED_RE
        .captures(input)
        .or_else(|| REASON_BARE_RE.captures(input))
        .and_then(|c| c.get(1))
        .map(|m| unescape(m.as_str()));

    let trigger_keywords = if let Some(body) = TRIGGERS_ARRAY_RE.captures(input).and_then(|c| c.get(1)) {
        let quoted: Vec<String> = QUOTED_ITEM_RE
            .captures_iter(body.as_str())
            .filter_map(|c| c.get(1))
            .map(|m| unescape(m.as_str()))
            .collect();
        if quoted.is_empty() {
            split_commas(body.as_str())
        } else {
            quoted
        }
    } else if let Some(m) = TRIGGERS_STRING_RE.captures(input).and_then(|c| c.get(1)) {
        split_commas(&unescape(m.as_str()))
    } else if let Some(m) = TRIGGERS_BARE_RE.captures(input).and_then(|c| c.get(1)) {
        split_commas(m.as_str())
    } else {
        Vec::new()
    };

    Some(RawFields {
        mood: Some(mood),
        intensity,
        reason,
        trigger_keywords,
    })
}

fn split_commas(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .trim_matches(|c| matches!(c, '"' | '\'' | '[' | ']'))
                .trim()
                .to_string()
        })
        .collect()
}

/// Resolve `\n`, `\t`, `\"` and `\\`. Other escapes are kept verbatim.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[allow(clippy::cast_possible_truncation)]
fn validate(fields: RawFields) -> MoodVerdict {
    let raw_mood = fields.mood.unwrap_or_default();
    let mood = Mood::parse_lenient(&raw_mood).unwrap_or_else(|| {
        warn!(mood = %raw_mood, "unknown mood in verdict, using neutral");
        Mood::Neutral
    });

    let intensity = match fields
        .intensity
        .as_deref()
        .map(|s| s.trim().trim_matches('"').parse::<f64>())
    {
        Some(Ok(value)) if value.is_finite() => clamp_intensity(value as f32),
        Some(_) => {
            warn!(raw = ?fields.intensity, "unparseable intensity, using {FALLBACK_INTENSITY}");
            FALLBACK_INTENSITY
        }
        None => FALLBACK_INTENSITY,
    };

    let reason = match fields.reason.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => PLACEHOLDER_REASON.to_string(),
    };

    let trigger_keywords = fields
        .trigger_keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    MoodVerdict {
        mood,
        intensity,
        reason,
        trigger_keywords,
    }
}
