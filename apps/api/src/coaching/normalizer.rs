//! Response Normalizer — coerces whatever JSON the model produced into a
//! `FeedbackRecord` with every field present.
//!
//! Pure: no I/O, never fails. Each field is pattern-matched on its JSON
//! shape with an explicit default for anything unexpected.

use serde_json::{Map, Value};

use crate::models::feedback::{
    FeedbackRecord, ImprovementArea, RawScore, RewrittenBullet, ScoreInfo, NO_BUCKET,
};

/// Keys consulted, in priority order, for the original bullet text.
pub const ORIGINAL_BULLET_KEYS: &[&str] = &[
    "original",
    "old",
    "before",
    "previous",
    "existing",
    "old_bullet",
    "original_pointer",
];

/// Keys consulted, in priority order, for the rewritten bullet text.
pub const REWRITTEN_BULLET_KEYS: &[&str] = &[
    "rewritten",
    "new",
    "after",
    "improved",
    "suggestion",
    "new_bullet",
    "improved_pointer",
];

/// Separator accepted in string-shaped bullets: "old → new".
pub const BULLET_ARROW: char = '→';

pub fn normalize(value: &Value) -> FeedbackRecord {
    let Some(obj) = value.as_object() else {
        return FeedbackRecord::default();
    };

    FeedbackRecord {
        resume_score: normalize_score(obj.get("resume_score")),
        match_score: normalize_score(obj.get("match_score")),
        strengths: normalize_strengths(obj.get("strengths")),
        improvement_areas: normalize_improvement_areas(obj.get("improvement_areas")),
        rewritten_bullets: normalize_rewritten_bullets(obj.get("rewritten_bullets")),
    }
}

fn normalize_score(value: Option<&Value>) -> ScoreInfo {
    let Some(Value::Object(map)) = value else {
        return ScoreInfo::default();
    };

    let score = map.get("score").cloned().map(RawScore).unwrap_or_default();
    let bucket = match map.get("bucket") {
        None | Some(Value::Null) => NO_BUCKET.to_string(),
        Some(v) => text_of(v),
    };

    ScoreInfo { score, bucket }
}

/// A lone string becomes a one-item list. Scalars inside a list are kept
/// as text; nested structures are dropped.
fn normalize_strengths(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(_) | Value::Bool(_) => Some(item.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn normalize_improvement_areas(value: Option<&Value>) -> Vec<ImprovementArea> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(ImprovementArea {
                area: field_text(map, "area"),
                suggestion: field_text(map, "suggestion"),
            }),
            Value::String(s) => Some(match s.split_once(':') {
                Some((area, suggestion)) => ImprovementArea {
                    area: area.trim().to_string(),
                    suggestion: suggestion.trim().to_string(),
                },
                None => ImprovementArea {
                    area: s.clone(),
                    suggestion: String::new(),
                },
            }),
            _ => None,
        })
        .collect()
}

fn normalize_rewritten_bullets(value: Option<&Value>) -> Vec<RewrittenBullet> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => {
                let original = first_present(map, ORIGINAL_BULLET_KEYS);
                let rewritten = first_present(map, REWRITTEN_BULLET_KEYS);
                if original.is_none() && rewritten.is_none() {
                    return None;
                }
                Some(RewrittenBullet {
                    original: original.unwrap_or_default(),
                    rewritten: rewritten.unwrap_or_default(),
                })
            }
            Value::String(s) => s.split_once(BULLET_ARROW).map(|(original, rewritten)| {
                RewrittenBullet {
                    original: original.trim().to_string(),
                    rewritten: rewritten.trim().to_string(),
                }
            }),
            _ => None,
        })
        .collect()
}

/// First alias whose value is not blank. Null, `""`, `[]`, `{}`, `false`
/// and zero all count as absent.
fn first_present(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .filter(|value| !is_blank(value))
        .map(text_of)
        .find(|text| !text.is_empty())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn field_text(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).map(text_of).unwrap_or_default()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
