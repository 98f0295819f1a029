use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bucket shown when the model gave none.
pub const NO_BUCKET: &str = "N/A";

/// A score exactly as the model reported it. Not clamped or coerced: the
/// model owns its range, and arithmetic on it goes through `as_percent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawScore(pub Value);

impl RawScore {
    pub fn zero() -> Self {
        RawScore(Value::from(0))
    }

    /// Numeric reading of the score. Numeric strings count; anything else
    /// is `None` so callers can fall back explicitly.
    pub fn as_percent(&self) -> Option<f64> {
        match &self.0 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }
}

impl Default for RawScore {
    fn default() -> Self {
        RawScore::zero()
    }
}

impl fmt::Display for RawScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            Value::Null => f.write_str("0"),
            other => write!(f, "{other}"),
        }
    }
}

/// A score plus the model's qualitative bucket.
///
/// Resume buckets: Excellent, High, Average, Needs Improvement.
/// Match buckets: Excellent, High, Average, Low. `N/A` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInfo {
    pub score: RawScore,
    pub bucket: String,
}

impl Default for ScoreInfo {
    fn default() -> Self {
        Self {
            score: RawScore::zero(),
            bucket: NO_BUCKET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementArea {
    pub area: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewrittenBullet {
    pub original: String,
    pub rewritten: String,
}

/// Canonical feedback. Only the normalizer builds one from model output;
/// every field is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub resume_score: ScoreInfo,
    pub match_score: ScoreInfo,
    /// Most significant first, as ranked by the model.
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<ImprovementArea>,
    /// The prompt asks for four; whatever survives normalization is kept.
    pub rewritten_bullets: Vec<RewrittenBullet>,
}
