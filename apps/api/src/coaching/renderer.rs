//! Feedback Renderer — turns a `FeedbackRecord` into the on-page HTML and the
//! downloadable Markdown report.
//!
//! Pure and deterministic: the report date is passed in by the caller.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::feedback::{FeedbackRecord, RawScore, ScoreInfo};

pub const REPORT_TITLE: &str = "Career Buddy Resume Analysis";

/// Both projections of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeedback {
    pub display_html: String,
    pub markdown: String,
}

pub fn render(record: &FeedbackRecord, generated_on: NaiveDate) -> RenderedFeedback {
    RenderedFeedback {
        display_html: render_html(record),
        markdown: render_markdown(record, generated_on),
    }
}

/// 0–100 match score shown on a ten-point scale, one decimal.
/// Non-numeric scores display as `0.0`.
pub fn match_score_out_of_ten(score: &RawScore) -> String {
    let ten_point = score.as_percent().map(|pct| pct / 100.0 * 10.0).unwrap_or(0.0);
    format!("{ten_point:.1}")
}

/// Progress-bar fill, in percent, taken from the raw 0–100 score.
pub fn bar_width(score: &RawScore) -> String {
    let pct = score.as_percent().unwrap_or(0.0);
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{pct}")
    }
}

/// Splits a strength into an emphasised label and the remaining text when
/// it contains a colon. Presentation only.
pub fn strength_label(strength: &str) -> Option<(&str, &str)> {
    strength
        .split_once(':')
        .map(|(label, rest)| (label, rest.trim()))
}

// ────────────────────────────────────────────────────────────────────────────
// HTML
// ────────────────────────────────────────────────────────────────────────────

fn render_html(record: &FeedbackRecord) -> String {
    let mut html = String::from("<div>");
    html.push_str(&scores_card(&record.resume_score, &record.match_score));
    html.push_str(&strengths_card(&record.strengths));
    html.push_str(&improvements_card(record));
    html.push_str(&bullets_card(record));
    html.push_str("</div>");
    html
}

fn scores_card(resume: &ScoreInfo, matched: &ScoreInfo) -> String {
    let mut card = String::new();
    let _ = write!(
        card,
        "<div class='output-card'>\
         <h2>📊 Performance Scores</h2>\
         <hr class='card-rule'/>\
         <div class='score-block'>\
         <h3>🎯 Resume Score: <span class='score-value'>{}/100 ({})</span></h3>\
         <div class='score-progress'><div class='score-progress-fill' style='width:{}%;'></div></div>\
         </div>\
         <div class='score-block'>\
         <h3>🎯 Match Score: <span class='score-value'>{}/10 ({})</span></h3>\
         <div class='score-progress'><div class='score-progress-fill' style='width:{}%;'></div></div>\
         </div>\
         </div>",
        escape_html(&resume.score.to_string()),
        escape_html(&resume.bucket),
        bar_width(&resume.score),
        match_score_out_of_ten(&matched.score),
        escape_html(&matched.bucket),
        bar_width(&matched.score),
    );
    card
}

fn strengths_card(strengths: &[String]) -> String {
    let mut items = String::new();
    for strength in strengths {
        let body = match strength_label(strength) {
            Some((label, rest)) => format!(
                "<span class='strength-label'>{}:</span> <span class='item-text'>{}</span>",
                escape_html(label),
                escape_html(rest)
            ),
            None => format!("<span class='item-text'>{}</span>", escape_html(strength)),
        };
        let _ = write!(items, "<li>💎 {body}</li>");
    }

    format!(
        "<div class='output-card strengths-section'>\
         <h3>💎 Strengths</h3>\
         <ul class='plain-list'>{items}</ul>\
         </div>"
    )
}

fn improvements_card(record: &FeedbackRecord) -> String {
    let mut items = String::new();
    for area in &record.improvement_areas {
        let _ = write!(
            items,
            "<li>🛠️ <span class='area-label'>{}</span>: {}</li>",
            escape_html(&area.area),
            escape_html(&area.suggestion)
        );
    }

    format!(
        "<div class='output-card'>\
         <h3 class='accent-heading'>🛠️ Key Areas for Improvement</h3>\
         <ul class='plain-list'>{items}</ul>\
         </div>"
    )
}

fn bullets_card(record: &FeedbackRecord) -> String {
    let mut pointers = String::new();
    for bullet in &record.rewritten_bullets {
        let _ = write!(
            pointers,
            "<div class='bullet-pointer'>\
             <p><span class='original-label'>📝 Original:</span> <span class='item-text'>{}</span></p>\
             <p><span class='rewritten-label'>💡 Rewritten:</span> <span class='item-text'>{}</span></p>\
             </div>",
            escape_html(&bullet.original),
            escape_html(&bullet.rewritten)
        );
    }

    format!(
        "<div class='output-card'>\
         <h2>📝 Rewritten Resume Bullets</h2>\
         <p class='card-hint'>Use these suggestions to immediately improve your resume's impact.</p>\
         {pointers}\
         </div>"
    )
}

/// Model output is untrusted text.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Markdown
// ────────────────────────────────────────────────────────────────────────────

fn render_markdown(record: &FeedbackRecord, generated_on: NaiveDate) -> String {
    let mut md = vec![
        format!("# {REPORT_TITLE}\n"),
        format!("**Date:** {}\n", generated_on.format("%Y-%m-%d")),
        "## 📊 Scores".to_string(),
        format!(
            "- **Resume Score (Best Practices):** {}/100 ({})",
            record.resume_score.score, record.resume_score.bucket
        ),
        format!(
            "- **Match Score (Against JD):** {}/10 ({})\n",
            match_score_out_of_ten(&record.match_score.score),
            record.match_score.bucket
        ),
        "## 💎 Strengths\n".to_string(),
    ];

    md.extend(record.strengths.iter().map(|s| format!("* {s}")));

    md.push("\n## 🛠️ Areas of Improvement\n".to_string());
    md.extend(
        record
            .improvement_areas
            .iter()
            .map(|a| format!("* **{}**: {}", a.area, a.suggestion)),
    );

    md.push("\n## 📝 Rewritten Resume Bullets\n".to_string());
    for bullet in &record.rewritten_bullets {
        md.push("---".to_string());
        md.push(format!("**Original:** {}", bullet.original));
        md.push(format!("**Rewritten:** {}", bullet.rewritten));
    }

    md.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feedback::{ImprovementArea, RewrittenBullet};
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn sample_record() -> FeedbackRecord {
        FeedbackRecord {
            resume_score: ScoreInfo {
                score: RawScore(json!(71)),
                bucket: "Average".to_string(),
            },
            match_score: ScoreInfo {
                score: RawScore(json!(82)),
                bucket: "High".to_string(),
            },
            strengths: vec![
                "Great communicator: clear writing".to_string(),
                "SQL fluency".to_string(),
            ],
            improvement_areas: vec![ImprovementArea {
                area: "Metrics".to_string(),
                suggestion: "Quantify A/B test outcomes".to_string(),
            }],
            rewritten_bullets: vec![
                RewrittenBullet {
                    original: "Ran experiments".to_string(),
                    rewritten: "Ran 12 A/B tests lifting conversion 8%".to_string(),
                },
                RewrittenBullet {
                    original: "Led sprints".to_string(),
                    rewritten: "Led 26 Agile sprints for a 7-person squad".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_match_score_displayed_on_ten_point_scale() {
        assert_eq!(match_score_out_of_ten(&RawScore(json!(82))), "8.2");
        assert_eq!(match_score_out_of_ten(&RawScore(json!(100))), "10.0");
        assert_eq!(match_score_out_of_ten(&RawScore(json!("n/a"))), "0.0");
        assert_eq!(match_score_out_of_ten(&RawScore(json!({"x": 1}))), "0.0");
    }

    #[test]
    fn test_match_bar_uses_raw_percent_while_label_uses_ten_point() {
        let html = render(&sample_record(), date()).display_html;
        assert!(html.contains("8.2/10 (High)"));
        assert!(html.contains("width:82%;"));
        assert!(html.contains("71/100 (Average)"));
        assert!(html.contains("width:71%;"));
    }

    #[test]
    fn test_bar_width_handles_fractions_and_garbage() {
        assert_eq!(bar_width(&RawScore(json!(82))), "82");
        assert_eq!(bar_width(&RawScore(json!(82.5))), "82.5");
        assert_eq!(bar_width(&RawScore(json!("oops"))), "0");
    }

    #[test]
    fn test_strength_with_colon_gets_emphasised_label() {
        let html = render(&sample_record(), date()).display_html;
        assert!(html.contains(
            "<span class='strength-label'>Great communicator:</span> <span class='item-text'>clear writing</span>"
        ));
        assert!(html.contains("<span class='item-text'>SQL fluency</span>"));
    }

    #[test]
    fn test_strength_label_split_is_presentation_only() {
        let record = sample_record();
        let _ = render(&record, date());
        assert_eq!(record.strengths[0], "Great communicator: clear writing");
        assert_eq!(strength_label("A: b: c"), Some(("A", "b: c")));
        assert_eq!(strength_label("no label"), None);
    }

    #[test]
    fn test_bullets_rendered_in_input_order() {
        let html = render(&sample_record(), date()).display_html;
        let first = html.find("Ran 12 A/B tests").unwrap();
        let second = html.find("Led 26 Agile sprints").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_model_text_is_html_escaped() {
        let mut record = sample_record();
        record.strengths = vec!["<script>alert(1)</script>".to_string()];
        let html = render(&record, date()).display_html;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_markdown_has_sections_and_all_items() {
        let md = render(&sample_record(), date()).markdown;

        for heading in [
            "# Career Buddy Resume Analysis",
            "**Date:** 2024-03-09",
            "## 📊 Scores",
            "## 💎 Strengths",
            "## 🛠️ Areas of Improvement",
            "## 📝 Rewritten Resume Bullets",
        ] {
            assert!(md.contains(heading), "missing {heading}");
        }
        assert!(md.contains("- **Resume Score (Best Practices):** 71/100 (Average)"));
        assert!(md.contains("- **Match Score (Against JD):** 8.2/10 (High)"));
        assert!(md.contains("* Great communicator: clear writing"));
        assert!(md.contains("* SQL fluency"));
        assert!(md.contains("* **Metrics**: Quantify A/B test outcomes"));
        assert!(md.contains("**Original:** Ran experiments"));
        assert!(md.contains("**Rewritten:** Led 26 Agile sprints for a 7-person squad"));
        assert_eq!(md.matches("\n---\n").count(), 2);
    }

    #[test]
    fn test_default_record_renders_without_items() {
        let rendered = render(&FeedbackRecord::default(), date());
        assert!(rendered.display_html.contains("0/100 (N/A)"));
        assert!(rendered.display_html.contains("0.0/10 (N/A)"));
        assert!(rendered.markdown.contains("## 📝 Rewritten Resume Bullets"));
        assert!(!rendered.markdown.contains("---"));
    }
}
