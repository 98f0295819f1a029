// Prompt template for the coaching call, plus the substitution helper.

/// Domain used when the form leaves it blank.
pub const DEFAULT_DOMAIN: &str = "General";

/// Coaching prompt template.
/// Replace: {jd_text}, {resume_text}, {domain}, {years_of_experience}
pub const COACHING_PROMPT_TEMPLATE: &str = r#"You are an expert career coach and resume writer. Your task is to analyze a provided job description (JD), a resume, and additional user details, then generate actionable, JSON-formatted feedback.

INPUT DATA:
- Job Description:
  {jd_text}
- Resume:
  {resume_text}
- Domain:
  {domain}
- Years of Experience:
  {years_of_experience}

ANALYSIS & INSTRUCTIONS:
1. RESUME SCORE: Based on the resume, domain, and years of experience, give a score from 0 to 100 reflecting general quality and market readiness. Buckets:
   - "Excellent": 95+
   - "High": 75–94
   - "Average": 50–74
   - "Needs Improvement": <50
2. MATCH SCORE: Give a score from 0 to 100 for how well the resume aligns with this specific JD. Buckets:
   - "Excellent": 95+
   - "High": 75–94
   - "Average": 50–74
   - "Low": <50
3. STRENGTHS: List 3–5 aspects of the resume that work in the candidate's favour and align with the JD, most significant first. Phrase each as "Label: explanation".
4. IMPROVEMENT AREAS: List up to 5 specific weaknesses relative to the JD, the domain, and general market expectations.
5. SUGGESTIONS: For each improvement area, give one concrete change to the resume that addresses it.
6. REWRITTEN BULLETS: Select the 4 most relevant bullet points from the resume and rewrite them to match the JD's language and priorities. Each rewrite must be under 20 words and quantify impact with numbers wherever possible. Provide exactly 4, even if the resume has fewer clear bullets.

OUTPUT FORMAT:
Respond with ONLY a single JSON object — no extra text, no markdown, no explanations. Use exactly this structure:
{
  "resume_score": {"score": 0, "bucket": ""},
  "match_score": {"score": 0, "bucket": ""},
  "strengths": [""],
  "improvement_areas": [{"area": "", "suggestion": ""}],
  "rewritten_bullets": [{"original": "", "rewritten": ""}]
}"#;

/// Fills the coaching template. A blank domain becomes `General`.
pub fn build_coaching_prompt(
    jd_text: &str,
    resume_text: &str,
    domain: &str,
    years_of_experience: f64,
) -> String {
    let domain = match domain.trim() {
        "" => DEFAULT_DOMAIN,
        d => d,
    };

    COACHING_PROMPT_TEMPLATE
        .replace("{jd_text}", jd_text)
        .replace("{resume_text}", resume_text)
        .replace("{domain}", domain)
        .replace("{years_of_experience}", &format_years(years_of_experience))
}

/// `2.0` → "2", `2.5` → "2.5".
pub fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{}", years as i64)
    } else {
        format!("{years}")
    }
}
