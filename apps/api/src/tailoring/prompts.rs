// All LLM prompt constants for the Tailoring module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for résumé tailoring. Enforces JSON-only output.
pub const TAILOR_SYSTEM: &str = "You are an expert technical recruiter and resume writer \
    who knows how Applicant Tracking Systems parse and rank resumes. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Tailoring prompt template.
/// Replace: {grounding_instruction}, {resume_text}, {job_text}
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

Rewrite the resume below so it targets the job posting below, then rate how well the
tailored resume would score in an Applicant Tracking System for this posting.

Return a JSON object with this EXACT schema (no extra fields):
{
  "tailored_resume": "The full tailored resume as plain text, sections separated by blank lines",
  "ats_score": 78,
  "matched_keywords": ["Rust", "distributed systems"],
  "missing_keywords": ["Kubernetes"],
  "suggestions": ["Quantify the latency improvement in the payments project"]
}

Rules:
1. `ats_score` is an integer from 0 to 100 for the TAILORED resume against this posting
2. Mirror the posting's exact terminology where the resume genuinely supports it
3. Keep standard section headings (Summary, Experience, Skills, Education) so ATS parsers find them
4. No tables, columns, emoji or decorative characters in `tailored_resume`
5. `missing_keywords` lists important posting terms the resume cannot honestly claim
6. `suggestions` are at most 5 short, concrete edits the candidate could make with real information

RESUME:
{resume_text}

JOB POSTING:
{job_text}"#;
