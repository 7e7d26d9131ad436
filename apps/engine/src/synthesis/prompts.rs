// All LLM prompt constants for document synthesis.
// Cross-cutting fragments live in llm_client::prompts.

/// System prompt for application document generation — enforces JSON-only
/// output keyed by the exact expected section names.
pub const SYNTHESIS_SYSTEM: &str = "You are an expert application writer producing factual, \
    grounded CV and cover letter text from a candidate's verified CV and notes. \
    You MUST respond with a single valid JSON object mapping section names to text. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT invent employers, dates, numbers, or achievements not present in the candidate material.";

/// Synthesis prompt template.
/// Replace: {section_names}, {cv_raw}, {memory}, {job_title}, {job_company},
///          {job_location}, {job_description}
pub const SYNTHESIS_PROMPT_TEMPLATE: &str = r#"Write tailored application documents for the job below.

Return a JSON object with EXACTLY these keys and no others:
{section_names}

Each value is plain text for that section:
- "summary": a 3-4 sentence CV profile paragraph tailored to the job
- "experience": the candidate's experience bullets, reworded toward the job, one bullet per line
- "cover-letter-body": the body paragraphs of a cover letter (no salutation, no signature)

CANDIDATE RAW CV:
{cv_raw}

CANDIDATE NOTES / KNOWLEDGE:
{memory}

TARGET JOB:
Title: {job_title}
Company: {job_company}
Location: {job_location}
Description:
{job_description}

HARD RULES:
1. Use ONLY facts from the candidate material — no interpolation, no invention
2. Keep every employer name, date, and number exactly as written
3. Reference the posting's actual responsibilities instead of generic claims"#;
