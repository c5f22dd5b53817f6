// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Keeps generated résumé content truthful to the source résumé.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every statement in the tailored resume must be supported by the original resume. \
    You may reorder, rephrase, emphasize and trim. \
    Do NOT invent employers, titles, dates, degrees, certifications, metrics or skills. \
    If the job asks for something the resume does not show, report it as a missing keyword \
    instead of adding it.";
