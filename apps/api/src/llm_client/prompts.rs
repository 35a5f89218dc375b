// Shared prompt fragments. Each module that needs LLM calls keeps its own
// prompts.rs alongside it; only cross-cutting pieces live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every scoring prompt.
pub const SCORE_RANGE_INSTRUCTION: &str = "\
    Every numeric score field is a number between 0 and 100 inclusive. \
    Use the exact field names shown. Do not add or omit fields.";
