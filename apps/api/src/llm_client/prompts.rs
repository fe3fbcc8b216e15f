// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction appended to every prompt grounded in profile data.
pub const GROUNDING_INSTRUCTION: &str = "\
    Your answers MUST be based only on the supplied GitHub data. \
    Do not use external knowledge unless explicitly asked. \
    If the data does not support a claim, say so instead of guessing.";

/// Formatting instruction for free-text replies rendered as markdown.
pub const MARKDOWN_INSTRUCTION: &str = "\
    Be helpful, concise, and professional. Use markdown for formatting.";
