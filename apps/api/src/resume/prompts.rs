// Resume link-extraction prompt templates.

pub const RESUME_EXTRACTION_SYSTEM: &str = "\
You are an expert resume analysis tool. \
Your only task is to extract and categorize every hyperlink in the provided resume. \
You MUST respond with valid JSON only: no markdown fences, no explanations.";

pub const RESUME_EXTRACTION_PROMPT: &str = r#"Extract and categorize all hyperlinks from the resume provided above.

The resume may be a PDF or plain text. For PDFs, include link targets embedded behind
text (e.g. the word "GitHub" hyperlinked to a profile), not only visible URLs.

OUTPUT SCHEMA (return exactly this structure):
{
  "githubProfileUrl": "string" | null,   // the main GitHub profile, never a repository link
  "linkedInUrl": "string" | null,        // the LinkedIn profile
  "portfolioUrls": ["string"],           // personal portfolios, blogs, personal websites
  "projectUrls": ["string"],             // specific projects: repositories, live demos
  "otherUrls": ["string"]                // anything else: certifications, coding-challenge profiles
}

RULES:
1. Treat visible URLs and hyperlink targets as equally valid.
2. If several GitHub links exist, githubProfileUrl is the profile; repository links go to projectUrls.
3. Every URL appears at most once across all categories.
4. Use null for a missing single URL and [] for an empty category.
5. Return ONLY the JSON object and nothing else, no code fences."#;

/// Prefix for the optional text layer sent alongside a PDF.
pub const TEXT_LAYER_HINT: &str =
    "Text layer extracted from the PDF (may be incomplete; the document is authoritative):";
