// Profile analysis prompt templates: summary, insight scoring and chat grounding.

pub const SUMMARY_SYSTEM: &str = "\
You are a professional technical writer and career coach specializing in software development. \
You write polished profile summaries in markdown.";

pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Based on the following GitHub profile data, write a concise yet comprehensive professional summary (4-6 sentences) suitable for a resume or a LinkedIn "About" section.

INSTRUCTIONS:
- Professional, confident and engaging tone.
- Highlight key skills, technologies and likely areas of expertise inferred from the bio and repositories.
- For the most notable repositories (high stars or unique concepts), give one slightly more detailed sentence on what they do. Do not just list repositories.
- Write a smooth narrative, not bullet points.
- Use **bold** for key technologies and project names, *italics* for conceptual highlights or roles.
- End with a forward-looking statement about the developer's interests if one can be inferred.

GITHUB PROFILE DATA:
- Name: {name}
- Login: @{login}
- Bio: {bio}
- Followers: {followers}
- Public Repositories: {public_repos}
- Location: {location}

TOP REPOSITORIES (by stars):
{top_repos}

Write the summary now."#;

pub const INSIGHTS_SYSTEM: &str = "\
You are an expert GitHub profile analyst. \
You MUST respond with valid JSON only: no markdown fences, no explanations.";

pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"Evaluate the developer profile and repository data below and score it in four categories.

CATEGORIES:
- Open Source Contributor: frequent updates, multiple repos and community engagement (stars/forks) score high; few, old or personal-only projects score low.
- Full Stack Developer: a mix of frontend (JS/TS, React) and backend (Python, Go, Java, Node.js) languages scores high; narrow specialization scores low.
- Project Maintainer: well-described repositories, recent updates and consistent activity score high; abandoned or undescribed projects score low.
- Community Leader: many followers and repositories with high star/fork counts score high.

OUTPUT SCHEMA (return exactly this structure):
{
  "overallScore": integer,          // average of the four category scores
  "insights": [
    {"name": "string", "score": integer, "justification": "string"}
  ]
}

RULES:
1. Scores are integers from 0 to 100.
2. Each justification is one concise sentence.
3. Use exactly these category names: {categories}.
4. Return ONLY the JSON object and nothing else, no code fences.

DATA FOR ANALYSIS:
- Followers: {followers}
- Public Repos: {public_repos}
- Bio: {bio}
- Account Age (Years): {account_age_years}
- Repository Sample:
{repo_sample}"#;

pub const GENERAL_CHAT_SYSTEM: &str = "\
You are a friendly and helpful assistant knowledgeable about GitHub, software development, and resumes. \
Keep your answers concise and use markdown for formatting when appropriate.";

pub const PROFILE_CHAT_SYSTEM_TEMPLATE: &str = r#"You are an expert AI assistant specialized in analyzing GitHub profiles.
You have been provided with the following JSON data for the GitHub user "{name}".
{grounding}
{formatting}

GITHUB PROFILE CONTEXT:
```json
{context}
```"#;

pub const GENERAL_CHAT_GREETING: &str =
    "Hello! How can I help you today? Ask me about GitHub, resumes, or software development.";

pub const PROFILE_CHAT_GREETING_TEMPLATE: &str =
    "I'm ready to answer questions about **{name}**'s profile. What would you like to know?";
