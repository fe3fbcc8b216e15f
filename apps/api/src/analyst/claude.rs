use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::analyst::context::{insights_prompt, summary_prompt};
use crate::analyst::insights::InsightsData;
use crate::analyst::prompts::{INSIGHTS_SYSTEM, SUMMARY_SYSTEM};
use crate::analyst::{
    ProfileAnalyst, CHAT_FAILED, INSIGHTS_FAILED, RESUME_ANALYSIS_FAILED, RESUME_INVALID_FORMAT,
    SUMMARY_FAILED,
};
use crate::errors::AppError;
use crate::github::{Profile, Repository};
use crate::llm_client::{ContentPart, LlmClient, LlmError, Message, Role};
use crate::resume::prompts::{RESUME_EXTRACTION_PROMPT, RESUME_EXTRACTION_SYSTEM, TEXT_LAYER_HINT};
use crate::resume::{ResumeAnalysisResult, ResumeContent};

/// Profile analysis backed by the Claude Messages API.
pub struct ClaudeAnalyst {
    llm: LlmClient,
}

impl ClaudeAnalyst {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

/// Builds the single user message for resume extraction: the document (or pasted
/// text) first, then the instructions.
fn resume_message(resume: &ResumeContent) -> Message {
    let mut content = Vec::with_capacity(3);
    match resume {
        ResumeContent::Pdf { bytes, text_layer } => {
            content.push(ContentPart::pdf(bytes));
            if let Some(text) = text_layer {
                content.push(ContentPart::text(format!("{TEXT_LAYER_HINT}\n{text}")));
            }
        }
        ResumeContent::Text(text) => {
            content.push(ContentPart::text(format!("RESUME:\n{text}")));
        }
    }
    content.push(ContentPart::text(RESUME_EXTRACTION_PROMPT));
    Message {
        role: Role::User,
        content,
    }
}

fn resume_error(e: LlmError) -> AppError {
    if e.is_malformed_output() {
        warn!("Resume extraction returned malformed output: {e}");
        AppError::InvalidAiResponse(RESUME_INVALID_FORMAT.to_string())
    } else {
        warn!("Resume extraction failed: {e}");
        AppError::Llm(RESUME_ANALYSIS_FAILED.to_string())
    }
}

#[async_trait]
impl ProfileAnalyst for ClaudeAnalyst {
    async fn extract_resume_links(
        &self,
        resume: &ResumeContent,
    ) -> Result<ResumeAnalysisResult, AppError> {
        info!("Extracting resume links ({})", resume.kind());
        let result: ResumeAnalysisResult = self
            .llm
            .call_json(RESUME_EXTRACTION_SYSTEM, &[resume_message(resume)])
            .await
            .map_err(resume_error)?;
        Ok(result.normalized())
    }

    async fn summarize(&self, profile: &Profile, repos: &[Repository]) -> Result<String, AppError> {
        info!("Generating summary for {}", profile.login);
        let prompt = summary_prompt(profile, repos);
        self.llm
            .call_text(SUMMARY_SYSTEM, &[Message::user(prompt)])
            .await
            .map_err(|e| {
                warn!("Summary generation failed for {}: {e}", profile.login);
                AppError::Llm(SUMMARY_FAILED.to_string())
            })
    }

    async fn score_insights(
        &self,
        profile: &Profile,
        repos: &[Repository],
        now: DateTime<Utc>,
    ) -> Result<InsightsData, AppError> {
        info!("Scoring insights for {}", profile.login);
        let prompt = insights_prompt(profile, repos, now);
        let data: InsightsData = self
            .llm
            .call_json(INSIGHTS_SYSTEM, &[Message::user(prompt)])
            .await
            .map_err(|e| {
                warn!("Insight scoring failed for {}: {e}", profile.login);
                if e.is_malformed_output() {
                    AppError::InvalidAiResponse(INSIGHTS_FAILED.to_string())
                } else {
                    AppError::Llm(INSIGHTS_FAILED.to_string())
                }
            })?;

        data.validate().map_err(|reason| {
            warn!("Insight scores for {} rejected: {reason}", profile.login);
            AppError::InvalidAiResponse(INSIGHTS_FAILED.to_string())
        })?;
        Ok(data)
    }

    async fn chat(&self, system: &str, conversation: &[Message]) -> Result<String, AppError> {
        self.llm.call_text(system, conversation).await.map_err(|e| {
            warn!("Chat call failed: {e}");
            AppError::Llm(CHAT_FAILED.to_string())
        })
    }
}
