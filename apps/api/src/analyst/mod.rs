//! AI analysis of resumes and GitHub profiles.
//!
//! Handlers and the dashboard pipeline only see the `ProfileAnalyst` trait.
//! `AppState` carries it as `Arc<dyn ProfileAnalyst>`; production wires in
//! `ClaudeAnalyst`, tests a scripted fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::github::{Profile, Repository};
use crate::llm_client::Message;
use crate::resume::{ResumeAnalysisResult, ResumeContent};

pub mod chat;
pub mod claude;
pub mod context;
pub mod insights;
pub mod prompts;

pub use chat::{ChatEntry, ChatSession};
pub use claude::ClaudeAnalyst;
pub use insights::InsightsData;

pub const RESUME_ANALYSIS_FAILED: &str = "Failed to analyze the resume with the AI model. \
The content might be unsupported or the API may be temporarily unavailable.";
pub const RESUME_INVALID_FORMAT: &str = "The AI model returned an invalid format. \
Please try again with a different document or text.";
pub const SUMMARY_FAILED: &str =
    "Failed to generate profile summary. The AI model may be temporarily unavailable.";
pub const INSIGHTS_FAILED: &str =
    "Failed to generate AI insights. The model may be unavailable or the profile data is invalid.";
pub const CHAT_FAILED: &str = "The AI model could not answer. Please try again.";

#[async_trait]
pub trait ProfileAnalyst: Send + Sync {
    /// Extracts and categorizes every link in a resume.
    async fn extract_resume_links(
        &self,
        resume: &ResumeContent,
    ) -> Result<ResumeAnalysisResult, AppError>;

    /// Four to six sentences of markdown about the profile.
    async fn summarize(&self, profile: &Profile, repos: &[Repository]) -> Result<String, AppError>;

    /// Category scores with justifications. `now` fixes the account age.
    async fn score_insights(
        &self,
        profile: &Profile,
        repos: &[Repository],
        now: DateTime<Utc>,
    ) -> Result<InsightsData, AppError>;

    /// One chat reply for the conversation so far; the last message is the user's.
    async fn chat(&self, system: &str, conversation: &[Message]) -> Result<String, AppError>;
}
