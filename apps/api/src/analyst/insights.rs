//! AI insight scores: boundary validation and the markdown export.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::github::Profile;

pub const MAX_SCORE: u32 = 100;

/// The four categories the model is asked to score.
pub const INSIGHT_CATEGORIES: [&str; 4] = [
    "Open Source Contributor",
    "Full Stack Developer",
    "Project Maintainer",
    "Community Leader",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightItem {
    pub name: String,
    pub score: u32,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsData {
    pub overall_score: u32,
    pub insights: Vec<InsightItem>,
}

impl InsightsData {
    /// Schema checks the JSON shape alone cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.overall_score > MAX_SCORE {
            return Err(format!("overallScore {} out of range", self.overall_score));
        }
        if self.insights.is_empty() {
            return Err("no insights returned".to_string());
        }
        for item in &self.insights {
            if item.name.trim().is_empty() {
                return Err("insight without a name".to_string());
            }
            if item.score > MAX_SCORE {
                return Err(format!("score {} for '{}' out of range", item.score, item.name));
            }
        }
        Ok(())
    }
}

/// Statistics appended to the exported report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStats {
    pub language_count: usize,
    pub total_repositories: u32,
    pub last_activity: String,
}

pub fn export_markdown(profile: &Profile, insights: &InsightsData, stats: &ExportStats) -> String {
    let mut md = format!("# GitHub AI Insights for {}\n\n", profile.display_name());
    let _ = writeln!(md, "**Overall Score:** {}/100\n", insights.overall_score);
    md.push_str("## Key Skill Areas\n\n");
    for item in &insights.insights {
        let _ = writeln!(md, "### {}: {}/100", item.name, item.score);
        let _ = writeln!(md, "*{}*\n", item.justification);
    }
    md.push_str("## Statistics\n\n");
    let _ = writeln!(md, "- **Languages:** {}", stats.language_count);
    let _ = writeln!(md, "- **Total Repositories:** {}", stats.total_repositories);
    let _ = writeln!(md, "- **Last Activity:** {}", stats.last_activity);
    md
}
