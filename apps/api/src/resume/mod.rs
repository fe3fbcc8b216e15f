// Resume intake: input validation, AI link extraction prompts, and resolution of
// the GitHub login from the extracted links.

pub mod analysis;
pub mod prompts;
pub mod upload;

pub use analysis::{resolve_username, CategorizedUrls, ResumeAnalysisResult};
pub use upload::ResumeContent;
