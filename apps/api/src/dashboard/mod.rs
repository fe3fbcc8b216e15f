// Server-side dashboard: per-session view state, the analysis pipelines that
// drive it, repository projections and chart geometry.

pub mod charts;
pub mod handlers;
pub mod pipeline;
pub mod projection;
pub mod sessions;
pub mod state;

pub use sessions::SessionStore;
