//! Application use cases / business logic

pub mod insights;
pub mod render;

pub use insights::{InsightConfig, InsightError, InsightService};
pub use render::{
    comment_to_markdown, count_markdown_points, render_comment_analysis_markdown,
    render_summary_markdown,
};
