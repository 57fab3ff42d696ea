//! Comments command - one-shot comment analysis

use anyhow::{Context, Result};
use eightify_domain::CommentAnalysisOutcome;
use eightify_domain::usecases::render_comment_analysis_markdown;
use std::path::PathBuf;

use super::{build_service, parse_video_id};
use crate::args::CommentsArgs;
use crate::config::AppConfig;

pub async fn execute(args: CommentsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let video_id = parse_video_id(&args.video)?;

    let service = build_service(&config)?;

    if args.with_summary {
        // Only context for the analysis; failure here is not fatal
        if let Err(e) = service.summarize(&video_id).await {
            tracing::warn!(error = %e, "Continuing without a summary");
        }
    }

    let outcome = service
        .analyze_comments(&video_id, args.insight.as_deref())
        .await
        .context("Comment analysis failed")?;

    let analysis = match outcome {
        CommentAnalysisOutcome::Analyzed(analysis) => analysis,
        CommentAnalysisOutcome::NotEnoughComments { found, required } => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "video_id": video_id,
                        "not_enough_comments": { "found": found, "required": required }
                    })
                );
            } else {
                println!(
                    "Not enough comments to analyze ({} found, {} required).",
                    found, required
                );
            }
            return Ok(());
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&analysis).context("Failed to serialize output")?;
        println!("{}", json);
    } else {
        println!("{}", render_comment_analysis_markdown(&analysis));
    }

    Ok(())
}
