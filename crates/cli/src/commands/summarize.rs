//! Summarize command - one-shot video summary

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{build_service, parse_video_id};
use crate::args::SummarizeArgs;
use crate::config::AppConfig;

pub async fn execute(args: SummarizeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let video_id = parse_video_id(&args.video)?;

    let service = build_service(&config)?;
    let summary = service
        .summarize(&video_id)
        .await
        .context("Summarization failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "video_id": video_id,
            "summary": summary.markdown,
            "points": summary.points,
        }))
        .context("Failed to serialize output")?;
        println!("{}", json);
    } else {
        println!("{}", summary.markdown);
    }

    Ok(())
}
