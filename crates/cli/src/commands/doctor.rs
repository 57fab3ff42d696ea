//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::resolve_provider;
use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    youtube: CheckResult,
    llm: CheckResult,
    insights: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        youtube: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        insights: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    match AppConfig::load(config_path.as_deref()) {
        Ok(config) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            report.youtube = check_youtube(&config);
            report.llm = check_llm(&config);
            report.insights = check_insights(&config);
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
        }
    }

    let checks = [&report.config, &report.youtube, &report.llm, &report.insights];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn env_var_is_set(name: &str) -> bool {
    matches!(std::env::var(name), Ok(val) if !val.trim().is_empty())
}

fn check_youtube(config: &AppConfig) -> CheckResult {
    match config.youtube.source.as_str() {
        "stub" => CheckResult::ok("Source: stub (offline)"),
        "api" => {
            let env_var = &config.youtube.api_key_env;
            if env_var.trim().is_empty() {
                return CheckResult::error("No YouTube API key env var configured");
            }
            if env_var_is_set(env_var) {
                CheckResult::ok(format!(
                    "Source: api, API key: {} (set), Captions: {}",
                    env_var, config.youtube.transcript_language
                ))
            } else {
                CheckResult::warn(format!(
                    "Source: api, API key: {} (not set)",
                    env_var
                ))
            }
        }
        other => CheckResult::error(format!("Unknown video source: {}", other)),
    }
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let model = &config.llm.model;

    let provider = match resolve_provider(config) {
        Ok(p) => p,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    // Check the API key env var without revealing the value
    let api_key_env = match provider {
        "openai" => &config.llm.openai.api_key_env,
        "anthropic" => &config.llm.anthropic.api_key_env,
        _ => return CheckResult::ok("Provider: stub (offline)"),
    };

    if api_key_env.trim().is_empty() {
        return CheckResult::error(format!("No API key env var configured for {}", provider));
    }

    if env_var_is_set(api_key_env) {
        CheckResult::ok(format!(
            "Provider: {}, Model: {}, API key: {} (set)",
            provider, model, api_key_env
        ))
    } else {
        CheckResult::warn(format!(
            "Provider: {}, Model: {}, API key: {} (not set)",
            provider, model, api_key_env
        ))
    }
}

fn check_insights(config: &AppConfig) -> CheckResult {
    let insights = &config.insights;

    if insights.max_points == 0 || insights.max_topics == 0 {
        return CheckResult::error("max_points and max_topics must be at least 1");
    }

    if insights.max_comments < insights.min_comments {
        return CheckResult::warn(format!(
            "max_comments ({}) is below min_comments ({}); comment analysis will never run",
            insights.max_comments, insights.min_comments
        ));
    }

    let transcript = match insights.max_transcript_length {
        0 => "unlimited".to_string(),
        n => format!("{} chars", n),
    };

    CheckResult::ok(format!(
        "Points: {}, Topics: {}, Comments: {}-{}, Transcript: {}",
        insights.max_points,
        insights.max_topics,
        insights.min_comments,
        insights.max_comments,
        transcript
    ))
}

fn print_report(report: &DoctorReport) {
    println!("eightify Doctor Report");
    println!("======================");
    println!();

    print_check("Config", &report.config);
    print_check("YouTube", &report.youtube);
    print_check("LLM Provider", &report.llm);
    print_check("Insights", &report.insights);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready! Try: eightify summarize https://youtu.be/dQw4w9WgXcQ");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
