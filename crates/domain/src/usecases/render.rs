//! Rendering use case - transforms parsed LLM output into Markdown

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{CommentAnalysis, SummaryPoint};

static NUMBERED_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\. ").expect("bullet pattern is valid"));

static STYLE_TAG_RES: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (Regex::new(r"(?s)<i>(.*?)</i>").expect("italic pattern is valid"), "*$1*"),
        (Regex::new(r"(?s)<b>(.*?)</b>").expect("bold pattern is valid"), "**$1**"),
        (Regex::new(r"(?s)<strike>(.*?)</strike>").expect("strike pattern is valid"), "~~$1~~"),
        (Regex::new(r"(?s)<a [^>]*>(.*?)</a>").expect("link pattern is valid"), "$1"),
    ]
});

/// Render summary points as a numbered Markdown list, one line per point
pub fn render_summary_markdown(points: &[SummaryPoint]) -> String {
    let mut out = String::from("**Key Points**\n\n");
    for (i, point) in points.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} **{}:** {} *\"{}\"* ({})\n\n",
            i + 1,
            single_line(&point.emoji),
            single_line(&point.title),
            single_line(&point.content),
            single_line(&point.quote),
            single_line(&point.timestamp)
        ));
    }
    out.trim().to_string()
}

/// Count the numbered bullets in rendered Markdown
pub fn count_markdown_points(markdown: &str) -> usize {
    NUMBERED_BULLET_RE.find_iter(markdown).count()
}

/// Render a comment analysis with quoted comments under each topic
pub fn render_comment_analysis_markdown(analysis: &CommentAnalysis) -> String {
    let mut out = String::from("**Comment Analysis**\n\n");

    for (i, topic) in analysis.topics.iter().enumerate() {
        out.push_str(&format!("**{}**\n{}\n", topic.name, topic.description));
        for comment in analysis.comments_for_topic(i) {
            out.push_str(&format!("> {}\n", single_line(&comment_to_markdown(&comment.text))));
        }
        out.push('\n');
    }

    if !analysis.overall_analysis.trim().is_empty() {
        out.push_str("**TLDR**\n");
        out.push_str(analysis.overall_analysis.trim());
        out.push_str("\n\n");
    }

    if !analysis.follow_up_topics.is_empty() {
        out.push_str("**📌 Potential Follow-up Topics**\n\n");
        for topic in &analysis.follow_up_topics {
            out.push_str(&format!("- **{}**: {}\n", topic.topic, topic.reason));
        }
    }

    out.trim().to_string()
}

/// Convert the platform's comment markup (`<br>`, `<b>`, `<i>`, `<strike>`,
/// links and HTML entities) to Markdown
pub fn comment_to_markdown(text: &str) -> String {
    let mut out = text.replace("<br>", "\n").replace("<br/>", "\n");
    for (re, replacement) in STYLE_TAG_RES.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
