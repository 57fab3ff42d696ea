//! Prompt and response-schema construction
//!
//! Everything here is pure: the same inputs always produce the same prompt.

use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::Serialize;
use serde_json::{Value, json};

use crate::model::{VideoComment, VideoDetails};
use crate::response::{CommentAnalysisPayload, SummaryPayload};

/// Description of the structured answer expected from the model, in the
/// shape of a function/tool declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

impl ResponseSchema {
    pub fn summary() -> Self {
        Self {
            name: "create_video_summary",
            description: "Create a summary of a YouTube video with key points",
            parameters: schema_of::<SummaryPayload>(),
        }
    }

    pub fn comment_analysis() -> Self {
        Self {
            name: "analyze_and_cluster_comments",
            description: "Analyze YouTube video comments, generate topics, and assign comments to topics",
            parameters: schema_of::<CommentAnalysisPayload>(),
        }
    }

    /// Top-level keys the model must fill in
    pub fn required_keys(&self) -> Vec<&str> {
        self.parameters["required"]
            .as_array()
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

fn schema_of<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();
    serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Everything the LLM gateway needs for one call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub schema: ResponseSchema,
}

/// The persona shared by every request
pub fn system_prompt() -> String {
    r#"GOAL
You are an AI assistant in an app called Eightify. Eightify saves time on long videos by
surfacing key ideas instantly: summarized paragraphs with timestamps, pivotal points, and the
unique insights hidden in the comments. You specialize in analyzing YouTube content, including
video transcripts and comments.

USER PROBLEMS SOLVED
Always keep the user's core needs in mind: quick understanding, identification of novel content,
potential questions, and key timestamps.
- "Is this worth watching? Will it give anything new for me?"
- "There are always unique insights in the comments, but I don't want to fall into that rabbit hole."
- "I want to understand what the video is about before diving in."
- "Do they discuss the one thing I wanted to ask about?"
- "Where in the video do they talk about it?"

TASKS
Your tasks include summarizing videos and providing insights from comments. Your analysis should be:
- Concise and direct, focusing on key ideas and valuable insights
- Enhanced with relevant emojis for readability
- Supported by brief quotes when applicable
- Free from filler phrases or unnecessary judgments

TONE OF VOICE
- Be a friendly, helpful assistant that is easy to talk to.
- Don't make things up.
- Don't be boring.
- Don't waste time, save it.
"#
    .to_string()
}

/// Cut `text` to its first `max_chars` characters. `None` keeps everything.
pub fn truncate_chars(text: &str, max_chars: Option<usize>) -> &str {
    match max_chars {
        Some(max) => match text.char_indices().nth(max) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        },
        None => text,
    }
}

/// Build the summary request for a transcript
pub fn build_summary_prompt(
    title: &str,
    description: &str,
    transcript_text: &str,
    max_points: usize,
    max_transcript_length: Option<usize>,
) -> InferenceRequest {
    let transcript = truncate_chars(transcript_text, max_transcript_length);

    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Analyze and summarize the following YouTube video transcript in up to {} key points.\n\n",
        max_points
    ));

    prompt.push_str("## Video Information\n");
    prompt.push_str(&format!("Title: {}\n", title));
    prompt.push_str(&format!("Description: {}\n\n", description));

    prompt.push_str(
        r#"## Output Format
Provide the summary as a JSON object with a "summary" array. Each element has this structure:
{
  "emoji": "Relevant emoji",
  "title": "Bold title (max 5 words)",
  "content": "Concise paragraph combining main idea, practical implications, and examples",
  "quote": "Brief, impactful quote from the video",
  "timestamp": "Approximate timestamp (MM:SS format)"
}

Guidelines:
- Focus on the most important and unique ideas presented in the video.
- Keep the content concise, aiming for 2-3 sentences excluding the quote.
- Use clear, direct language without filler phrases.
- Ensure each point gives a complete picture of a key idea from the video.
- Do not include any introductory or concluding sentences in the JSON.

"#,
    );

    prompt.push_str("## Transcript\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\n");
    prompt.push_str(
        "If the transcript is too short or unsuitable for this type of analysis, return fewer points.\n",
    );

    InferenceRequest {
        system_prompt: system_prompt(),
        user_prompt: prompt,
        schema: ResponseSchema::summary(),
    }
}

/// Build the comment clustering request. Comments are numbered from zero so
/// the indices the model returns line up with `comments`.
pub fn build_comment_analysis_prompt(
    details: &VideoDetails,
    comments: &[VideoComment],
    prior_summary: Option<&str>,
    insight_request: Option<&str>,
    max_topics: usize,
) -> InferenceRequest {
    let mut prompt = String::new();

    prompt.push_str("Analyze the comments for the following YouTube video:\n");
    prompt.push_str(&format!("Title: {}\n", details.title));
    prompt.push_str(&format!("Description: {}\n\n", details.description));

    prompt.push_str(&format!(
        r#"Your task:
1. Find up to {max_topics} distinct topics: surprising or unique insights from the comments.
2. Assign comments to the topics by their index. Leave uninteresting comments unassigned.
3. Write a short, simple TLDR of the most interesting stuff you found.
4. Suggest a few follow-up topics the viewer may want to explore next.

Rules:
- Don't talk about general sentiment, engagement, or if people liked the video.
- Focus on specific, unexpected things people said or asked.
- Look for ideas that disagree with the video or each other.
- Highlight any cool ways people used or changed the video's advice.
- Point out any big questions that weren't answered in the video.
- Use simple, everyday language. No fancy words.
- If you can't find {max_topics} really interesting things, just share what you have.

"#
    ));

    if let Some(summary) = prior_summary.filter(|s| !s.trim().is_empty()) {
        prompt.push_str("## Video summary for context\n");
        prompt.push_str(summary);
        prompt.push_str(
            "\nRelate the comments to the video content where applicable, highlighting discrepancies or additions.\n\n",
        );
    }

    if let Some(request) = insight_request.filter(|s| !s.trim().is_empty()) {
        prompt.push_str("## User's specific insight request\n");
        prompt.push_str(&format!("\"{}\"\n", request.trim()));
        prompt.push_str("Prioritize topics relevant to this request.\n\n");
    }

    prompt.push_str("## Comments\n");
    for (i, comment) in comments.iter().enumerate() {
        prompt.push_str(&format!("Comment {}: {}\n", i, comment.text));
    }

    prompt.push_str(
        r#"
## Output Format
Respond with a JSON object matching this structure:
{
  "topics": [
    {
      "name": "Short, simple description of a surprise or unique thing",
      "description": "Brief description of the topic",
      "comment_indices": [0, 1, 2]
    }
  ],
  "overall_analysis": "2-3 simple sentences about the most interesting stuff you found",
  "follow_up_topics": [
    { "topic": "Topic to explore", "reason": "Why it is worth exploring" }
  ]
}
"#,
    );

    InferenceRequest {
        system_prompt: system_prompt(),
        user_prompt: prompt,
        schema: ResponseSchema::comment_analysis(),
    }
}

/// Head and tail of a prompt for debug logs
pub fn prompt_preview(prompt: &str, max_len: usize) -> String {
    let total = prompt.chars().count();
    if total <= max_len {
        return prompt.to_string();
    }

    let half = max_len / 2;
    let head: String = prompt.chars().take(half).collect();
    let tail: String = prompt.chars().skip(total - half).collect();
    format!("{}\n🙈...🙈\n{}", head, tail)
}
