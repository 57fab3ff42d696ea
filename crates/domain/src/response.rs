//! Parsing of structured LLM output into domain records

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::model::{CommentAnalysis, CommentTopic, FollowUpTopic, SummaryPoint, VideoComment};

/// The model's answer did not have the expected shape
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to parse LLM response: {0}")]
pub struct ParseError(pub String);

/// Arguments of the `create_video_summary` function
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummaryPayload {
    /// Key points in the order they appear in the video
    pub summary: Vec<SummaryPoint>,
}

/// A topic as returned by the model, before index validation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TopicPayload {
    /// Short, simple description of a surprise or unique thing
    pub name: String,
    /// Brief description of the topic
    pub description: String,
    /// Indices of the comments assigned to this topic
    pub comment_indices: Vec<i64>,
}

/// Arguments of the `analyze_and_cluster_comments` function
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommentAnalysisPayload {
    pub topics: Vec<TopicPayload>,
    /// Overall analysis of the comments and topics
    pub overall_analysis: String,
    /// Topics the viewer may want to explore next
    #[serde(default)]
    pub follow_up_topics: Vec<FollowUpTopic>,
}

/// Parse a summary payload into its points
pub fn parse_summary(raw: &str) -> Result<Vec<SummaryPoint>, ParseError> {
    let payload: SummaryPayload = from_model_json(raw)
        .map_err(|e| ParseError(format!("invalid summary JSON: {}", e)))?;
    Ok(payload.summary)
}

/// Parse a comment analysis payload against the comments that were sent.
///
/// Indices outside `0..comments.len()` are dropped and repeated indices are
/// collapsed, keeping first-seen order.
pub fn parse_comment_analysis(
    raw: &str,
    comments: &[VideoComment],
) -> Result<CommentAnalysis, ParseError> {
    let payload: CommentAnalysisPayload = from_model_json(raw)
        .map_err(|e| ParseError(format!("invalid comment analysis JSON: {}", e)))?;

    let topics = payload
        .topics
        .into_iter()
        .map(|topic| {
            let mut indices: Vec<usize> = Vec::with_capacity(topic.comment_indices.len());
            for raw_index in &topic.comment_indices {
                match usize::try_from(*raw_index) {
                    Ok(i) if i < comments.len() => {
                        if !indices.contains(&i) {
                            indices.push(i);
                        }
                    }
                    _ => {
                        tracing::warn!(
                            topic = %topic.name,
                            index = raw_index,
                            comments = comments.len(),
                            "Dropping out-of-range comment index"
                        );
                    }
                }
            }

            CommentTopic {
                name: topic.name,
                description: topic.description,
                comment_indices: indices,
            }
        })
        .collect();

    Ok(CommentAnalysis {
        comments: comments.to_vec(),
        topics,
        overall_analysis: payload.overall_analysis,
        follow_up_topics: payload.follow_up_topics,
    })
}

/// Deserialize the model's answer, falling back to a fenced block only when
/// the answer as a whole is not JSON
fn from_model_json<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let trimmed = raw.trim();
    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(err) => {
            let extracted = extract_json(trimmed);
            if extracted == trimmed {
                return Err(err);
            }
            serde_json::from_str(extracted)
        }
    }
}

/// Extract JSON from response (handles markdown code blocks)
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return trimmed[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let content = trimmed[start + 3..start + 3 + end].trim();
            // Skip language identifier if present
            if let Some(newline) = content.find('\n') {
                let first_line = &content[..newline];
                if !first_line.starts_with('{') {
                    return content[newline + 1..].trim();
                }
            }
            return content;
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comments(n: usize) -> Vec<VideoComment> {
        (0..n)
            .map(|i| VideoComment::new(format!("comment {}", i)))
            .collect()
    }

    #[test]
    fn test_extract_json_raw() {
        let input = r#"{"summary": []}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn test_extract_json_code_block() {
        let input = "```json\n{\"summary\": []}\n```";
        assert_eq!(extract_json(input), r#"{"summary": []}"#);
    }

    #[test]
    fn test_extract_json_untagged_block() {
        let input = "Here you go:\n```\n{\"summary\": []}\n```";
        assert_eq!(extract_json(input), r#"{"summary": []}"#);
    }

    #[test]
    fn test_parse_summary_valid() {
        let raw = r#"{
            "summary": [
                {
                    "emoji": "🤖",
                    "title": "AI Changes Work",
                    "content": "AI is revolutionizing industries.",
                    "quote": "AI has the potential to solve complex problems",
                    "timestamp": "01:23"
                }
            ]
        }"#;

        let points = parse_summary(raw).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].title, "AI Changes Work");
        assert_eq!(points[0].timestamp, "01:23");
    }

    #[test]
    fn test_parse_summary_keeps_fences_inside_strings() {
        let raw = r#"{"summary":[{"emoji":"💻","title":"Use Code Blocks","content":"Wrap snippets in ```rust fences``` so they render.","quote":"q","timestamp":"01:00"}]}"#;

        let points = parse_summary(raw).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(
            points[0].content,
            "Wrap snippets in ```rust fences``` so they render."
        );
    }

    #[test]
    fn test_parse_summary_fenced_answer() {
        let raw = "Sure:\n```json\n{\"summary\": []}\n```";
        assert!(parse_summary(raw).unwrap().is_empty());
    }

    #[test]
    fn test_parse_summary_rejects_malformed_json() {
        assert!(parse_summary("{\"summary\": [").is_err());
        assert!(parse_summary("not json at all").is_err());
    }

    #[test]
    fn test_parse_summary_rejects_missing_keys() {
        assert!(parse_summary(r#"{"points": []}"#).is_err());
        assert!(parse_summary(r#"{"summary": [{"emoji": "x", "title": "t"}]}"#).is_err());
    }

    #[test]
    fn test_parse_comment_analysis_valid() {
        let raw = r#"{
            "topics": [
                {"name": "Ethics", "description": "Ethical worries", "comment_indices": [1, 3]}
            ],
            "overall_analysis": "Viewers worry about AI ethics.",
            "follow_up_topics": [{"topic": "AI regulation", "reason": "Asked twice"}]
        }"#;

        let analysis = parse_comment_analysis(raw, &comments(4)).unwrap();

        assert_eq!(analysis.comments.len(), 4);
        assert_eq!(analysis.topics.len(), 1);
        assert_eq!(analysis.topics[0].comment_indices, vec![1, 3]);
        assert_eq!(analysis.follow_up_topics.len(), 1);
    }

    #[test]
    fn test_parse_comment_analysis_drops_out_of_range_indices() {
        let raw = r#"{
            "topics": [
                {"name": "A", "description": "a", "comment_indices": [0, 2, 7, -1, 2]},
                {"name": "B", "description": "b", "comment_indices": [99]}
            ],
            "overall_analysis": "Summary"
        }"#;
        let input = comments(3);

        let analysis = parse_comment_analysis(raw, &input).unwrap();

        assert_eq!(analysis.topics[0].comment_indices, vec![0, 2]);
        assert!(analysis.topics[1].comment_indices.is_empty());
        for topic in &analysis.topics {
            assert!(topic.comment_indices.iter().all(|&i| i < analysis.comments.len()));
        }
        assert!(analysis.follow_up_topics.is_empty());
    }

    #[test]
    fn test_parse_comment_analysis_rejects_missing_overall() {
        let raw = r#"{"topics": []}"#;
        assert!(parse_comment_analysis(raw, &comments(2)).is_err());
    }
}
