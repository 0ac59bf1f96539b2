//! Built-in tools exposed by the content backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool::{require, Tool};

/// Summarizes a YouTube video from its transcript.
pub struct YoutubeSummarizer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub url: String,
    pub language: String,
    pub mode: String,
}

impl SummaryRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            language: "en".to_string(),
            mode: "detailed".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl Tool for YoutubeSummarizer {
    type Request = SummaryRequest;
    type Output = SummaryOutput;

    const NAME: &'static str = "summarize";
    const SUBMIT_PATH: &'static str = "/summarize";
    const INLINE_RESULTS: bool = true;

    fn missing_fields(request: &SummaryRequest) -> Vec<&'static str> {
        let mut missing = Vec::new();
        require("url", &request.url, &mut missing);
        require("language", &request.language, &mut missing);
        require("mode", &request.mode, &mut missing);
        missing
    }
}

/// Renders a diagram image from a text prompt.
pub struct DiagramGenerator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramOutput {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Tool for DiagramGenerator {
    type Request = DiagramRequest;
    type Output = DiagramOutput;

    const NAME: &'static str = "diagram";
    const SUBMIT_PATH: &'static str = "/diagram/generate";

    fn missing_fields(request: &DiagramRequest) -> Vec<&'static str> {
        let mut missing = Vec::new();
        require("prompt", &request.prompt, &mut missing);
        missing
    }
}

/// Builds a slide deck for a topic.
pub struct PresentationBuilder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationRequest {
    pub topic: String,
    pub slide_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationOutput {
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Tool for PresentationBuilder {
    type Request = PresentationRequest;
    type Output = PresentationOutput;

    const NAME: &'static str = "presentation";
    const SUBMIT_PATH: &'static str = "/presentation/generate";

    fn missing_fields(request: &PresentationRequest) -> Vec<&'static str> {
        let mut missing = Vec::new();
        require("topic", &request.topic, &mut missing);
        if request.slide_count == 0 {
            missing.push("slide_count");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_reported() {
        let request = SummaryRequest {
            url: "  ".to_string(),
            language: "en".to_string(),
            mode: String::new(),
        };
        assert_eq!(YoutubeSummarizer::missing_fields(&request), vec!["url", "mode"]);

        let request = SummaryRequest::new("https://youtu.be/xyz");
        assert!(YoutubeSummarizer::missing_fields(&request).is_empty());
    }

    #[test]
    fn zero_slides_is_missing() {
        let request = PresentationRequest {
            topic: "Rust".to_string(),
            slide_count: 0,
            theme: None,
        };
        assert_eq!(PresentationBuilder::missing_fields(&request), vec!["slide_count"]);
    }

    #[test]
    fn optional_request_fields_are_omitted() {
        let request = DiagramRequest {
            prompt: "a flowchart".to_string(),
            diagram_type: None,
        };
        let body = serde_json::to_string(&request).unwrap();
        assert_eq!(body, r#"{"prompt":"a flowchart"}"#);
    }
}
