//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the diary analysis LLM.
//! It implements the `DiaryAnalysisService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = "당신은 일기 분석 전문가입니다. 사용자의 감정을 이해하고 따뜻하게 공감하며 건설적인 피드백을 제공합니다. JSON 형식으로만 응답해주세요.";

const USER_INPUT_TEMPLATE: &str = r#"다음 일기 내용을 한국어로 분석해주세요:

일기 내용: "{content}"
작성자가 선택한 감정: "{emotion}"

다음 형식의 JSON으로 분석 결과를 제공해주세요:
{
  "emotionAnalysis": {
    "primary": "주요 감정 (한국어)",
    "secondary": ["보조 감정들 (한국어 배열)"],
    "confidence": 0.85
  },
  "sentimentScore": 75,
  "themes": ["주요 주제들 (한국어 배열)"],
  "keywords": ["핵심 키워드들 (한국어 배열)"],
  "suggestions": "일기 작성자를 위한 따뜻하고 건설적인 제안사항 (한국어, 2-3문장)",
  "summary": "일기 내용을 한 문장으로 요약 (한국어)"
}

분석 기준:
- emotionAnalysis: 일기에서 느껴지는 감정을 세밀하게 분석 (confidence는 0-1 범위)
- sentimentScore: -100(매우 부정적) ~ 100(매우 긍정적) 범위의 감정 점수
- themes: 일기의 주요 주제나 상황 (최대 5개)
- keywords: 중요한 키워드나 감정 표현 (최대 8개)
- suggestions: 작성자의 마음을 이해하고 공감하는 따뜻한 조언
- summary: 일기의 핵심 내용을 간결하게 요약

따뜻하고 공감적인 톤으로 분석해주세요."#;

const DEFAULT_PRIMARY: &str = "알 수 없음";
const DEFAULT_CONFIDENCE: f64 = 0.5;
const DEFAULT_SUGGESTIONS: &str = "오늘도 소중한 일기를 써주셔서 감사합니다.";
const DEFAULT_SUMMARY: &str = "오늘의 일기";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use journal_core::{
    domain::{AnalysisResult, Emotion},
    ports::{DiaryAnalysisService, PortError, PortResult},
};
use serde_json::Value;
use tracing::{debug, error};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DiaryAnalysisService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// The chat request for one entry. The model is held to a JSON object reply.
    fn build_request(
        &self,
        content: &str,
        emotion: Emotion,
    ) -> PortResult<CreateChatCompletionRequest> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_user_input(content, emotion))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.7)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

/// Fills the prompt template. The emotion goes in first so diary text that
/// happens to contain a placeholder reaches the model unchanged.
fn build_user_input(content: &str, emotion: Emotion) -> String {
    USER_INPUT_TEMPLATE
        .replace("{emotion}", emotion.label())
        .replace("{content}", content)
}

//=========================================================================================
// Response Parsing
//=========================================================================================

/// Cuts the JSON object out of a reply that may be wrapped in a code fence.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty_str(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Turns the model's JSON into an `AnalysisResult`, filling defaults for
/// missing or mistyped fields and clamping the numeric ranges.
pub fn normalize_analysis(value: &Value) -> AnalysisResult {
    let emotion = value.get("emotionAnalysis");

    let confidence = emotion
        .and_then(|e| e.get("confidence"))
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let sentiment_score = value
        .get("sentimentScore")
        .and_then(Value::as_f64)
        .map(|s| s.clamp(-100.0, 100.0).round() as i32)
        .unwrap_or(0);

    AnalysisResult {
        primary_emotion: non_empty_str(emotion.and_then(|e| e.get("primary")), DEFAULT_PRIMARY),
        secondary_emotions: string_list(emotion.and_then(|e| e.get("secondary"))),
        confidence,
        sentiment_score,
        themes: string_list(value.get("themes")),
        keywords: string_list(value.get("keywords")),
        suggestions: non_empty_str(value.get("suggestions"), DEFAULT_SUGGESTIONS),
        summary: non_empty_str(value.get("summary"), DEFAULT_SUMMARY),
    }
}

/// Parses a raw completion into an `AnalysisResult`.
pub fn parse_analysis(raw: &str) -> PortResult<AnalysisResult> {
    let json = extract_json(raw).ok_or_else(|| {
        PortError::Unexpected("Analysis LLM response contained no JSON object.".to_string())
    })?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| PortError::Unexpected(format!("Malformed analysis JSON: {}", e)))?;
    Ok(normalize_analysis(&value))
}

//=========================================================================================
// `DiaryAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DiaryAnalysisService for OpenAiAnalysisAdapter {
    /// Asks the model for a structured analysis of one diary entry.
    async fn analyze(&self, content: &str, emotion: Emotion) -> PortResult<AnalysisResult> {
        let request = self.build_request(content, emotion)?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Diary analysis request failed: {}", e);
                PortError::Unexpected(e.to_string())
            })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected(
                    "Analysis LLM response contained no text content.".to_string(),
                )
            })?;
        debug!("Raw analysis response: {}", content);

        parse_analysis(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_response_is_kept() {
        let raw = r#"```json
{
  "emotionAnalysis": {"primary": "기쁨", "secondary": ["설렘", "감사"], "confidence": 0.85},
  "sentimentScore": 75,
  "themes": ["친구"],
  "keywords": ["산책", "웃음"],
  "suggestions": "오늘의 기쁨을 기억해 두세요.",
  "summary": "친구와 즐거운 하루를 보냈다."
}
```"#;
        let result = parse_analysis(raw).unwrap();

        assert_eq!(result.primary_emotion, "기쁨");
        assert_eq!(result.secondary_emotions, vec!["설렘", "감사"]);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.sentiment_score, 75);
        assert_eq!(result.keywords.len(), 2);
    }

    #[test]
    fn missing_and_mistyped_fields_get_defaults() {
        let result = normalize_analysis(&json!({
            "emotionAnalysis": {"secondary": "not a list", "confidence": "high"},
            "themes": ["일", 3],
            "summary": ""
        }));

        assert_eq!(result.primary_emotion, DEFAULT_PRIMARY);
        assert!(result.secondary_emotions.is_empty());
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(result.sentiment_score, 0);
        assert_eq!(result.themes, vec!["일"]);
        assert_eq!(result.suggestions, DEFAULT_SUGGESTIONS);
        assert_eq!(result.summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn scores_are_clamped() {
        let result = normalize_analysis(&json!({
            "emotionAnalysis": {"confidence": 3.2},
            "sentimentScore": -250
        }));
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.sentiment_score, -100);
    }

    #[test]
    fn diary_text_is_inserted_verbatim() {
        let input = build_user_input("내 일기 {emotion} {content}", Emotion::Sad);
        assert!(input.contains("일기 내용: \"내 일기 {emotion} {content}\""));
        assert!(input.contains("작성자가 선택한 감정: \"슬퍼요\""));
    }

    #[test]
    fn request_asks_for_a_json_object() {
        let adapter = OpenAiAnalysisAdapter::new(
            Client::with_config(OpenAIConfig::new().with_api_key("test-key")),
            "gpt-4o".to_string(),
        );
        let request = adapter.build_request("오늘은 행복했다", Emotion::Happy).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["response_format"], json!({"type": "json_object"}));
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn non_json_reply_is_an_error() {
        assert!(parse_analysis("죄송합니다, 분석할 수 없습니다.").is_err());
        assert!(parse_analysis("{ not json }").is_err());
    }
}
