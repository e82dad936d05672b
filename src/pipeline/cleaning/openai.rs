use serde::{Deserialize, Serialize};

use super::{build_user_message, parse_cleaned, BatchCleaner, CleaningError, SYSTEM_PROMPT};
use crate::models::ExtractionRecord;

pub const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TOKENS: u32 = 16000;

/// Chat-completions client that cleans record batches.
pub struct OpenAiCleaner {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiCleaner {
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, CleaningError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CleaningError::Http(e.to_string()))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Point at a compatible endpoint instead of the public API.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        }
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, CleaningError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CleaningError::MalformedResponse("response has no message content".into()))
    }
}

impl BatchCleaner for OpenAiCleaner {
    fn clean_batch(&self, records: &[ExtractionRecord]) -> Result<Vec<ExtractionRecord>, CleaningError> {
        let url = format!("{}/chat/completions", self.base_url);
        let user = build_user_message(records)?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&user))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    CleaningError::Http(format!("Request timed out after {}s", self.timeout_secs))
                } else {
                    CleaningError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CleaningError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| CleaningError::MalformedResponse(e.to_string()))?;

        parse_cleaned(&parsed.into_text()?, records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_system_rules_and_token_limit() {
        let cleaner = OpenAiCleaner::new("sk-test", DEFAULT_MODEL, 30).unwrap();
        let value = serde_json::to_value(cleaner.request_body("Clean these 1 plant records")).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["max_tokens"], 16000);
        assert_eq!(value["messages"][0]["role"], "system");
        assert!(value["messages"][0]["content"]
            .as_str()
            .unwrap()
            .starts_with("You are a data cleaning assistant"));
        assert_eq!(value["messages"][1]["content"], "Clean these 1 plant records");
    }

    #[test]
    fn base_url_is_normalized() {
        let cleaner = OpenAiCleaner::new("sk-test", "gpt-4o-mini", 30)
            .unwrap()
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(cleaner.base_url, "http://localhost:8080/v1");
        assert_eq!(cleaner.model(), "gpt-4o-mini");
    }

    #[test]
    fn reply_text_comes_from_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"[]"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "[]");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(CleaningError::MalformedResponse(_))));
    }
}
