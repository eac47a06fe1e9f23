use std::env;

use async_trait::async_trait;
use eyre::{Result, eyre};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error};

use crate::cli::chat::conversation_state::Turn;

pub const COMPLETION_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const MODEL_ID: &str = "llama-3.1-8b-instant";
pub const TEMPERATURE: f64 = 0.6;

const SALES_PROMPT_HEADER: &str = r#"You are the Lead Solutions Architect for PRINCEWILL.AI.

DETAILED SERVICE CATALOG:
1. AI Agent Integration (500k+): Custom LLM bots for customer support & sales.
2. Workflow Automation (350k+): Connecting WhatsApp, CRM, and Sheets to automate manual data entry.
3. E-commerce Ecosystem (450k): Full online store with inventory & payment tracking.
4. Real Estate Portal (600k): Property listings, virtual tours, and lead management.
5. School Management System (800k): Student records, fee tracking, and result processing.
6. Corporate/NGO Website (200k-300k): Professional presence with blog & contact systems.
7. Custom Software/SAAS: Starting from 1M NGN.

POLICIES:
- 50% upfront payment is mandatory.
- Explain 'Workflows' as "Digital Employees" that never sleep and don't make mistakes."#;

/// Failure of a single completion round trip: the transport broke, the
/// endpoint answered with a non-success status, or the body did not carry
/// a reply in the expected shape.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("completion response did not contain a reply")]
    MalformedResponse,
}

/// Produces one sales-oriented reply for a user message given the prior
/// conversation. One blocking round trip per call; no retry, no streaming.
#[async_trait]
pub trait ReplyGenerator {
    async fn generate(&self, message: &str, history: &[Turn]) -> Result<String, RequestError>;
}

pub struct GroqClient {
    api_key: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new() -> Result<Self> {
        let api_key = env::var("GROQ_API_KEY")
            .map_err(|_| eyre!("GROQ_API_KEY environment variable not set"))?;

        let client = reqwest::Client::new();

        Ok(Self { api_key, client })
    }
}

#[async_trait]
impl ReplyGenerator for GroqClient {
    async fn generate(&self, message: &str, history: &[Turn]) -> Result<String, RequestError> {
        let request_body = build_request_body(message, history);

        debug!("Sending completion request: {}", request_body);

        let response = self
            .client
            .post(COMPLETION_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion request failed with {}: {}", status, body);
            return Err(RequestError::Status { status, body });
        }

        let response_json: Value = response.json().await?;

        debug!("Received completion response: {}", response_json);

        extract_reply(&response_json).ok_or(RequestError::MalformedResponse)
    }
}

/// The outbound body is a pure function of (message, history) plus the fixed
/// model id and temperature, so identical inputs serialize identically.
pub fn build_request_body(message: &str, history: &[Turn]) -> Value {
    json!({
        "messages": [
            {
                "role": "user",
                "content": build_sales_prompt(message, history)
            }
        ],
        "model": MODEL_ID,
        "temperature": TEMPERATURE
    })
}

fn build_sales_prompt(message: &str, history: &[Turn]) -> String {
    let context = serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string());

    format!("{SALES_PROMPT_HEADER}\n\nCONTEXT: {context}\nUSER: \"{message}\"")
}

fn extract_reply(response: &Value) -> Option<String> {
    response
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::chat::conversation_state::{Role, Turn};

    fn sample_history() -> Vec<Turn> {
        vec![
            Turn {
                role: Role::User,
                content: "How much for a WhatsApp bot?".to_string(),
            },
            Turn {
                role: Role::Assistant,
                content: "It starts at 100k NGN.".to_string(),
            },
        ]
    }

    #[test]
    fn request_body_is_deterministic() {
        let history = sample_history();

        let first = build_request_body("Can we start this week?", &history).to_string();
        let second = build_request_body("Can we start this week?", &history).to_string();

        assert_eq!(first, second);
    }

    #[test]
    fn request_body_carries_fixed_model_and_temperature() {
        let body = build_request_body("Hello", &[]);

        assert_eq!(body["model"], MODEL_ID);
        assert_eq!(body["temperature"], TEMPERATURE);
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn sales_prompt_embeds_catalog_history_and_message() {
        let prompt = build_sales_prompt("I need a high-end E-commerce site", &sample_history());

        assert!(prompt.contains("DETAILED SERVICE CATALOG"));
        assert!(prompt.contains("50% upfront payment is mandatory."));
        assert!(prompt.contains(r#"{"role":"user","content":"How much for a WhatsApp bot?"}"#));
        assert!(prompt.contains(r#"USER: "I need a high-end E-commerce site""#));
    }

    #[test]
    fn extract_reply_reads_first_choice() {
        let response = serde_json::json!({
            "choices": [
                { "message": { "content": "It starts at 100k NGN." } },
                { "message": { "content": "ignored second choice" } }
            ]
        });

        assert_eq!(
            extract_reply(&response).as_deref(),
            Some("It starts at 100k NGN.")
        );
    }

    #[test]
    fn extract_reply_rejects_unexpected_shapes() {
        assert_eq!(extract_reply(&serde_json::json!({})), None);
        assert_eq!(extract_reply(&serde_json::json!({ "choices": [] })), None);
        assert_eq!(
            extract_reply(&serde_json::json!({ "choices": [{ "message": {} }] })),
            None
        );
        assert_eq!(
            extract_reply(&serde_json::json!({ "choices": [{ "message": { "content": 42 } }] })),
            None
        );
    }
}
