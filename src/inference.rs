//! Prompted inference port
//!
//! A task is a fixed instruction block plus a named set of output fields;
//! callers supply named input fields per invocation. Implementations turn
//! one task into one model call and hand back the output fields as strings,
//! so the planner, executor, analyzer, translator, and extractor depend
//! only on the trait.
//!
//! The production client targets OpenRouter's OpenAI-compatible chat
//! completions endpoint and uses a long-lived reqwest::Client for
//! connection pooling.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};

/// Static description of one prompt task.
pub struct TaskSpec {
    pub name: &'static str,
    pub instructions: &'static str,
    pub outputs: &'static [FieldSpec],
}

pub struct FieldSpec {
    pub name: &'static str,
    pub desc: &'static str,
}

/// Named output fields returned by one inference call.
#[derive(Debug, Clone, Default)]
pub struct InferenceOutputs(HashMap<String, String>);

impl InferenceOutputs {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert, handy for scripted doubles.
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, field: &str, value: String) {
        self.0.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|s| s.as_str())
    }

    /// A missing field is treated the same as malformed output.
    pub fn require(&self, field: &str) -> Result<&str> {
        self.get(field)
            .ok_or_else(|| AgentError::Inference(format!("missing output field '{}'", field)))
    }
}

#[async_trait]
pub trait InferencePort: Send + Sync {
    /// Run one prompt task. `inputs` are (field name, value) pairs.
    async fn infer(&self, task: &TaskSpec, inputs: &[(&str, String)]) -> Result<InferenceOutputs>;
}

/// Strip an incidental markdown fence from model output.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

//
// ================= OpenRouter client =================
//

/// OpenRouter client over the OpenAI-compatible chat completions API.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenRouterClient {
    pub fn new(config: &AgentConfig) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl InferencePort for OpenRouterClient {
    async fn infer(&self, task: &TaskSpec, inputs: &[(&str, String)]) -> Result<InferenceOutputs> {
        if self.api_key.is_empty() {
            return Err(AgentError::Inference(
                "OPEN_ROUTER_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: build_system_prompt(task),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(inputs),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        info!(task = task.name, "Calling inference API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(task = task.name, "Inference request failed: {}", e);
                AgentError::Inference(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(task = task.name, "Inference API error response: {}", error_text);
            return Err(AgentError::Inference(format!("API error: {}", error_text)));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!(task = task.name, "Failed to parse inference response: {}", e);
            AgentError::Inference(format!("response parse error: {}", e))
        })?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| AgentError::Inference("empty response from model".to_string()))?;

        parse_output_fields(task, &content)
    }
}

/// Instructions plus the JSON contract for the task's output fields.
fn build_system_prompt(task: &TaskSpec) -> String {
    let mut fields = String::new();
    for field in task.outputs {
        fields.push_str(&format!("- \"{}\": {}\n", field.name, field.desc));
    }

    format!(
        "{}\n\nRespond with a single JSON object containing exactly these fields:\n{}No prose outside the JSON object.",
        task.instructions, fields
    )
}

fn build_user_prompt(inputs: &[(&str, String)]) -> String {
    inputs
        .iter()
        .map(|(name, value)| format!("{}:\n{}", name.to_uppercase(), value))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Map the model's JSON reply onto the task's declared output fields.
/// Non-string values (the model may emit a step list as a real JSON array)
/// are re-serialized so callers always see strings.
fn parse_output_fields(task: &TaskSpec, content: &str) -> Result<InferenceOutputs> {
    let cleaned = strip_code_fences(content);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        AgentError::Inference(format!("malformed model output: {} | raw={}", e, content))
    })?;

    let object = value.as_object().ok_or_else(|| {
        AgentError::Inference(format!("model output is not a JSON object | raw={}", content))
    })?;

    let mut outputs = InferenceOutputs::new();
    for field in task.outputs {
        match object.get(field.name) {
            Some(Value::String(s)) => outputs.insert(field.name, s.clone()),
            Some(other) => outputs.insert(field.name, other.to_string()),
            None => {}
        }
    }

    Ok(outputs)
}

//
// ================= Wire types =================
//

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

//
// ================= Scripted double =================
//

/// Scripted inference double for development & testing.
/// Responses are consumed in order; an exhausted script fails the call.
pub struct MockInference {
    script: Mutex<VecDeque<Result<InferenceOutputs>>>,
}

impl MockInference {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, response: Result<InferenceOutputs>) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(response);
    }
}

impl Default for MockInference {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferencePort for MockInference {
    async fn infer(&self, task: &TaskSpec, _inputs: &[(&str, String)]) -> Result<InferenceOutputs> {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(AgentError::Inference(format!(
                    "no scripted response for task '{}'",
                    task.name
                )))
            })
    }
}
