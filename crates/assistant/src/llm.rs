//! OpenAI-compatible chat completions client for the conservation assistant.

use std::fmt::Write as _;
use std::time::Duration;

use museum_core::anomaly::AnomalyVerdict;
use museum_core::sensor::SensorReading;
use museum_core::thresholds::ThresholdSet;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ensure_success, AssistantError};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Low temperature: answers should be factual, not creative.
const TEMPERATURE: f64 = 0.2;

const SYSTEM_PROMPT: &str = "You are an expert in museum environmental monitoring and artifact \
conservation. Answer questions about temperature, humidity and vibration conditions for \
exhibits concisely and practically. When sensor data is provided, ground your answer in it.";

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Value,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

/// Current conditions for one exhibit, embedded in the system prompt.
#[derive(Debug, Clone)]
pub struct ExhibitSnapshot {
    pub name: String,
    pub reading: SensorReading,
    pub thresholds: ThresholdSet,
    pub verdict: AnomalyVerdict,
    pub explanation: String,
}

/// Client for a single chat model.
pub struct ChatClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(
        endpoint: &str,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: resolve_chat_endpoint(endpoint),
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model a question, optionally grounded in caller context and
    /// an exhibit snapshot. Returns the trimmed text of the first choice.
    pub async fn reply(
        &self,
        message: &str,
        context: Option<&str>,
        snapshot: Option<&ExhibitSnapshot>,
    ) -> Result<String, AssistantError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt(context, snapshot) },
                { "role": "user", "content": message },
            ],
            "temperature": TEMPERATURE,
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body: CompletionResponse = response.json().await?;
        let choice = body.choices.first().ok_or_else(|| {
            AssistantError::InvalidResponse("response did not include choices".into())
        })?;

        let text = extract_text(&choice.message.content);
        let text = text.trim();
        if text.is_empty() {
            return Err(AssistantError::InvalidResponse("empty completion".into()));
        }
        Ok(text.to_string())
    }
}

/// Accept either a base URL or a full `/chat/completions` URL.
fn resolve_chat_endpoint(endpoint: &str) -> String {
    if endpoint.contains("/chat/completions") {
        endpoint.to_string()
    } else {
        format!("{}/chat/completions", endpoint.trim_end_matches('/'))
    }
}

/// Content may be a plain string or an array of typed parts.
fn extract_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

pub(crate) fn system_prompt(context: Option<&str>, snapshot: Option<&ExhibitSnapshot>) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        let _ = write!(prompt, "\n\nAdditional context from the user:\n{context}");
    }

    if let Some(s) = snapshot {
        let t = &s.thresholds;
        let _ = write!(
            prompt,
            "\n\nCurrent conditions for exhibit \"{name}\":\n\
             - Temperature: {temp}°C (acceptable {tmin}-{tmax}°C)\n\
             - Humidity: {hum}% (acceptable {hmin}-{hmax}%)\n\
             - Vibration: {vib} (maximum {vmax})\n\
             - Status: {status} (score {score:.2})\n\
             - Assessment: {explanation}",
            name = s.name,
            temp = s.reading.temperature,
            tmin = t.temperature.min,
            tmax = t.temperature.max,
            hum = s.reading.humidity,
            hmin = t.humidity.min,
            hmax = t.humidity.max,
            vib = s.reading.vibration,
            vmax = t.vibration.max,
            status = if s.verdict.is_anomaly { "ANOMALY" } else { "normal" },
            score = s.verdict.anomaly_score,
            explanation = s.explanation,
        );
    }

    prompt
}
