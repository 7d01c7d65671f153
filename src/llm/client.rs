// Claude API client for trip generation and chat.
//
// Sends a single non-streaming request to the Anthropic Messages API,
// extracts the first text block from the response, and (for trip
// generation) parses it as itinerary JSON. Any failure, missing key, or
// unparseable reply falls back to the mock itineraries.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::llm::{mock, prompt, TripRequest};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Low-level Claude Messages API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    /// Create a new client with the given API key and model identifier.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Send one message and return the first text block of the reply.
    pub async fn complete(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
    ) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("API returned status {status}");
        }

        let reply: Value = response.json().await?;
        let text = extract_reply_text(&reply)
            .ok_or_else(|| anyhow::anyhow!("no text block in API response"))?;
        debug!(chars = text.len(), "received completion");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that can be either an active Claude client or
/// disabled. When disabled, every operation serves mock data.
pub enum LlmClient {
    /// Claude API is configured and ready.
    Active(ClaudeClient),
    /// LLM functionality is disabled (no API key configured).
    Disabled,
}

/// The outcome of a trip-generation call, tagging whether the itinerary
/// came from the live API or the fallback generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedTrip {
    pub plan: Value,
    pub source: TripSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripSource {
    Live,
    Fallback,
}

impl TripSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripSource::Live => "live",
            TripSource::Fallback => "fallback",
        }
    }
}

impl LlmClient {
    /// Build an `LlmClient` from the application config.
    ///
    /// Returns `Active` if an Anthropic API key is present in credentials,
    /// otherwise returns `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => {
                let model = config.llm.model.clone();
                LlmClient::Active(ClaudeClient::new(key.clone(), model))
            }
            _ => LlmClient::Disabled,
        }
    }

    /// Generate a trip itinerary. Never fails: any problem with the live
    /// call degrades to the keyword-matched mock itinerary.
    pub async fn generate_trip(&self, req: &TripRequest, max_tokens: u32) -> GeneratedTrip {
        let client = match self {
            LlmClient::Active(client) => client,
            LlmClient::Disabled => {
                return GeneratedTrip {
                    plan: mock::mock_itinerary(req),
                    source: TripSource::Fallback,
                };
            }
        };

        let system = prompt::trip_system_prompt();
        let user = prompt::build_trip_prompt(req);

        match client.complete(&system, &user, max_tokens).await {
            Ok(text) => match parse_itinerary(&text) {
                Some(plan) => GeneratedTrip {
                    plan,
                    source: TripSource::Live,
                },
                None => {
                    warn!("itinerary reply was not parseable JSON; using fallback");
                    GeneratedTrip {
                        plan: mock::mock_itinerary(req),
                        source: TripSource::Fallback,
                    }
                }
            },
            Err(e) => {
                warn!("trip generation call failed: {e}; using fallback");
                GeneratedTrip {
                    plan: mock::mock_itinerary(req),
                    source: TripSource::Fallback,
                }
            }
        }
    }

    /// Answer a chat turn. Degrades to a canned reply when disabled or on
    /// any upstream failure.
    pub async fn chat(
        &self,
        message: &str,
        history: &[(String, String)],
        max_tokens: u32,
    ) -> String {
        let client = match self {
            LlmClient::Active(client) => client,
            LlmClient::Disabled => return mock::canned_chat_reply(message),
        };

        let system = prompt::chat_system_prompt();
        let user = prompt::build_chat_prompt(message, history);

        match client.complete(&system, &user, max_tokens).await {
            Ok(text) => text,
            Err(e) => {
                warn!("chat call failed: {e}; using canned reply");
                mock::canned_chat_reply(message)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing helpers
// ---------------------------------------------------------------------------

/// Extract the first text block from a Messages API response.
///
/// Expected shape: `{ "content": [ { "type": "text", "text": "..." } ] }`
pub(crate) fn extract_reply_text(reply: &Value) -> Option<String> {
    reply
        .get("content")?
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Parse model output into an itinerary JSON object, tolerating Markdown
/// code fences and surrounding prose.
pub(crate) fn parse_itinerary(text: &str) -> Option<Value> {
    let stripped = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Last resort: take the outermost brace-delimited span.
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&stripped[start..=end])
        .ok()
        .filter(Value::is_object)
}

/// Remove a leading/trailing Markdown code fence (``` or ```json) if the
/// reply is wrapped in one.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_request() -> TripRequest {
        TripRequest {
            destination: "Kyoto".to_string(),
            duration_days: 3,
            budget: "moderate".to_string(),
            interests: vec![],
            notes: String::new(),
        }
    }

    // -- Response parsing --

    #[test]
    fn extract_text_from_messages_response() {
        let reply = json!({
            "id": "msg_123",
            "content": [
                { "type": "text", "text": "{\"destination\":\"Kyoto\"}" }
            ],
            "usage": { "input_tokens": 10, "output_tokens": 20 }
        });
        assert_eq!(
            extract_reply_text(&reply),
            Some("{\"destination\":\"Kyoto\"}".to_string())
        );
    }

    #[test]
    fn extract_text_skips_non_text_blocks() {
        let reply = json!({
            "content": [
                { "type": "tool_use", "id": "tu_1" },
                { "type": "text", "text": "hello" }
            ]
        });
        assert_eq!(extract_reply_text(&reply), Some("hello".to_string()));
    }

    #[test]
    fn extract_text_none_for_empty_content() {
        let reply = json!({ "content": [] });
        assert_eq!(extract_reply_text(&reply), None);
    }

    #[test]
    fn parse_bare_json_object() {
        let plan = parse_itinerary(r#"{"destination": "Kyoto", "days": []}"#).unwrap();
        assert_eq!(plan["destination"], "Kyoto");
    }

    #[test]
    fn parse_fenced_json() {
        let text = "```json\n{\"destination\": \"Kyoto\"}\n```";
        let plan = parse_itinerary(text).unwrap();
        assert_eq!(plan["destination"], "Kyoto");
    }

    #[test]
    fn parse_fenced_json_without_info_string() {
        let text = "```\n{\"destination\": \"Oslo\"}\n```";
        let plan = parse_itinerary(text).unwrap();
        assert_eq!(plan["destination"], "Oslo");
    }

    #[test]
    fn parse_json_with_surrounding_prose() {
        let text = "Here is your itinerary:\n{\"destination\": \"Lima\"}\nEnjoy!";
        let plan = parse_itinerary(text).unwrap();
        assert_eq!(plan["destination"], "Lima");
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(parse_itinerary("[1, 2, 3]").is_none());
        assert!(parse_itinerary("just words, no json").is_none());
        assert!(parse_itinerary("").is_none());
    }

    // -- Disabled client fallbacks --

    #[tokio::test]
    async fn disabled_client_generates_fallback_itinerary() {
        let client = LlmClient::Disabled;
        let req = sample_request();

        let generated = client.generate_trip(&req, 1024).await;
        assert_eq!(generated.source, TripSource::Fallback);
        assert_eq!(generated.plan["destination"], "Kyoto");
        assert_eq!(generated.plan["days"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn disabled_client_chat_uses_canned_reply() {
        let client = LlmClient::Disabled;
        let reply = client.chat("Do I need a visa?", &[], 256).await;
        assert!(reply.contains("Visa"));
    }

    // -- LlmClient::from_config --

    fn make_test_config(api_key: Option<String>) -> Config {
        use crate::config::*;
        Config {
            server: ServerConfig {
                port: 8080,
                db_path: ":memory:".to_string(),
            },
            llm: LlmConfig {
                model: "claude-sonnet-4-5-20250929".to_string(),
                trip_max_tokens: 4096,
                chat_max_tokens: 1024,
            },
            fallback: FallbackConfig { result_count: 6 },
            credentials: CredentialsConfig {
                anthropic_api_key: api_key,
                ..Default::default()
            },
        }
    }

    #[test]
    fn from_config_with_api_key_returns_active() {
        let config = make_test_config(Some("sk-ant-test-key".to_string()));
        let client = LlmClient::from_config(&config);
        assert!(matches!(client, LlmClient::Active(_)));
    }

    #[test]
    fn from_config_without_api_key_returns_disabled() {
        let config = make_test_config(None);
        let client = LlmClient::from_config(&config);
        assert!(matches!(client, LlmClient::Disabled));
    }

    #[test]
    fn from_config_with_empty_api_key_returns_disabled() {
        let config = make_test_config(Some(String::new()));
        let client = LlmClient::from_config(&config);
        assert!(matches!(client, LlmClient::Disabled));
    }

    // -- Integration-style test with a mock HTTP server --

    #[tokio::test]
    async fn mock_api_server_full_flow() {
        use tokio::io::AsyncWriteExt;
        use tokio::net::TcpListener;

        // Start a local TCP server that speaks enough HTTP to answer one
        // Messages API call.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let body = serde_json::json!({
            "id": "msg_1",
            "content": [
                { "type": "text", "text": "{\"destination\":\"Kyoto\",\"days\":[]}" }
            ]
        })
        .to_string();

        let server_task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut buf = vec![0u8; 8192];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        });

        // Drive the same request/parse path `complete` uses, against the
        // mock server.
        let http = reqwest::Client::new();
        let response = http
            .post(format!("http://{addr}"))
            .header("content-type", "application/json")
            .json(&serde_json::json!({"model": "test"}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let reply: Value = response.json().await.unwrap();
        let text = extract_reply_text(&reply).unwrap();
        let plan = parse_itinerary(&text).unwrap();
        assert_eq!(plan["destination"], "Kyoto");

        let _ = server_task.await;
    }
}
