//! OpenAI Responses API binding.
//!
//! Two concerns share this boundary: the streaming state machine that
//! reshapes Responses API events into canonical [`StreamEvent`]s, and the
//! stateless conversion of outbound messages into the API's input shape.
//!
//! The Responses API may stream reasoning-summary text either incrementally
//! (many `reasoning_summary_text.delta` events) or as a finalized block
//! (`reasoning_summary_part.added` followed by `..part.done` with no
//! deltas), and sends both channels for the same content within one
//! response. [`parse_event`] presents one consistent canonical stream to the
//! UI regardless of which combination arrived: each reasoning segment
//! reaches the sink exactly once.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;

use crate::config::EaselConfig;
use crate::error::Result;
use crate::types::{AgentToolCall, ContentPart, ImageDetail, ModelMessage, Role, StreamEvent};

use super::http::{bearer_headers, parse_sse_data, shared_client, status_to_error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Async sink invoked with each canonical event, in arrival order.
///
/// Must not panic; any failure inside the sink is the caller's to isolate.
pub type EventSink =
    Arc<dyn Fn(StreamEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Recognized Responses API stream events, plus a passthrough variant so
/// new provider event kinds stay additive.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponsesEvent {
    /// `response.reasoning_summary_text.delta`
    ReasoningSummaryTextDelta { delta: String },
    /// `response.reasoning_summary_part.added`
    ReasoningSummaryPartAdded,
    /// `response.reasoning_summary_part.done`
    ReasoningSummaryPartDone { text: String },
    /// `response.output_text.delta`
    OutputTextDelta { delta: String },
    /// `response.function_call_arguments.delta`
    FunctionCallArgumentsDelta { item_id: String, delta: String },
    /// `response.output_item.done`
    OutputItemDone { item: serde_json::Value },
    /// `response.completed`
    Completed,
    /// `response.failed` / `error`
    Failed { message: String },
    /// Anything else; ignored by the parser.
    Unrecognized,
}

impl RawResponsesEvent {
    /// Classify a raw payload.
    ///
    /// Unknown `type` values are never an error; a recognized `type` missing
    /// its expected payload key is malformed and reported as `Err` with a
    /// description.
    pub fn from_value(raw: &serde_json::Value) -> std::result::Result<Self, String> {
        let event_type = raw.get("type").and_then(|t| t.as_str()).unwrap_or("");
        match event_type {
            "response.reasoning_summary_text.delta" => {
                let delta = raw
                    .get("delta")
                    .and_then(|d| d.as_str())
                    .ok_or_else(|| format!("{event_type} missing 'delta'"))?;
                Ok(Self::ReasoningSummaryTextDelta {
                    delta: delta.to_string(),
                })
            }
            "response.reasoning_summary_part.added" => {
                raw.get("part")
                    .and_then(|p| p.as_object())
                    .ok_or_else(|| format!("{event_type} missing 'part'"))?;
                Ok(Self::ReasoningSummaryPartAdded)
            }
            "response.reasoning_summary_part.done" => {
                let text = raw
                    .get("part")
                    .and_then(|p| p.get("text"))
                    .and_then(|t| t.as_str())
                    .ok_or_else(|| format!("{event_type} missing 'part.text'"))?;
                Ok(Self::ReasoningSummaryPartDone {
                    text: text.to_string(),
                })
            }
            "response.output_text.delta" => {
                let delta = raw
                    .get("delta")
                    .and_then(|d| d.as_str())
                    .ok_or_else(|| format!("{event_type} missing 'delta'"))?;
                Ok(Self::OutputTextDelta {
                    delta: delta.to_string(),
                })
            }
            "response.function_call_arguments.delta" => {
                let item_id = raw
                    .get("item_id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| format!("{event_type} missing 'item_id'"))?;
                let delta = raw
                    .get("delta")
                    .and_then(|d| d.as_str())
                    .ok_or_else(|| format!("{event_type} missing 'delta'"))?;
                Ok(Self::FunctionCallArgumentsDelta {
                    item_id: item_id.to_string(),
                    delta: delta.to_string(),
                })
            }
            "response.output_item.done" => {
                let item = raw
                    .get("item")
                    .cloned()
                    .ok_or_else(|| format!("{event_type} missing 'item'"))?;
                Ok(Self::OutputItemDone { item })
            }
            "response.completed" => Ok(Self::Completed),
            "response.failed" | "error" => {
                let message = raw
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .or_else(|| raw.get("message").and_then(|m| m.as_str()))
                    .unwrap_or("provider reported a failure");
                Ok(Self::Failed {
                    message: message.to_string(),
                })
            }
            _ => Ok(Self::Unrecognized),
        }
    }
}

/// Mutable per-stream parse state.
///
/// One instance per provider response; never shared across concurrent
/// streams.
#[derive(Debug, Default)]
pub struct ResponsesParseState {
    /// Whether a reasoning-summary delta stream is open for the current
    /// segment.
    summary_delta_open: bool,
    /// Text already emitted for the current reasoning segment.
    summary_buffer: String,
    /// Accumulated function-call argument fragments keyed by item id.
    call_arguments: HashMap<String, String>,
    /// Tool calls already forwarded to the sink.
    emitted_calls: HashSet<String>,
}

impl ResponsesParseState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Consume one raw stream event, forwarding zero or more canonical events.
///
/// Sink invocation order matches raw event arrival order; nothing is
/// buffered beyond the current reasoning segment. Malformed recognized
/// events become a canonical [`StreamEvent::Error`] rather than an `Err`,
/// so the stream can continue.
pub async fn parse_event(raw: &serde_json::Value, state: &mut ResponsesParseState, sink: &EventSink) {
    let event = match RawResponsesEvent::from_value(raw) {
        Ok(event) => event,
        Err(message) => {
            debug!(%message, "malformed Responses stream event");
            sink(StreamEvent::error(message)).await;
            return;
        }
    };

    match event {
        RawResponsesEvent::ReasoningSummaryTextDelta { delta } => {
            state.summary_buffer.push_str(&delta);
            state.summary_delta_open = true;
            sink(StreamEvent::thinking(delta)).await;
        }
        RawResponsesEvent::ReasoningSummaryPartAdded => {
            // Segment boundary only; emission happens via deltas or the
            // matching part.done.
            if !state.summary_delta_open {
                state.summary_buffer.clear();
            }
        }
        RawResponsesEvent::ReasoningSummaryPartDone { text } => {
            if state.summary_delta_open {
                // Already streamed incrementally; this is pure finalization.
                if state.summary_buffer != text {
                    debug!(
                        streamed = state.summary_buffer.len(),
                        finalized = text.len(),
                        "reasoning part.done text differs from streamed deltas"
                    );
                }
            } else {
                // The part arrived whole, with no intervening deltas.
                sink(StreamEvent::thinking(text)).await;
            }
            state.summary_delta_open = false;
            state.summary_buffer.clear();
        }
        RawResponsesEvent::OutputTextDelta { delta } => {
            sink(StreamEvent::text(delta)).await;
        }
        RawResponsesEvent::FunctionCallArgumentsDelta { item_id, delta } => {
            state
                .call_arguments
                .entry(item_id)
                .or_default()
                .push_str(&delta);
        }
        RawResponsesEvent::OutputItemDone { item } => {
            if let Some(tool_call) = extract_function_call(&item, state) {
                if state.emitted_calls.insert(tool_call.id.clone()) {
                    sink(StreamEvent::ToolCallDelta { tool_call }).await;
                }
            }
        }
        RawResponsesEvent::Completed => {
            sink(StreamEvent::Done).await;
        }
        RawResponsesEvent::Failed { message } => {
            sink(StreamEvent::error(message)).await;
        }
        RawResponsesEvent::Unrecognized => {}
    }
}

/// Pull a completed function call out of an output item, falling back to
/// arguments accumulated from earlier delta events.
fn extract_function_call(
    item: &serde_json::Value,
    state: &mut ResponsesParseState,
) -> Option<AgentToolCall> {
    if item.get("type").and_then(|t| t.as_str()) != Some("function_call") {
        return None;
    }
    let id = item
        .get("call_id")
        .and_then(|v| v.as_str())
        .or_else(|| item.get("id").and_then(|v| v.as_str()))?
        .to_string();
    let name = item.get("name").and_then(|v| v.as_str())?.to_string();
    // Argument deltas arrive keyed by the provider's item id, which may
    // differ from the call id preferred above; try both when falling back.
    let args = item
        .get("arguments")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .or_else(|| state.call_arguments.remove(&id))
        .or_else(|| {
            item.get("id")
                .and_then(|v| v.as_str())
                .and_then(|item_id| state.call_arguments.remove(item_id))
        })?;
    let arguments =
        serde_json::from_str(&args).unwrap_or(serde_json::Value::String(args));
    Some(AgentToolCall { id, name, arguments })
}

/// Convert one outbound message into a Responses API input item.
///
/// Pure and stateless. Image parts default their fidelity hint to `"high"`
/// when the message leaves it unset; an explicit hint is preserved verbatim.
pub fn message_to_responses_input(message: &ModelMessage) -> serde_json::Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let content: Vec<serde_json::Value> = message
        .content
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } => Some(serde_json::json!({
                "type": "input_text",
                "text": text,
            })),
            ContentPart::Image(img) => {
                let detail = img.detail.unwrap_or(ImageDetail::High);
                Some(serde_json::json!({
                    "type": "input_image",
                    "image_url": img.url,
                    "detail": detail.to_string(),
                }))
            }
            // Tool plumbing travels as dedicated top-level input items;
            // messages_to_responses_input flattens it out of the content.
            ContentPart::ToolCall(_) | ContentPart::ToolResult(_) => None,
        })
        .collect();

    serde_json::json!({
        "role": role,
        "content": content,
    })
}

/// Convert a conversation into the Responses API input list.
///
/// Text and image content goes through [`message_to_responses_input`];
/// assistant tool calls and tool results are flattened into top-level
/// `function_call` / `function_call_output` items so tool history round-trips
/// back to the provider.
pub fn messages_to_responses_input(messages: &[ModelMessage]) -> Vec<serde_json::Value> {
    let mut input = Vec::new();
    for message in messages {
        if message.role == Role::Tool {
            for part in &message.content {
                if let ContentPart::ToolResult(tr) = part {
                    input.push(serde_json::json!({
                        "type": "function_call_output",
                        "call_id": tr.tool_call_id,
                        "output": tool_result_to_string(&tr.result),
                    }));
                }
            }
            continue;
        }

        let item = message_to_responses_input(message);
        let has_content = item
            .get("content")
            .and_then(|c| c.as_array())
            .is_some_and(|c| !c.is_empty());
        if has_content {
            input.push(item);
        }

        if message.role == Role::Assistant {
            for part in &message.content {
                if let ContentPart::ToolCall(tc) = part {
                    input.push(serde_json::json!({
                        "type": "function_call",
                        "call_id": tc.id,
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }));
                }
            }
        }
    }
    input
}

/// Render a tool result for the `function_call_output` wire field, which is
/// always a string.
fn tool_result_to_string(result: &serde_json::Value) -> String {
    match result {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Thin streaming client for the Responses API.
///
/// Posts a request body and pumps the SSE stream through [`parse_event`]
/// into the caller's sink. The caller owns request construction; the client
/// only forces `"stream": true`.
pub struct ResponsesClient {
    api_key: String,
    base_url: String,
}

impl ResponsesClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Build a client from loaded configuration.
    ///
    /// Fails with an authentication error when no OpenAI key is configured;
    /// a configured base URL override is honored.
    pub fn from_config(config: &EaselConfig) -> Result<Self> {
        let mut client = Self::new(config.require_openai_key()?);
        if let Some(base_url) = &config.openai_base_url {
            client.base_url = base_url.clone();
        }
        Ok(client)
    }

    /// Override the API base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Stream one response, invoking the sink for each canonical event.
    ///
    /// Returns once the provider signals `[DONE]` or the connection ends.
    /// Protocol-level problems inside the stream surface as canonical error
    /// events; transport and HTTP-status failures return `Err`.
    pub async fn stream(&self, mut body: serde_json::Value, sink: &EventSink) -> Result<()> {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("stream".into(), true.into());
        }
        let url = format!("{}/responses", self.base_url);
        debug!(url = %url, "OpenAI Responses stream");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let mut state = ResponsesParseState::new();
        let mut buffer = String::new();
        let byte_stream = resp.bytes_stream();
        futures::pin_mut!(byte_stream);

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].trim_end_matches('\r').to_string();
                buffer.drain(..=line_end);

                let Some(data) = parse_sse_data(&line) else {
                    if line.starts_with("data: ") {
                        // parse_sse_data returned None for [DONE].
                        return Ok(());
                    }
                    continue;
                };
                match serde_json::from_str::<serde_json::Value>(data) {
                    Ok(raw) => parse_event(&raw, &mut state, sink).await,
                    Err(err) => {
                        sink(StreamEvent::error(format!("malformed stream payload: {err}")))
                            .await;
                    }
                }
            }
        }

        Ok(())
    }
}
