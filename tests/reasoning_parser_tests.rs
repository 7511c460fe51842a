//! Tests for the Responses stream parser and outbound message conversion.

use std::sync::Arc;

use tokio::sync::Mutex;

use easel::provider::openai_responses::{
    message_to_responses_input, parse_event, EventSink, ResponsesParseState,
};
use easel::types::{ImageContent, ImageDetail, ModelMessage, StreamEvent};

fn collecting_sink() -> (EventSink, Arc<Mutex<Vec<StreamEvent>>>) {
    let events: Arc<Mutex<Vec<StreamEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink: EventSink = Arc::new(move |event| {
        let events = sink_events.clone();
        Box::pin(async move {
            events.lock().await.push(event);
        })
    });
    (sink, events)
}

fn thinking_texts(events: &[StreamEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::ThinkingDelta { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn reasoning_summary_part_skipped_after_summary_delta() {
    let (sink, events) = collecting_sink();
    let mut state = ResponsesParseState::new();

    parse_event(
        &serde_json::json!({
            "type": "response.reasoning_summary_text.delta",
            "delta": "Planning step.",
        }),
        &mut state,
        &sink,
    )
    .await;
    parse_event(
        &serde_json::json!({
            "type": "response.reasoning_summary_part.done",
            "part": { "text": "Planning step." },
        }),
        &mut state,
        &sink,
    )
    .await;

    let events = events.lock().await;
    assert_eq!(thinking_texts(&events), vec!["Planning step."]);
}

#[tokio::test]
async fn reasoning_summary_part_added_and_done_emits_once() {
    let (sink, events) = collecting_sink();
    let mut state = ResponsesParseState::new();

    parse_event(
        &serde_json::json!({
            "type": "response.reasoning_summary_part.added",
            "part": { "text": "Refining layout and assets." },
        }),
        &mut state,
        &sink,
    )
    .await;
    parse_event(
        &serde_json::json!({
            "type": "response.reasoning_summary_part.done",
            "part": { "text": "Refining layout and assets." },
        }),
        &mut state,
        &sink,
    )
    .await;

    let events = events.lock().await;
    assert_eq!(thinking_texts(&events), vec!["Refining layout and assets."]);
}

#[tokio::test]
async fn streams_stay_independent() {
    // Two concurrent responses each own their state; deltas in one must not
    // suppress the whole-part emission in the other.
    let (sink, events) = collecting_sink();
    let mut first = ResponsesParseState::new();
    let mut second = ResponsesParseState::new();

    parse_event(
        &serde_json::json!({
            "type": "response.reasoning_summary_text.delta",
            "delta": "Stream one.",
        }),
        &mut first,
        &sink,
    )
    .await;
    parse_event(
        &serde_json::json!({
            "type": "response.reasoning_summary_part.done",
            "part": { "text": "Stream two." },
        }),
        &mut second,
        &sink,
    )
    .await;

    let events = events.lock().await;
    assert_eq!(thinking_texts(&events), vec!["Stream one.", "Stream two."]);
}

#[test]
fn convert_image_defaults_to_high_detail() {
    let message = ModelMessage::user_with_image(
        "place this on the canvas",
        ImageContent {
            url: "data:image/png;base64,abc".into(),
            detail: None,
        },
    );
    let input = message_to_responses_input(&message);
    assert_eq!(input["content"][1]["type"], "input_image");
    assert_eq!(input["content"][1]["detail"], "high");
}

#[test]
fn convert_image_preserves_explicit_detail() {
    let message = ModelMessage::user_with_image(
        "place this on the canvas",
        ImageContent {
            url: "data:image/png;base64,abc".into(),
            detail: Some(ImageDetail::Low),
        },
    );
    let input = message_to_responses_input(&message);
    assert_eq!(input["content"][1]["detail"], "low");
}
