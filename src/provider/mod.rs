//! Provider bindings.
//!
//! Each provider module owns a per-stream parse state and a `parse_event`
//! entry point that reshapes provider-native stream payloads into canonical
//! [`StreamEvent`](crate::types::StreamEvent)s.

pub mod http;
pub mod openai_responses;
