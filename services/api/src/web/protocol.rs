//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the diary editor and the API
//! server for the live emotion feed.

use chrono::{DateTime, Utc};
use journal_core::emotion::{EmotionSample, EmotionScore};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The full current text of the editor.
    Content { text: String },

    /// Forget the session's history, e.g. when the editor is cleared.
    Reset,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SampleView {
    pub at: DateTime<Utc>,
    pub emotion: &'static str,
    pub intensity: u32,
}

impl From<EmotionSample> for SampleView {
    fn from(s: EmotionSample) -> Self {
        Self {
            at: s.at,
            emotion: s.emotion.as_str(),
            intensity: s.intensity,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DominantView {
    pub emotion: &'static str,
    pub intensity: u32,
}

impl From<EmotionScore> for DominantView {
    fn from(s: EmotionScore) -> Self {
        Self {
            emotion: s.emotion.as_str(),
            intensity: s.intensity,
        }
    }
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A new sample was recorded. `current` is the dominant emotion over the
    /// most recent samples.
    Sample {
        sample: SampleView,
        current: Option<DominantView>,
    },

    /// The text produced no sample; `current` is unchanged.
    Idle { current: Option<DominantView> },

    /// The client sent something the server could not understand.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_are_tagged_by_type() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "content", "text": "오늘은 행복"})).unwrap();
        assert_eq!(msg, ClientMessage::Content { text: "오늘은 행복".to_string() });

        let msg: ClientMessage = serde_json::from_value(json!({"type": "reset"})).unwrap();
        assert_eq!(msg, ClientMessage::Reset);

        assert!(serde_json::from_value::<ClientMessage>(json!({"type": "init"})).is_err());
    }

    #[test]
    fn idle_serializes_with_null_current() {
        let value = serde_json::to_value(ServerMessage::Idle { current: None }).unwrap();
        assert_eq!(value, json!({"type": "idle", "current": null}));
    }
}
