use serde::{Deserialize, Serialize};

/// Response wrapper used by the resource backend on every endpoint.
///
/// Failure responses carry the same shape with `data: null` and a
/// human-readable `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Error body shape shared by envelope-style backends; only `message` matters
/// to the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// How a collection wraps its JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{status, message, data}` around every payload.
    Wrapped,
    /// Entities and arrays at the top level; mutations answer with plain text.
    Bare,
}
