//! Protocol error types

use thiserror::Error;

/// Errors raised while encoding or decoding WebSocket frames
///
/// None of these are fatal: the transport logs them and drops the frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Frame is not valid JSON (or not a JSON object)
    #[error("Malformed frame: {0}")]
    MalformedJson(String),

    /// Frame has no `event` name
    #[error("Frame has no event name")]
    MissingEvent,

    /// Event name is not one the dashboard understands
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Known event, but its payload does not have the expected shape
    #[error("Invalid payload for {event}: {reason}")]
    InvalidPayload { event: String, reason: String },

    /// Outbound command could not be serialized
    #[error("Failed to encode command: {0}")]
    Encode(String),
}

/// Result type alias for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::UnknownEvent("teleport".to_string());
        assert_eq!(err.to_string(), "Unknown event: teleport");

        let err = ProtocolError::InvalidPayload {
            event: "pointers".to_string(),
            reason: "expected a sequence".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid payload for pointers: expected a sequence"
        );
    }
}
