use crate::Result;
use serde_json::Value;

/// Reserved prefix the chat model uses for canvas-edit commands.
pub const CANVAS_EDIT_PREFIX: &str = "__canvas_edit__:";

/// A canvas-edit command emitted by the chat model. The payload is
/// interpreted by the drawing client, so it is only checked for being JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasCommand {
    pub payload: Value,
}

impl CanvasCommand {
    /// Returns `None` for ordinary prose, otherwise the parsed command or the
    /// JSON error for a malformed payload.
    pub fn detect(reply: &str) -> Option<Result<Self>> {
        let payload = reply.trim().strip_prefix(CANVAS_EDIT_PREFIX)?;
        Some(
            serde_json::from_str(payload.trim())
                .map(|payload| Self { payload })
                .map_err(Into::into),
        )
    }

    /// The command's `action` field, when the payload carries one.
    pub fn action(&self) -> Option<&str> {
        self.payload.get("action").and_then(Value::as_str)
    }
}
