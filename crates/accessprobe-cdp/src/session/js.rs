//! JavaScript execution operations for CDP page session.

use serde_json::{json, Value};

use crate::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Evaluate a JavaScript expression and return its JSON value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            return Err(CdpError::JavaScript(Self::exception_message(exception)));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Best human-readable message from `exceptionDetails`.
    ///
    /// `text` is usually just "Uncaught"; the thrown object's description
    /// carries the actual message.
    pub(crate) fn exception_message(details: &Value) -> String {
        details["exception"]["description"]
            .as_str()
            .or_else(|| details["text"].as_str())
            .unwrap_or("Unknown error")
            .to_string()
    }
}
