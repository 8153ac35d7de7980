use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

/// A successful Service Layer response, passed back uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Decoded JSON body. `None` when the body was empty or not valid JSON.
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Decode the text of a 2xx response.
    ///
    /// Decoding is lenient: a body that is not JSON yields `body: None`
    /// rather than failing a call the Service Layer reported as successful.
    pub fn decode(status: StatusCode, text: &str) -> Self {
        if text.trim().is_empty() {
            return Self { status, body: None };
        }
        match serde_json::from_str(text) {
            Ok(body) => Self { status, body: Some(body) },
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "Ignoring unparseable success body");
                Self { status, body: None }
            }
        }
    }

    /// Read an integer property from the top-level body object.
    pub fn i64_field(&self, name: &str) -> Option<i64> {
        self.body.as_ref()?.get(name)?.as_i64()
    }
}
