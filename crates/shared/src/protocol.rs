use serde::{Deserialize, Serialize};

/// Route the frontend fetches once per view mount.
pub const HELLO_PATH: &str = "/api/hello";

/// Liveness probe route; never called by the frontend.
pub const HEALTHZ_PATH: &str = "/healthz";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GreetingResponse {
    /// `None` when the backend omits the field; the frontend renders that as
    /// an empty display string, not as the fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
