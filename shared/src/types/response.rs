//! API response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body returned by token endpoints: a message and a success flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable result message
    pub message: String,

    /// Whether the request was successful
    pub success: bool,
}

impl MessageResponse {
    /// Create a successful response
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

/// Health check body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: String::from("healthy"),
            service: service.into(),
            version: version.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_shape() {
        let json = serde_json::to_value(MessageResponse::success("Access token reissued")).unwrap();
        assert_eq!(json["message"], "Access token reissued");
        assert_eq!(json["success"], true);
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
