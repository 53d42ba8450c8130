//! API Response wrapper

use chrono::Utc;
use granthika_shared::types::FlashMessage;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    /// Flash messages handed over by the redirect that led here.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<FlashMessage>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            messages: Vec::new(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<FlashMessage>) -> Self {
        self.messages = messages;
        self
    }
}
