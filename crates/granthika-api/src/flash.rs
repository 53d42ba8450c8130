//! Flash messages carried on the redirect query string.
//!
//! A redirect to `/accounts/settings?level=success&message=Saved.` repeats the
//! `level`/`message` pair once per message, in order.

use axum::response::Redirect;
use granthika_shared::types::{FlashMessage, MessageLevel};
use tracing::warn;

/// 303 redirect to `path` carrying `messages`.
pub fn redirect(path: &str, messages: &[FlashMessage]) -> Redirect {
    if messages.is_empty() {
        return Redirect::to(path);
    }

    let pairs: Vec<(&str, &str)> = messages
        .iter()
        .flat_map(|m| [("level", m.level.as_str()), ("message", m.message.as_str())])
        .collect();

    match serde_urlencoded::to_string(&pairs) {
        Ok(query) => Redirect::to(&format!("{}?{}", path, query)),
        Err(e) => {
            warn!("Dropping flash messages for {}: {}", path, e);
            Redirect::to(path)
        }
    }
}

pub fn redirect_one(path: &str, message: FlashMessage) -> Redirect {
    redirect(path, &[message])
}

/// Messages encoded by [`redirect`]. Unknown levels read as info and a
/// `message` without a preceding `level` is ignored.
pub fn messages_from_query(query: Option<&str>) -> Vec<FlashMessage> {
    let pairs: Vec<(String, String)> = match query {
        Some(query) => serde_urlencoded::from_str(query).unwrap_or_default(),
        None => return Vec::new(),
    };

    let mut messages = Vec::new();
    let mut level = None;
    for (key, value) in pairs {
        match key.as_str() {
            "level" => level = Some(parse_level(&value)),
            "message" => {
                if let Some(level) = level.take() {
                    messages.push(FlashMessage { level, message: value });
                }
            }
            _ => {}
        }
    }
    messages
}

fn parse_level(raw: &str) -> MessageLevel {
    match raw {
        "success" => MessageLevel::Success,
        "warning" => MessageLevel::Warning,
        "error" => MessageLevel::Error,
        _ => MessageLevel::Info,
    }
}
