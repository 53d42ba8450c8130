// ============================================================================
// Granthika Core - Admin Identity Entity
// File: crates/granthika-core/src/domain/identity.rs
// ============================================================================
//! The administrator account that owns exactly one library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NAME_MAX: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl AdminIdentity {
    pub fn new(username: String, email: String, password_hash: String, full_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email: granthika_shared::utils::normalize_email(&email),
            password_hash,
            first_name: full_name.trim().to_string(),
            last_name: String::new(),
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn is_first_login(&self) -> bool {
        self.last_login.is_none()
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login = Some(now);
        self.modified_at = Some(now);
    }
}
