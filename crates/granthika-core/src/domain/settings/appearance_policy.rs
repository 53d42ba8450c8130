//! Dashboard look and feel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AggregateKind, SettingsAggregate, SettingsRecord};

pub const DEFAULT_PRIMARY_COLOR: &str = "#2563eb";
pub const PRIMARY_COLOR_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearancePolicy {
    pub id: Uuid,
    pub library_id: Uuid,
    pub dark_mode: bool,
    pub compact_view: bool,
    pub enable_animations: bool,
    pub show_welcome_message: bool,
    /// Stored as entered; the page treats it as a CSS colour.
    pub primary_color: String,
    pub updated_at: DateTime<Utc>,
}

impl SettingsRecord for AppearancePolicy {
    const KIND: AggregateKind = AggregateKind::AppearancePolicy;

    fn with_defaults(library_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            dark_mode: false,
            compact_view: false,
            enable_animations: true,
            show_welcome_message: true,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            updated_at: now,
        }
    }

    fn from_aggregate(aggregate: SettingsAggregate) -> Option<Self> {
        match aggregate {
            SettingsAggregate::AppearancePolicy(appearance) => Some(appearance),
            _ => None,
        }
    }
}

impl From<AppearancePolicy> for SettingsAggregate {
    fn from(appearance: AppearancePolicy) -> Self {
        SettingsAggregate::AppearancePolicy(appearance)
    }
}
