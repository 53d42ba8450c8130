//! Notification channel switches. No toggle depends on another.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AggregateKind, SettingsAggregate, SettingsRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPolicy {
    pub id: Uuid,
    pub library_id: Uuid,
    pub email_overdue_reminder: bool,
    pub sms_reminder: bool,
    pub monthly_usage_report: bool,
    pub weekly_database_backup: bool,
    pub daily_activity_summary: bool,
    pub updated_at: DateTime<Utc>,
}

impl SettingsRecord for NotificationPolicy {
    const KIND: AggregateKind = AggregateKind::NotificationPolicy;

    fn with_defaults(library_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            email_overdue_reminder: true,
            sms_reminder: false,
            monthly_usage_report: true,
            weekly_database_backup: false,
            daily_activity_summary: false,
            updated_at: now,
        }
    }

    fn from_aggregate(aggregate: SettingsAggregate) -> Option<Self> {
        match aggregate {
            SettingsAggregate::NotificationPolicy(notifications) => Some(notifications),
            _ => None,
        }
    }
}

impl From<NotificationPolicy> for SettingsAggregate {
    fn from(notifications: NotificationPolicy) -> Self {
        SettingsAggregate::NotificationPolicy(notifications)
    }
}
