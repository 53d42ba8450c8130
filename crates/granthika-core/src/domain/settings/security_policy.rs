//! Admin account security toggles.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AggregateKind, SettingsAggregate, SettingsRecord};

pub const FAILED_ATTEMPTS_RANGE: RangeInclusive<i32> = 1..=20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    pub id: Uuid,
    pub library_id: Uuid,
    pub two_factor_auth: bool,
    pub lock_after_failed_attempts: bool,
    pub force_password_reset: bool,
    pub login_email_notification: bool,
    pub allow_multiple_device_login: bool,
    pub failed_login_attempts_limit: i32,
    pub updated_at: DateTime<Utc>,
}

impl SettingsRecord for SecurityPolicy {
    const KIND: AggregateKind = AggregateKind::SecurityPolicy;

    fn with_defaults(library_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            two_factor_auth: false,
            lock_after_failed_attempts: true,
            force_password_reset: false,
            login_email_notification: false,
            allow_multiple_device_login: true,
            failed_login_attempts_limit: 5,
            updated_at: now,
        }
    }

    fn from_aggregate(aggregate: SettingsAggregate) -> Option<Self> {
        match aggregate {
            SettingsAggregate::SecurityPolicy(security) => Some(security),
            _ => None,
        }
    }
}

impl From<SecurityPolicy> for SettingsAggregate {
    fn from(security: SecurityPolicy) -> Self {
        SettingsAggregate::SecurityPolicy(security)
    }
}
