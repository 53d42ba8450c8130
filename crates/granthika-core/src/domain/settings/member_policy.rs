//! Membership rules for library patrons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AggregateKind, SettingsAggregate, SettingsRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPolicy {
    pub id: Uuid,
    pub library_id: Uuid,
    pub student_borrow_limit: i32,
    pub teacher_borrow_limit: i32,
    pub staff_borrow_limit: i32,
    pub membership_validity_days: i32,
    pub member_id_format: String,
    pub allow_self_registration: bool,
    pub require_approval: bool,
    pub allow_id_card_download: bool,
    pub allow_profile_edit: bool,
    pub updated_at: DateTime<Utc>,
}

impl SettingsRecord for MemberPolicy {
    const KIND: AggregateKind = AggregateKind::MemberPolicy;

    fn with_defaults(library_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            student_borrow_limit: 2,
            teacher_borrow_limit: 5,
            staff_borrow_limit: 3,
            membership_validity_days: 365,
            member_id_format: "{CODE}-{SEQ}".to_string(),
            allow_self_registration: false,
            require_approval: true,
            allow_id_card_download: true,
            allow_profile_edit: true,
            updated_at: now,
        }
    }

    fn from_aggregate(aggregate: SettingsAggregate) -> Option<Self> {
        match aggregate {
            SettingsAggregate::MemberPolicy(members) => Some(members),
            _ => None,
        }
    }
}

impl From<MemberPolicy> for SettingsAggregate {
    fn from(members: MemberPolicy) -> Self {
        SettingsAggregate::MemberPolicy(members)
    }
}
