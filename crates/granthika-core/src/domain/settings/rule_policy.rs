//! Loan and fine rules.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AggregateKind, SettingsAggregate, SettingsRecord};

pub const BORROWING_PERIOD_RANGE: RangeInclusive<i32> = 1..=365;
pub const MAX_BOOKS_RANGE: RangeInclusive<i32> = 1..=i32::MAX;
pub const NON_NEGATIVE_RANGE: RangeInclusive<i32> = 0..=i32::MAX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePolicy {
    pub id: Uuid,
    pub library_id: Uuid,
    /// Fine charged per overdue day.
    pub late_fine: Decimal,
    pub borrowing_period_days: i32,
    pub max_books_per_member: i32,
    pub max_renewal_count: i32,
    pub grace_period_days: i32,
    pub auto_fine: bool,
    pub allow_renewal: bool,
    pub allow_partial_payment: bool,
    pub auto_mark_lost: bool,
    pub allow_advance_booking: bool,
    pub updated_at: DateTime<Utc>,
}

impl RulePolicy {
    pub fn is_valid(&self) -> bool {
        self.late_fine >= Decimal::ZERO
            && BORROWING_PERIOD_RANGE.contains(&self.borrowing_period_days)
            && MAX_BOOKS_RANGE.contains(&self.max_books_per_member)
            && NON_NEGATIVE_RANGE.contains(&self.max_renewal_count)
            && NON_NEGATIVE_RANGE.contains(&self.grace_period_days)
    }
}

impl SettingsRecord for RulePolicy {
    const KIND: AggregateKind = AggregateKind::RulePolicy;

    fn with_defaults(library_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            late_fine: Decimal::new(500, 2),
            borrowing_period_days: 14,
            max_books_per_member: 3,
            max_renewal_count: 2,
            grace_period_days: 2,
            auto_fine: true,
            allow_renewal: true,
            allow_partial_payment: false,
            auto_mark_lost: false,
            allow_advance_booking: false,
            updated_at: now,
        }
    }

    fn from_aggregate(aggregate: SettingsAggregate) -> Option<Self> {
        match aggregate {
            SettingsAggregate::RulePolicy(rules) => Some(rules),
            _ => None,
        }
    }
}

impl From<RulePolicy> for SettingsAggregate {
    fn from(rules: RulePolicy) -> Self {
        SettingsAggregate::RulePolicy(rules)
    }
}
