//! Passive plan/expiry record. No billing happens here.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use granthika_shared::constants::DEFAULT_TRIAL_DAYS;

use super::{AggregateKind, SettingsAggregate, SettingsRecord};

/// Subscription plan enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Basic,
    Silver,
    Gold,
    Pro,
    Enterprise,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Basic => "basic",
            SubscriptionPlan::Silver => "silver",
            SubscriptionPlan::Gold => "gold",
            SubscriptionPlan::Pro => "pro",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(SubscriptionPlan::Basic),
            "silver" => Some(SubscriptionPlan::Silver),
            "gold" => Some(SubscriptionPlan::Gold),
            "pro" => Some(SubscriptionPlan::Pro),
            "enterprise" => Some(SubscriptionPlan::Enterprise),
            _ => None,
        }
    }
}

impl Default for SubscriptionPlan {
    fn default() -> Self {
        SubscriptionPlan::Basic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub library_id: Uuid,
    pub plan: SubscriptionPlan,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Without an explicit expiry the subscription runs for the trial period
    /// counted from `start_date`.
    pub fn new(
        library_id: Uuid,
        plan: SubscriptionPlan,
        start_date: NaiveDate,
        expiry_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            library_id,
            plan,
            start_date,
            expiry_date: expiry_date
                .unwrap_or_else(|| start_date + Duration::days(DEFAULT_TRIAL_DAYS)),
            is_active: true,
            updated_at: now,
        }
    }

    /// Expired once the expiry date lies strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    pub fn is_expired_now(&self) -> bool {
        self.is_expired(Utc::now().date_naive())
    }

    /// Whole days left, zero once expired.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days().max(0)
    }
}

impl SettingsRecord for Subscription {
    const KIND: AggregateKind = AggregateKind::Subscription;

    fn with_defaults(library_id: Uuid, now: DateTime<Utc>) -> Self {
        Subscription::new(library_id, SubscriptionPlan::default(), now.date_naive(), None, now)
    }

    fn from_aggregate(aggregate: SettingsAggregate) -> Option<Self> {
        match aggregate {
            SettingsAggregate::Subscription(subscription) => Some(subscription),
            _ => None,
        }
    }
}

impl From<Subscription> for SettingsAggregate {
    fn from(subscription: Subscription) -> Self {
        SettingsAggregate::Subscription(subscription)
    }
}
