//! The six settings aggregates every library owns one of.
//!
//! Each aggregate is keyed by `library_id` (1:1, cascade on library delete)
//! and carries fixed defaults so it can be materialised on demand.

pub mod appearance_policy;
pub mod member_policy;
pub mod notification_policy;
pub mod rule_policy;
pub mod security_policy;
pub mod subscription;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use appearance_policy::AppearancePolicy;
pub use member_policy::MemberPolicy;
pub use notification_policy::NotificationPolicy;
pub use rule_policy::RulePolicy;
pub use security_policy::SecurityPolicy;
pub use subscription::{Subscription, SubscriptionPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    RulePolicy,
    MemberPolicy,
    SecurityPolicy,
    NotificationPolicy,
    AppearancePolicy,
    Subscription,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 6] = [
        AggregateKind::RulePolicy,
        AggregateKind::MemberPolicy,
        AggregateKind::SecurityPolicy,
        AggregateKind::NotificationPolicy,
        AggregateKind::AppearancePolicy,
        AggregateKind::Subscription,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::RulePolicy => "rule_policy",
            AggregateKind::MemberPolicy => "member_policy",
            AggregateKind::SecurityPolicy => "security_policy",
            AggregateKind::NotificationPolicy => "notification_policy",
            AggregateKind::AppearancePolicy => "appearance_policy",
            AggregateKind::Subscription => "subscription",
        }
    }
}

/// Any one of the six aggregates, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingsAggregate {
    RulePolicy(RulePolicy),
    MemberPolicy(MemberPolicy),
    SecurityPolicy(SecurityPolicy),
    NotificationPolicy(NotificationPolicy),
    AppearancePolicy(AppearancePolicy),
    Subscription(Subscription),
}

impl SettingsAggregate {
    /// Fresh aggregate of `kind` holding its declared defaults.
    pub fn defaults(kind: AggregateKind, library_id: Uuid, now: DateTime<Utc>) -> Self {
        match kind {
            AggregateKind::RulePolicy => RulePolicy::with_defaults(library_id, now).into(),
            AggregateKind::MemberPolicy => MemberPolicy::with_defaults(library_id, now).into(),
            AggregateKind::SecurityPolicy => SecurityPolicy::with_defaults(library_id, now).into(),
            AggregateKind::NotificationPolicy => NotificationPolicy::with_defaults(library_id, now).into(),
            AggregateKind::AppearancePolicy => AppearancePolicy::with_defaults(library_id, now).into(),
            AggregateKind::Subscription => Subscription::with_defaults(library_id, now).into(),
        }
    }

    pub fn kind(&self) -> AggregateKind {
        match self {
            SettingsAggregate::RulePolicy(_) => AggregateKind::RulePolicy,
            SettingsAggregate::MemberPolicy(_) => AggregateKind::MemberPolicy,
            SettingsAggregate::SecurityPolicy(_) => AggregateKind::SecurityPolicy,
            SettingsAggregate::NotificationPolicy(_) => AggregateKind::NotificationPolicy,
            SettingsAggregate::AppearancePolicy(_) => AggregateKind::AppearancePolicy,
            SettingsAggregate::Subscription(_) => AggregateKind::Subscription,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            SettingsAggregate::RulePolicy(a) => a.id,
            SettingsAggregate::MemberPolicy(a) => a.id,
            SettingsAggregate::SecurityPolicy(a) => a.id,
            SettingsAggregate::NotificationPolicy(a) => a.id,
            SettingsAggregate::AppearancePolicy(a) => a.id,
            SettingsAggregate::Subscription(a) => a.id,
        }
    }

    pub fn library_id(&self) -> Uuid {
        match self {
            SettingsAggregate::RulePolicy(a) => a.library_id,
            SettingsAggregate::MemberPolicy(a) => a.library_id,
            SettingsAggregate::SecurityPolicy(a) => a.library_id,
            SettingsAggregate::NotificationPolicy(a) => a.library_id,
            SettingsAggregate::AppearancePolicy(a) => a.library_id,
            SettingsAggregate::Subscription(a) => a.library_id,
        }
    }
}

/// Typed access to one aggregate kind through [`SettingsAggregate`].
pub trait SettingsRecord: Sized + Into<SettingsAggregate> {
    const KIND: AggregateKind;

    fn with_defaults(library_id: Uuid, now: DateTime<Utc>) -> Self;

    fn from_aggregate(aggregate: SettingsAggregate) -> Option<Self>;
}

/// All six aggregates of one library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarySettings {
    pub rules: RulePolicy,
    pub members: MemberPolicy,
    pub security: SecurityPolicy,
    pub notifications: NotificationPolicy,
    pub appearance: AppearancePolicy,
    pub subscription: Subscription,
}

impl LibrarySettings {
    pub fn defaults(library_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            rules: RulePolicy::with_defaults(library_id, now),
            members: MemberPolicy::with_defaults(library_id, now),
            security: SecurityPolicy::with_defaults(library_id, now),
            notifications: NotificationPolicy::with_defaults(library_id, now),
            appearance: AppearancePolicy::with_defaults(library_id, now),
            subscription: Subscription::with_defaults(library_id, now),
        }
    }

    pub fn into_aggregates(self) -> [SettingsAggregate; 6] {
        [
            self.rules.into(),
            self.members.into(),
            self.security.into(),
            self.notifications.into(),
            self.appearance.into(),
            self.subscription.into(),
        ]
    }
}
