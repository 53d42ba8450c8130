use chrono::NaiveDate;
use granthika_core::domain::{AdminIdentity, Library, Subscription, SubscriptionPlan};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SubscriptionStatus {
    pub plan: SubscriptionPlan,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub is_expired: bool,
}

impl SubscriptionStatus {
    pub fn at(subscription: &Subscription, today: NaiveDate) -> Self {
        Self {
            plan: subscription.plan,
            start_date: subscription.start_date,
            expiry_date: subscription.expiry_date,
            days_remaining: subscription.days_remaining(today),
            is_expired: subscription.is_expired(today),
        }
    }
}

/// Landing page after sign-in.
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub username: String,
    pub display_name: String,
    pub library: Library,
    pub subscription: SubscriptionStatus,
}

impl DashboardView {
    pub fn new(identity: &AdminIdentity, library: Library, subscription: SubscriptionStatus) -> Self {
        Self {
            username: identity.username.clone(),
            display_name: identity.display_name(),
            library,
            subscription,
        }
    }
}
