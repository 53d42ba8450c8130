//! Read-only projections consumed by the settings page.

use rust_decimal::Decimal;
use serde::Serialize;

use super::library::Library;
use super::settings::{
    AppearancePolicy, LibrarySettings, MemberPolicy, NotificationPolicy, RulePolicy, SecurityPolicy,
    Subscription,
};

/// Library contact data plus the appearance colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemView {
    pub org_name: String,
    pub institute_name: String,
    pub org_email: String,
    pub org_phone: String,
    pub org_address: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub primary_color: String,
}

impl SystemView {
    pub fn project(library: &Library, appearance: &AppearancePolicy) -> Self {
        Self {
            org_name: library.library_name.clone(),
            institute_name: library.institute_name.clone(),
            org_email: library.institute_email.clone(),
            org_phone: library.phone_number.clone().unwrap_or_default(),
            org_address: library.address.clone(),
            district: library.district.clone(),
            state: library.state.clone(),
            country: library.country.clone(),
            primary_color: appearance.primary_color.clone(),
        }
    }
}

/// Loan and fine rules under the names the form uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanView {
    pub max_books_per_member: i32,
    pub loan_period_days: i32,
    pub renewal_limit: i32,
    pub grace_period_days: i32,
    pub fine_per_day: Decimal,
    /// Not modelled; always zero.
    pub max_fine: Decimal,
    /// Not modelled; always zero.
    pub waiver_percentage: Decimal,
    pub auto_fine: bool,
    pub allow_renewal: bool,
    pub allow_partial_payment: bool,
    pub auto_mark_lost: bool,
    pub allow_advance_booking: bool,
}

impl LoanView {
    pub fn project(rules: &RulePolicy) -> Self {
        Self {
            max_books_per_member: rules.max_books_per_member,
            loan_period_days: rules.borrowing_period_days,
            renewal_limit: rules.max_renewal_count,
            grace_period_days: rules.grace_period_days,
            fine_per_day: rules.late_fine,
            max_fine: Decimal::ZERO,
            waiver_percentage: Decimal::ZERO,
            auto_fine: rules.auto_fine,
            allow_renewal: rules.allow_renewal,
            allow_partial_payment: rules.allow_partial_payment,
            auto_mark_lost: rules.auto_mark_lost,
            allow_advance_booking: rules.allow_advance_booking,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationToggleView {
    /// Matches the form field name.
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub enabled: bool,
}

impl NotificationToggleView {
    pub fn project(notifications: &NotificationPolicy) -> Vec<Self> {
        vec![
            Self {
                key: "email_overdue_reminder",
                label: "Email Overdue Reminder",
                description: "Send email reminders when a loan becomes overdue.",
                enabled: notifications.email_overdue_reminder,
            },
            Self {
                key: "sms_reminder",
                label: "SMS Reminders",
                description: "Send SMS reminders for due and overdue books.",
                enabled: notifications.sms_reminder,
            },
            Self {
                key: "monthly_usage_report",
                label: "Monthly Usage Report",
                description: "Receive a monthly summary report via email.",
                enabled: notifications.monthly_usage_report,
            },
            Self {
                key: "weekly_database_backup",
                label: "Weekly Database Backup",
                description: "Get notified when weekly backup completes.",
                enabled: notifications.weekly_database_backup,
            },
            Self {
                key: "daily_activity_summary",
                label: "Daily Activity Summary",
                description: "Receive a daily digest of library activity.",
                enabled: notifications.daily_activity_summary,
            },
        ]
    }
}

/// Everything the settings page renders.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsPage {
    pub library: Library,
    pub rules: RulePolicy,
    pub member_cfg: MemberPolicy,
    pub security: SecurityPolicy,
    pub notifications: NotificationPolicy,
    pub appearance: AppearancePolicy,
    pub subscription: Subscription,
    pub system_settings: SystemView,
    pub loan_settings: LoanView,
    pub notification_settings: Vec<NotificationToggleView>,
    /// Session listing is not tracked yet.
    pub active_sessions: Vec<String>,
}

impl SettingsPage {
    pub fn project(library: Library, settings: LibrarySettings) -> Self {
        Self {
            system_settings: SystemView::project(&library, &settings.appearance),
            loan_settings: LoanView::project(&settings.rules),
            notification_settings: NotificationToggleView::project(&settings.notifications),
            library,
            rules: settings.rules,
            member_cfg: settings.members,
            security: settings.security,
            notifications: settings.notifications,
            appearance: settings.appearance,
            subscription: settings.subscription,
            active_sessions: Vec::new(),
        }
    }
}
