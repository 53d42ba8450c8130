// ============================================================================
// Granthika Infrastructure - PostgreSQL Settings Repository
// File: crates/granthika-infrastructure/src/database/postgres/settings_repo_impl.rs
// Description: One table per settings aggregate, each unique on library_id
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use granthika_core::domain::{
    AggregateKind, AppearancePolicy, MemberPolicy, NotificationPolicy, RulePolicy, SecurityPolicy,
    SettingsAggregate, Subscription, SubscriptionPlan,
};
use granthika_core::error::DomainError;
use granthika_core::repositories::SettingsRepository;

use crate::database::constraints::read_error;

/// What an insert does when the library already has a row of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnConflict {
    Ignore,
    Overwrite,
}

fn table_of(kind: AggregateKind) -> (&'static str, &'static [&'static str]) {
    match kind {
        AggregateKind::RulePolicy => (
            "library_rule_settings",
            &[
                "id", "library_id", "late_fine", "borrowing_period_days", "max_books_per_member",
                "max_renewal_count", "grace_period_days", "auto_fine", "allow_renewal",
                "allow_partial_payment", "auto_mark_lost", "allow_advance_booking", "updated_at",
            ],
        ),
        AggregateKind::MemberPolicy => (
            "member_settings",
            &[
                "id", "library_id", "student_borrow_limit", "teacher_borrow_limit",
                "staff_borrow_limit", "membership_validity_days", "member_id_format",
                "allow_self_registration", "require_approval", "allow_id_card_download",
                "allow_profile_edit", "updated_at",
            ],
        ),
        AggregateKind::SecurityPolicy => (
            "security_settings",
            &[
                "id", "library_id", "two_factor_auth", "lock_after_failed_attempts",
                "force_password_reset", "login_email_notification", "allow_multiple_device_login",
                "failed_login_attempts_limit", "updated_at",
            ],
        ),
        AggregateKind::NotificationPolicy => (
            "notification_settings",
            &[
                "id", "library_id", "email_overdue_reminder", "sms_reminder",
                "monthly_usage_report", "weekly_database_backup", "daily_activity_summary",
                "updated_at",
            ],
        ),
        AggregateKind::AppearancePolicy => (
            "appearance_settings",
            &[
                "id", "library_id", "dark_mode", "compact_view", "enable_animations",
                "show_welcome_message", "primary_color", "updated_at",
            ],
        ),
        AggregateKind::Subscription => (
            "subscriptions",
            &["id", "library_id", "plan", "start_date", "expiry_date", "is_active", "updated_at"],
        ),
    }
}

fn insert_sql(kind: AggregateKind, on_conflict: OnConflict) -> String {
    let (table, columns) = table_of(kind);
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    let action = match on_conflict {
        OnConflict::Ignore => "DO NOTHING".to_string(),
        OnConflict::Overwrite => {
            let assignments: Vec<String> = columns
                .iter()
                .filter(|c| !matches!(**c, "id" | "library_id"))
                .map(|c| format!("{c} = EXCLUDED.{c}"))
                .collect();
            format!("DO UPDATE SET {}", assignments.join(", "))
        }
    };
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT (library_id) {}",
        table,
        columns.join(", "),
        placeholders.join(", "),
        action
    )
}

fn select_sql(kind: AggregateKind) -> String {
    let (table, columns) = table_of(kind);
    format!("SELECT {} FROM {} WHERE library_id = $1", columns.join(", "), table)
}

/// Writes one aggregate through any executor (pool or open transaction).
pub(crate) async fn write_aggregate<'e, E>(
    executor: E,
    aggregate: &SettingsAggregate,
    on_conflict: OnConflict,
) -> Result<(), DomainError>
where
    E: PgExecutor<'e>,
{
    let sql = insert_sql(aggregate.kind(), on_conflict);
    let query = sqlx::query(&sql);
    let query = match aggregate {
        SettingsAggregate::RulePolicy(r) => query
            .bind(r.id)
            .bind(r.library_id)
            .bind(r.late_fine)
            .bind(r.borrowing_period_days)
            .bind(r.max_books_per_member)
            .bind(r.max_renewal_count)
            .bind(r.grace_period_days)
            .bind(r.auto_fine)
            .bind(r.allow_renewal)
            .bind(r.allow_partial_payment)
            .bind(r.auto_mark_lost)
            .bind(r.allow_advance_booking)
            .bind(r.updated_at),
        SettingsAggregate::MemberPolicy(m) => query
            .bind(m.id)
            .bind(m.library_id)
            .bind(m.student_borrow_limit)
            .bind(m.teacher_borrow_limit)
            .bind(m.staff_borrow_limit)
            .bind(m.membership_validity_days)
            .bind(&m.member_id_format)
            .bind(m.allow_self_registration)
            .bind(m.require_approval)
            .bind(m.allow_id_card_download)
            .bind(m.allow_profile_edit)
            .bind(m.updated_at),
        SettingsAggregate::SecurityPolicy(s) => query
            .bind(s.id)
            .bind(s.library_id)
            .bind(s.two_factor_auth)
            .bind(s.lock_after_failed_attempts)
            .bind(s.force_password_reset)
            .bind(s.login_email_notification)
            .bind(s.allow_multiple_device_login)
            .bind(s.failed_login_attempts_limit)
            .bind(s.updated_at),
        SettingsAggregate::NotificationPolicy(n) => query
            .bind(n.id)
            .bind(n.library_id)
            .bind(n.email_overdue_reminder)
            .bind(n.sms_reminder)
            .bind(n.monthly_usage_report)
            .bind(n.weekly_database_backup)
            .bind(n.daily_activity_summary)
            .bind(n.updated_at),
        SettingsAggregate::AppearancePolicy(a) => query
            .bind(a.id)
            .bind(a.library_id)
            .bind(a.dark_mode)
            .bind(a.compact_view)
            .bind(a.enable_animations)
            .bind(a.show_welcome_message)
            .bind(&a.primary_color)
            .bind(a.updated_at),
        SettingsAggregate::Subscription(s) => query
            .bind(s.id)
            .bind(s.library_id)
            .bind(s.plan.as_str())
            .bind(s.start_date)
            .bind(s.expiry_date)
            .bind(s.is_active)
            .bind(s.updated_at),
    };

    query
        .execute(executor)
        .await
        .map_err(|e| read_error(&format!("writing {}", aggregate.kind().as_str()), e))?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct RulePolicyRow {
    id: Uuid,
    library_id: Uuid,
    late_fine: Decimal,
    borrowing_period_days: i32,
    max_books_per_member: i32,
    max_renewal_count: i32,
    grace_period_days: i32,
    auto_fine: bool,
    allow_renewal: bool,
    allow_partial_payment: bool,
    auto_mark_lost: bool,
    allow_advance_booking: bool,
    updated_at: DateTime<Utc>,
}

impl From<RulePolicyRow> for RulePolicy {
    fn from(row: RulePolicyRow) -> Self {
        RulePolicy {
            id: row.id,
            library_id: row.library_id,
            late_fine: row.late_fine,
            borrowing_period_days: row.borrowing_period_days,
            max_books_per_member: row.max_books_per_member,
            max_renewal_count: row.max_renewal_count,
            grace_period_days: row.grace_period_days,
            auto_fine: row.auto_fine,
            allow_renewal: row.allow_renewal,
            allow_partial_payment: row.allow_partial_payment,
            auto_mark_lost: row.auto_mark_lost,
            allow_advance_booking: row.allow_advance_booking,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MemberPolicyRow {
    id: Uuid,
    library_id: Uuid,
    student_borrow_limit: i32,
    teacher_borrow_limit: i32,
    staff_borrow_limit: i32,
    membership_validity_days: i32,
    member_id_format: String,
    allow_self_registration: bool,
    require_approval: bool,
    allow_id_card_download: bool,
    allow_profile_edit: bool,
    updated_at: DateTime<Utc>,
}

impl From<MemberPolicyRow> for MemberPolicy {
    fn from(row: MemberPolicyRow) -> Self {
        MemberPolicy {
            id: row.id,
            library_id: row.library_id,
            student_borrow_limit: row.student_borrow_limit,
            teacher_borrow_limit: row.teacher_borrow_limit,
            staff_borrow_limit: row.staff_borrow_limit,
            membership_validity_days: row.membership_validity_days,
            member_id_format: row.member_id_format,
            allow_self_registration: row.allow_self_registration,
            require_approval: row.require_approval,
            allow_id_card_download: row.allow_id_card_download,
            allow_profile_edit: row.allow_profile_edit,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SecurityPolicyRow {
    id: Uuid,
    library_id: Uuid,
    two_factor_auth: bool,
    lock_after_failed_attempts: bool,
    force_password_reset: bool,
    login_email_notification: bool,
    allow_multiple_device_login: bool,
    failed_login_attempts_limit: i32,
    updated_at: DateTime<Utc>,
}

impl From<SecurityPolicyRow> for SecurityPolicy {
    fn from(row: SecurityPolicyRow) -> Self {
        SecurityPolicy {
            id: row.id,
            library_id: row.library_id,
            two_factor_auth: row.two_factor_auth,
            lock_after_failed_attempts: row.lock_after_failed_attempts,
            force_password_reset: row.force_password_reset,
            login_email_notification: row.login_email_notification,
            allow_multiple_device_login: row.allow_multiple_device_login,
            failed_login_attempts_limit: row.failed_login_attempts_limit,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct NotificationPolicyRow {
    id: Uuid,
    library_id: Uuid,
    email_overdue_reminder: bool,
    sms_reminder: bool,
    monthly_usage_report: bool,
    weekly_database_backup: bool,
    daily_activity_summary: bool,
    updated_at: DateTime<Utc>,
}

impl From<NotificationPolicyRow> for NotificationPolicy {
    fn from(row: NotificationPolicyRow) -> Self {
        NotificationPolicy {
            id: row.id,
            library_id: row.library_id,
            email_overdue_reminder: row.email_overdue_reminder,
            sms_reminder: row.sms_reminder,
            monthly_usage_report: row.monthly_usage_report,
            weekly_database_backup: row.weekly_database_backup,
            daily_activity_summary: row.daily_activity_summary,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AppearancePolicyRow {
    id: Uuid,
    library_id: Uuid,
    dark_mode: bool,
    compact_view: bool,
    enable_animations: bool,
    show_welcome_message: bool,
    primary_color: String,
    updated_at: DateTime<Utc>,
}

impl From<AppearancePolicyRow> for AppearancePolicy {
    fn from(row: AppearancePolicyRow) -> Self {
        AppearancePolicy {
            id: row.id,
            library_id: row.library_id,
            dark_mode: row.dark_mode,
            compact_view: row.compact_view,
            enable_animations: row.enable_animations,
            show_welcome_message: row.show_welcome_message,
            primary_color: row.primary_color,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: Uuid,
    library_id: Uuid,
    plan: String,
    start_date: NaiveDate,
    expiry_date: NaiveDate,
    is_active: bool,
    updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            library_id: row.library_id,
            plan: SubscriptionPlan::from_str(&row.plan).unwrap_or_default(),
            start_date: row.start_date,
            expiry_date: row.expiry_date,
            is_active: row.is_active,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch<R>(&self, kind: AggregateKind, library_id: &Uuid) -> Result<Option<R>, DomainError>
    where
        R: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = select_sql(kind);
        sqlx::query_as::<_, R>(&sql)
            .bind(library_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error(&format!("loading {}", kind.as_str()), e))
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn find(
        &self,
        library_id: &Uuid,
        kind: AggregateKind,
    ) -> Result<Option<SettingsAggregate>, DomainError> {
        let found = match kind {
            AggregateKind::RulePolicy => self
                .fetch::<RulePolicyRow>(kind, library_id)
                .await?
                .map(|row| RulePolicy::from(row).into()),
            AggregateKind::MemberPolicy => self
                .fetch::<MemberPolicyRow>(kind, library_id)
                .await?
                .map(|row| MemberPolicy::from(row).into()),
            AggregateKind::SecurityPolicy => self
                .fetch::<SecurityPolicyRow>(kind, library_id)
                .await?
                .map(|row| SecurityPolicy::from(row).into()),
            AggregateKind::NotificationPolicy => self
                .fetch::<NotificationPolicyRow>(kind, library_id)
                .await?
                .map(|row| NotificationPolicy::from(row).into()),
            AggregateKind::AppearancePolicy => self
                .fetch::<AppearancePolicyRow>(kind, library_id)
                .await?
                .map(|row| AppearancePolicy::from(row).into()),
            AggregateKind::Subscription => self
                .fetch::<SubscriptionRow>(kind, library_id)
                .await?
                .map(|row| Subscription::from(row).into()),
        };
        Ok(found)
    }

    async fn insert_if_absent(
        &self,
        aggregate: &SettingsAggregate,
    ) -> Result<SettingsAggregate, DomainError> {
        write_aggregate(&self.pool, aggregate, OnConflict::Ignore).await?;
        self.stored(aggregate).await
    }

    async fn save(&self, aggregate: &SettingsAggregate) -> Result<SettingsAggregate, DomainError> {
        write_aggregate(&self.pool, aggregate, OnConflict::Overwrite).await?;
        self.stored(aggregate).await
    }
}

impl PgSettingsRepository {
    async fn stored(&self, aggregate: &SettingsAggregate) -> Result<SettingsAggregate, DomainError> {
        let library_id = aggregate.library_id();
        self.find(&library_id, aggregate.kind()).await?.ok_or_else(|| {
            DomainError::DatabaseError(format!(
                "{} missing after write for library {}",
                aggregate.kind().as_str(),
                library_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_insert_sql() {
        let sql = insert_sql(AggregateKind::Subscription, OnConflict::Ignore);
        assert_eq!(
            sql,
            "INSERT INTO subscriptions (id, library_id, plan, start_date, expiry_date, is_active, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (library_id) DO NOTHING"
        );
    }

    #[test]
    fn test_overwrite_keeps_identity_columns() {
        let sql = insert_sql(AggregateKind::AppearancePolicy, OnConflict::Overwrite);
        assert!(sql.contains("primary_color = EXCLUDED.primary_color"));
        assert!(!sql.contains("id = EXCLUDED.id"));
        assert!(!sql.contains("library_id = EXCLUDED.library_id"));
    }

    #[test]
    fn test_every_kind_has_a_table() {
        for kind in AggregateKind::ALL {
            let (table, columns) = table_of(kind);
            assert!(!table.is_empty());
            assert_eq!(&columns[..2], &["id", "library_id"]);
            assert_eq!(columns.last(), Some(&"updated_at"));
        }
    }
}
