// ============================================================================
// Granthika Core - Settings Service
// File: crates/granthika-core/src/services/settings_service.rs
// Description: Provisioning, get-or-create access and section updates for
//              the six per-library settings aggregates
// ============================================================================

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use granthika_shared::types::FlashMessage;
use granthika_shared::utils::normalize_email;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::identity::NAME_MAX;
use crate::domain::library::{NAME_LENGTHS, PHONE_MAX, REGION_MAX};
use crate::domain::settings::appearance_policy::PRIMARY_COLOR_MAX;
use crate::domain::settings::rule_policy::{BORROWING_PERIOD_RANGE, MAX_BOOKS_RANGE, NON_NEGATIVE_RANGE};
use crate::domain::settings::security_policy::FAILED_ATTEMPTS_RANGE;
use crate::domain::{
    AdminIdentity, AggregateKind, AppearancePolicy, Library, LibrarySettings, MemberPolicy,
    NotificationPolicy, RulePolicy, SectionForm, SecurityPolicy, SettingsAggregate, SettingsPage,
    SettingsRecord, SettingsSection, Subscription,
};
use crate::error::DomainError;
use crate::repositories::{LibraryRepository, SettingsRepository};
use crate::services::identity_service::IdentityService;

/// What a section submission did, as messages for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOutcome {
    /// `None` when the section name was not recognised.
    pub section: Option<SettingsSection>,
    pub messages: Vec<FlashMessage>,
}

impl SectionOutcome {
    fn new(section: Option<SettingsSection>) -> Self {
        Self {
            section,
            messages: Vec::new(),
        }
    }

    fn push(&mut self, message: FlashMessage) {
        self.messages.push(message);
    }

    fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == granthika_shared::types::MessageLevel::Error)
    }

    /// Records a failed write without aborting the rest of the section.
    fn fail(&mut self, group: &str, err: DomainError) {
        if err.kind() == crate::ErrorKind::Internal {
            error!("Settings write for {} failed: {}", group, err);
        } else {
            warn!("Settings write for {} rejected: {}", group, err);
        }
        self.push(FlashMessage::error(err.user_message()));
    }

    /// Submitted text for `key` when its length is within `lengths`,
    /// otherwise `current` and `message` as an error.
    fn text(
        &mut self,
        form: &SectionForm,
        key: &str,
        current: &str,
        lengths: &RangeInclusive<usize>,
        message: &str,
    ) -> String {
        form.text_within(key, current, lengths).unwrap_or_else(|| {
            self.push(FlashMessage::error(message));
            current.to_string()
        })
    }

    fn phone(&mut self, form: &SectionForm, current: Option<&str>) -> Option<String> {
        form.optional_text_within("phone_number", current, PHONE_MAX)
            .unwrap_or_else(|| {
                self.push(FlashMessage::error("Phone number too long."));
                current.map(str::to_string)
            })
    }
}

const REQUIRED: RangeInclusive<usize> = 1..=usize::MAX;
const IDENTITY_NAME_LENGTHS: RangeInclusive<usize> = 0..=NAME_MAX;
const REGION_LENGTHS: RangeInclusive<usize> = 0..=REGION_MAX;
const PRIMARY_COLOR_LENGTHS: RangeInclusive<usize> = 1..=PRIMARY_COLOR_MAX;

pub struct SettingsService {
    settings: Arc<dyn SettingsRepository>,
    libraries: Arc<dyn LibraryRepository>,
    identities: Arc<IdentityService>,
}

impl SettingsService {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        libraries: Arc<dyn LibraryRepository>,
        identities: Arc<IdentityService>,
    ) -> Self {
        Self {
            settings,
            libraries,
            identities,
        }
    }

    /// All six aggregates with their defaults, ready to persist with a new library.
    pub fn provision_defaults(library_id: Uuid, now: DateTime<Utc>) -> LibrarySettings {
        LibrarySettings::defaults(library_id, now)
    }

    /// Stored aggregate of `kind`, created with defaults when missing.
    pub async fn ensure(
        &self,
        library_id: &Uuid,
        kind: AggregateKind,
    ) -> Result<SettingsAggregate, DomainError> {
        if let Some(existing) = self.settings.find(library_id, kind).await? {
            return Ok(existing);
        }

        info!("Materialising default {} for library {}", kind.as_str(), library_id);
        let defaults = SettingsAggregate::defaults(kind, *library_id, Utc::now());
        self.settings.insert_if_absent(&defaults).await
    }

    pub async fn ensure_typed<T: SettingsRecord>(&self, library_id: &Uuid) -> Result<T, DomainError> {
        let aggregate = self.ensure(library_id, T::KIND).await?;
        let found = aggregate.kind();
        T::from_aggregate(aggregate).ok_or_else(|| {
            DomainError::InternalError(format!(
                "expected {} but store returned {}",
                T::KIND.as_str(),
                found.as_str()
            ))
        })
    }

    pub async fn ensure_all(&self, library_id: &Uuid) -> Result<LibrarySettings, DomainError> {
        Ok(LibrarySettings {
            rules: self.ensure_typed::<RulePolicy>(library_id).await?,
            members: self.ensure_typed::<MemberPolicy>(library_id).await?,
            security: self.ensure_typed::<SecurityPolicy>(library_id).await?,
            notifications: self.ensure_typed::<NotificationPolicy>(library_id).await?,
            appearance: self.ensure_typed::<AppearancePolicy>(library_id).await?,
            subscription: self.ensure_typed::<Subscription>(library_id).await?,
        })
    }

    pub async fn page(&self, library: Library) -> Result<SettingsPage, DomainError> {
        let settings = self.ensure_all(&library.id).await?;
        Ok(SettingsPage::project(library, settings))
    }

    /// Routes one settings form submission to its section.
    ///
    /// Only fails when the aggregates cannot be loaded. Rejected input and
    /// failed writes come back as messages, and a failure in one field group
    /// does not stop the others from being written.
    pub async fn apply_section(
        &self,
        identity: &AdminIdentity,
        library: &Library,
        section_name: &str,
        form: &SectionForm,
    ) -> Result<SectionOutcome, DomainError> {
        let section = match SettingsSection::parse(section_name) {
            Some(section) => section,
            None => {
                warn!("Unknown settings section '{}' for library {}", section_name, library.id);
                let mut outcome = SectionOutcome::new(None);
                outcome.push(FlashMessage::warning(format!(
                    "Unknown settings section: '{}'.",
                    section_name.trim()
                )));
                return Ok(outcome);
            }
        };

        let mut outcome = SectionOutcome::new(Some(section));
        match section {
            SettingsSection::Profile => self.apply_profile(identity, library, form, &mut outcome).await,
            SettingsSection::Security => self.apply_security(identity, library, form, &mut outcome).await?,
            SettingsSection::System => self.apply_system(library, form, &mut outcome).await?,
            SettingsSection::Notifications => self.apply_notifications(library, form, &mut outcome).await?,
            SettingsSection::Fine => self.apply_fine(library, form, &mut outcome).await?,
        }

        info!(
            "Settings section {} applied for library {} ({} messages)",
            section.as_str(),
            library.id,
            outcome.messages.len()
        );
        Ok(outcome)
    }

    async fn apply_profile(
        &self,
        identity: &AdminIdentity,
        library: &Library,
        form: &SectionForm,
        outcome: &mut SectionOutcome,
    ) {
        let mut admin = identity.clone();
        admin.first_name = outcome.text(form, "first_name", &identity.first_name, &IDENTITY_NAME_LENGTHS, "First name too long.");
        admin.last_name = outcome.text(form, "last_name", &identity.last_name, &IDENTITY_NAME_LENGTHS, "Last name too long.");
        let email = normalize_email(&form.text_or("email", &identity.email));

        if email.validate_email() {
            admin.email = email;
        } else {
            outcome.push(FlashMessage::error("Enter a valid email address."));
        }
        admin.modified_at = Some(Utc::now());
        if let Err(e) = self.identities.update(&admin).await {
            outcome.fail("identity", e);
        }

        let mut updated = library.clone();
        updated.library_name = outcome.text(
            form,
            "library_name",
            &library.library_name,
            &NAME_LENGTHS,
            "Library name must be between 2 and 255 characters.",
        );
        updated.institute_name = outcome.text(
            form,
            "institute_name",
            &library.institute_name,
            &NAME_LENGTHS,
            "Institute name must be between 2 and 255 characters.",
        );
        updated.phone_number = outcome.phone(form, library.phone_number.as_deref());
        updated.address = outcome.text(form, "address", &library.address, &REQUIRED, "Address is required.");
        updated.library_logo = form.optional_text_or("library_logo", library.library_logo.as_deref());
        updated.touch();
        if let Err(e) = self.libraries.update(&updated).await {
            outcome.fail("library profile", e);
        }

        if !outcome.has_errors() {
            outcome.push(FlashMessage::success("Profile updated successfully."));
        }
    }

    async fn apply_security(
        &self,
        identity: &AdminIdentity,
        library: &Library,
        form: &SectionForm,
        outcome: &mut SectionOutcome,
    ) -> Result<(), DomainError> {
        let current = form.get("current_password").unwrap_or("");
        let new = form.get("new_password").unwrap_or("");
        let confirm = form.get("confirm_password").unwrap_or("");
        let filled = [current, new, confirm].iter().filter(|v| !v.is_empty()).count();

        if filled == 3 {
            if !IdentityService::check_secret(identity, current) {
                warn!("Password change rejected for identity {}: wrong current password", identity.id);
                outcome.push(FlashMessage::error("Current password is incorrect."));
            } else if new != confirm {
                outcome.push(FlashMessage::error("New passwords do not match."));
            } else {
                match self.identities.set_secret(identity, new).await {
                    Ok(_) => outcome.push(FlashMessage::success("Password updated successfully.")),
                    Err(e) => outcome.fail("password", e),
                }
            }
        } else if filled > 0 {
            outcome.push(FlashMessage::warning("Please fill in all password fields."));
        }
        // All three empty is a toggles-only submission: no password step and no warning.

        let mut security: SecurityPolicy = self.ensure_typed(&library.id).await?;
        security.two_factor_auth = form.toggle("two_factor_auth");
        security.lock_after_failed_attempts = form.toggle("lock_after_failed_attempts");
        security.force_password_reset = form.toggle("force_password_reset");
        security.login_email_notification = form.toggle("login_email_notification");
        security.allow_multiple_device_login = form.toggle("allow_multiple_device_login");
        security.failed_login_attempts_limit = form.int_or(
            "failed_login_attempts_limit",
            security.failed_login_attempts_limit,
            &FAILED_ATTEMPTS_RANGE,
        );
        security.updated_at = Utc::now();

        match self.settings.save(&security.into()).await {
            Ok(_) if filled == 0 => outcome.push(FlashMessage::success("Security settings updated successfully.")),
            Ok(_) => {}
            Err(e) => outcome.fail("security policy", e),
        }
        Ok(())
    }

    async fn apply_system(
        &self,
        library: &Library,
        form: &SectionForm,
        outcome: &mut SectionOutcome,
    ) -> Result<(), DomainError> {
        let mut updated = library.clone();
        let email = normalize_email(&form.text_or("institute_email", &library.institute_email));
        if email.validate_email() {
            updated.institute_email = email;
        } else {
            outcome.push(FlashMessage::error("Enter a valid institute email."));
        }
        updated.phone_number = outcome.phone(form, library.phone_number.as_deref());
        updated.address = outcome.text(form, "address", &library.address, &REQUIRED, "Address is required.");
        updated.district = outcome.text(form, "district", &library.district, &REGION_LENGTHS, "District too long.");
        updated.state = outcome.text(form, "state", &library.state, &REGION_LENGTHS, "State too long.");
        updated.country = outcome.text(form, "country", &library.country, &REGION_LENGTHS, "Country too long.");
        updated.touch();
        if let Err(e) = self.libraries.update(&updated).await {
            outcome.fail("library contact", e);
        }

        let mut appearance: AppearancePolicy = self.ensure_typed(&library.id).await?;
        appearance.primary_color = outcome.text(
            form,
            "primary_color",
            &appearance.primary_color,
            &PRIMARY_COLOR_LENGTHS,
            "Primary colour must be 1 to 20 characters.",
        );
        appearance.updated_at = Utc::now();
        if let Err(e) = self.settings.save(&appearance.into()).await {
            outcome.fail("appearance", e);
        }

        if !outcome.has_errors() {
            outcome.push(FlashMessage::success("System settings updated successfully."));
        }
        Ok(())
    }

    async fn apply_notifications(
        &self,
        library: &Library,
        form: &SectionForm,
        outcome: &mut SectionOutcome,
    ) -> Result<(), DomainError> {
        let mut notifications: NotificationPolicy = self.ensure_typed(&library.id).await?;
        notifications.email_overdue_reminder = form.toggle("email_overdue_reminder");
        notifications.sms_reminder = form.toggle("sms_reminder");
        notifications.monthly_usage_report = form.toggle("monthly_usage_report");
        notifications.weekly_database_backup = form.toggle("weekly_database_backup");
        notifications.daily_activity_summary = form.toggle("daily_activity_summary");
        notifications.updated_at = Utc::now();

        match self.settings.save(&notifications.into()).await {
            Ok(_) => outcome.push(FlashMessage::success("Notification preferences saved.")),
            Err(e) => outcome.fail("notifications", e),
        }
        Ok(())
    }

    async fn apply_fine(
        &self,
        library: &Library,
        form: &SectionForm,
        outcome: &mut SectionOutcome,
    ) -> Result<(), DomainError> {
        let mut rules: RulePolicy = self.ensure_typed(&library.id).await?;
        rules.max_books_per_member = form.int_or("max_books_per_member", rules.max_books_per_member, &MAX_BOOKS_RANGE);
        rules.borrowing_period_days = form.int_or("loan_period_days", rules.borrowing_period_days, &BORROWING_PERIOD_RANGE);
        rules.max_renewal_count = form.int_or("renewal_limit", rules.max_renewal_count, &NON_NEGATIVE_RANGE);
        rules.grace_period_days = form.int_or("grace_period_days", rules.grace_period_days, &NON_NEGATIVE_RANGE);
        rules.late_fine = form.amount_or("fine_per_day", rules.late_fine);
        rules.auto_fine = form.toggle("auto_fine");
        rules.allow_renewal = form.toggle("allow_renewal");
        rules.allow_partial_payment = form.toggle("allow_partial_payment");
        rules.auto_mark_lost = form.toggle("auto_mark_lost");
        rules.allow_advance_booking = form.toggle("allow_advance_booking");
        rules.updated_at = Utc::now();

        match self.settings.save(&rules.into()).await {
            Ok(_) => outcome.push(FlashMessage::success("Loan & fine settings saved.")),
            Err(e) => outcome.fail("loan rules", e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InstituteType, LibraryProfile};
    use crate::repositories::{MockIdentityRepository, MockLibraryRepository, MockSettingsRepository};
    use granthika_shared::types::MessageLevel;
    use rust_decimal::Decimal;

    fn library() -> Library {
        Library::new(
            Uuid::new_v4(),
            "DG-T3ST".into(),
            LibraryProfile {
                library_name: "River Library".into(),
                institute_name: "River College".into(),
                institute_type: InstituteType::Private,
                institute_email: "river@college.in".into(),
                phone_number: None,
                address: "Bank Street".into(),
                district: "Cooch Behar".into(),
                state: "West Bengal".into(),
                country: "India".into(),
            },
        )
        .unwrap()
    }

    fn identity() -> AdminIdentity {
        AdminIdentity::new(
            "DG555555".into(),
            "river@college.in".into(),
            granthika_security::PasswordService::hash("password123").unwrap(),
            "Kiran Das".into(),
        )
    }

    fn service(settings: MockSettingsRepository) -> SettingsService {
        SettingsService::new(
            Arc::new(settings),
            Arc::new(MockLibraryRepository::new()),
            Arc::new(IdentityService::new(Arc::new(MockIdentityRepository::new()))),
        )
    }

    fn form(pairs: &[(&str, &str)]) -> SectionForm {
        pairs.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_ensure_creates_missing_aggregate() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_find().returning(|_, _| Ok(None));
        repo.expect_insert_if_absent()
            .times(1)
            .returning(|aggregate| Ok(aggregate.clone()));

        let library_id = Uuid::new_v4();
        let rules: RulePolicy = service(repo).ensure_typed(&library_id).await.unwrap();
        assert_eq!(rules.library_id, library_id);
        assert_eq!(rules.borrowing_period_days, 14);
    }

    #[tokio::test]
    async fn test_ensure_returns_stored_aggregate_without_insert() {
        let library_id = Uuid::new_v4();
        let mut stored = NotificationPolicy::with_defaults(library_id, Utc::now());
        stored.sms_reminder = true;
        let aggregate: SettingsAggregate = stored.clone().into();

        let mut repo = MockSettingsRepository::new();
        repo.expect_find().returning(move |_, _| Ok(Some(aggregate.clone())));
        repo.expect_insert_if_absent().never();

        let found: NotificationPolicy = service(repo).ensure_typed(&library_id).await.unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_unknown_section_writes_nothing() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_find().never();
        repo.expect_save().never();

        let outcome = service(repo)
            .apply_section(&identity(), &library(), "billing", &form(&[]))
            .await
            .unwrap();
        assert_eq!(outcome.section, None);
        assert_eq!(
            outcome.messages,
            vec![FlashMessage::warning("Unknown settings section: 'billing'.")]
        );
    }

    #[tokio::test]
    async fn test_fine_section_falls_back_on_bad_numbers() {
        let library = library();
        let stored: SettingsAggregate = RulePolicy::with_defaults(library.id, Utc::now()).into();

        let mut repo = MockSettingsRepository::new();
        repo.expect_find().returning(move |_, _| Ok(Some(stored.clone())));
        repo.expect_save()
            .times(1)
            .withf(|aggregate| match aggregate {
                SettingsAggregate::RulePolicy(rules) => {
                    rules.max_books_per_member == 3
                        && rules.borrowing_period_days == 21
                        && rules.max_renewal_count == 2
                        && rules.late_fine == Decimal::new(250, 2)
                        && rules.auto_fine
                        && !rules.allow_renewal
                }
                _ => false,
            })
            .returning(|aggregate| Ok(aggregate.clone()));

        let outcome = service(repo)
            .apply_section(
                &identity(),
                &library,
                "fine",
                &form(&[
                    ("max_books_per_member", "abc"),
                    ("loan_period_days", "21"),
                    ("renewal_limit", "-4"),
                    ("fine_per_day", "2.50"),
                    ("auto_fine", "on"),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(outcome.messages, vec![FlashMessage::success("Loan & fine settings saved.")]);
    }

    #[tokio::test]
    async fn test_security_wrong_password_still_saves_toggles() {
        let library = library();
        let stored: SettingsAggregate = SecurityPolicy::with_defaults(library.id, Utc::now()).into();

        let mut repo = MockSettingsRepository::new();
        repo.expect_find().returning(move |_, _| Ok(Some(stored.clone())));
        repo.expect_save()
            .times(1)
            .withf(|aggregate| match aggregate {
                SettingsAggregate::SecurityPolicy(security) => {
                    security.two_factor_auth
                        && !security.lock_after_failed_attempts
                        && security.failed_login_attempts_limit == 7
                }
                _ => false,
            })
            .returning(|aggregate| Ok(aggregate.clone()));

        let outcome = service(repo)
            .apply_section(
                &identity(),
                &library,
                "security",
                &form(&[
                    ("current_password", "not-the-password"),
                    ("new_password", "brand-new-pass"),
                    ("confirm_password", "brand-new-pass"),
                    ("two_factor_auth", "on"),
                    ("failed_login_attempts_limit", "7"),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(outcome.messages, vec![FlashMessage::error("Current password is incorrect.")]);
    }

    #[tokio::test]
    async fn test_security_partial_password_fields_warn() {
        let library = library();
        let stored: SettingsAggregate = SecurityPolicy::with_defaults(library.id, Utc::now()).into();

        let mut repo = MockSettingsRepository::new();
        repo.expect_find().returning(move |_, _| Ok(Some(stored.clone())));
        repo.expect_save().returning(|aggregate| Ok(aggregate.clone()));

        let outcome = service(repo)
            .apply_section(
                &identity(),
                &library,
                "security",
                &form(&[("new_password", "brand-new-pass"), ("failed_login_attempts_limit", "99")]),
            )
            .await
            .unwrap();
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].level, MessageLevel::Warning);
        assert_eq!(outcome.messages[0].message, "Please fill in all password fields.");
    }

    #[tokio::test]
    async fn test_notifications_absent_means_off() {
        let library = library();
        let stored: SettingsAggregate = NotificationPolicy::with_defaults(library.id, Utc::now()).into();

        let mut repo = MockSettingsRepository::new();
        repo.expect_find().returning(move |_, _| Ok(Some(stored.clone())));
        repo.expect_save()
            .withf(|aggregate| match aggregate {
                SettingsAggregate::NotificationPolicy(n) => {
                    !n.email_overdue_reminder && n.sms_reminder && !n.monthly_usage_report
                }
                _ => false,
            })
            .returning(|aggregate| Ok(aggregate.clone()));

        let outcome = service(repo)
            .apply_section(&identity(), &library, "notifications", &form(&[("sms_reminder", "on")]))
            .await
            .unwrap();
        assert_eq!(outcome.section, Some(SettingsSection::Notifications));
    }
}
