//! End-to-end account flows over the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use regex::Regex;

use granthika_core::domain::{
    AggregateKind, AppearancePolicy, InstituteType, LibraryProfile, NotificationPolicy, RulePolicy,
    SectionForm, SecurityPolicy, Subscription,
};
use granthika_core::error::DomainError;
use granthika_core::repositories::{IdentityRepository, LibraryRepository};
use granthika_core::services::{
    AuthService, IdentityService, Registration, RegistrationRequest, RegistrationService,
    SettingsService,
};
use granthika_infrastructure::MemoryStore;
use granthika_security::JwtService;
use granthika_shared::config::RegistrationSettings;
use granthika_shared::types::MessageLevel;

const PASSWORD: &str = "library-admin-1";

struct Harness {
    store: Arc<MemoryStore>,
    registration: RegistrationService,
    settings: SettingsService,
    auth: AuthService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let identities = Arc::new(IdentityService::new(store.clone()));
    Harness {
        registration: RegistrationService::new(
            identities.clone(),
            store.clone(),
            store.clone(),
            RegistrationSettings::default(),
        ),
        settings: SettingsService::new(store.clone(), store.clone(), identities.clone()),
        auth: AuthService::new(
            identities,
            store.clone(),
            Arc::new(JwtService::new("integration-secret".into(), 3600, 604_800)),
            10,
        ),
        store,
    }
}

fn request(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        profile: LibraryProfile {
            library_name: CompanyName().fake(),
            institute_name: CompanyName().fake(),
            institute_type: InstituteType::Private,
            institute_email: email.to_string(),
            phone_number: None,
            address: "College Road".into(),
            district: "Alipurduar".into(),
            state: "West Bengal".into(),
            country: "India".into(),
        },
        admin_full_name: Name().fake(),
        admin_password: PASSWORD.into(),
        admin_confirm_password: PASSWORD.into(),
    }
}

async fn register(h: &Harness, email: &str) -> Registration {
    h.registration.register(request(email)).await.unwrap()
}

fn form(pairs: &[(&str, &str)]) -> SectionForm {
    pairs.iter().copied().collect()
}

#[tokio::test]
async fn test_codes_match_format_and_are_distinct() {
    let h = harness();
    let pattern = Regex::new(r"^[A-Z]{2}-[A-Z0-9]{4}$").unwrap();
    let username_pattern = Regex::new(r"^DG[0-9]{6}$").unwrap();

    let mut codes = HashSet::new();
    for i in 0..25 {
        let email = format!("{}.{}", i, SafeEmail().fake::<String>());
        let registration = register(&h, &email).await;
        assert!(pattern.is_match(&registration.library.library_code));
        assert!(username_pattern.is_match(&registration.identity.username));
        codes.insert(registration.library.library_code);
    }
    assert_eq!(codes.len(), 25);
}

#[tokio::test]
async fn test_registration_provisions_all_aggregates() {
    let h = harness();
    let registration = register(&h, "office@riverside.in").await;

    assert_eq!(h.store.aggregate_count(&registration.library.id).await, 6);
    let subscription: Subscription = h
        .settings
        .ensure_typed(&registration.library.id)
        .await
        .unwrap();
    assert_eq!(
        subscription.expiry_date,
        subscription.start_date + chrono::Duration::days(30)
    );
    assert!(!subscription.is_expired(Utc::now().date_naive()));
}

#[tokio::test]
async fn test_duplicate_email_leaves_no_partial_writes() {
    let h = harness();
    register(&h, "shared@college.in").await;

    let err = h
        .registration
        .register(request("SHARED@college.in"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::EmailAlreadyExists("shared@college.in".into()));
    assert_eq!(err.user_message(), "Email already exists.");
    assert_eq!(h.store.identity_count().await, 1);
    assert_eq!(h.store.library_count().await, 1);
}

#[tokio::test]
async fn test_ensure_is_idempotent_for_missing_aggregate() {
    let h = harness();
    let library = register(&h, "idem@potent.in").await.library;
    assert!(h.store.remove_aggregate(&library.id, AggregateKind::SecurityPolicy).await);

    let first: SecurityPolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    let second: SecurityPolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.failed_login_attempts_limit, 5);
    assert_eq!(h.store.aggregate_count(&library.id).await, 6);

    let all = h.settings.ensure_all(&library.id).await.unwrap();
    assert_eq!(all.security.id, first.id);
}

#[tokio::test]
async fn test_fine_section_keeps_previous_values_on_bad_input() {
    let h = harness();
    let Registration { identity, library } = register(&h, "fines@library.in").await;

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "fine",
            &form(&[
                ("max_books_per_member", "0"),
                ("loan_period_days", "400"),
                ("renewal_limit", "5"),
                ("grace_period_days", "x"),
                ("fine_per_day", "-1"),
                ("allow_partial_payment", "on"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(outcome.messages[0].level, MessageLevel::Success);

    let rules: RulePolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert_eq!(rules.max_books_per_member, 3);
    assert_eq!(rules.borrowing_period_days, 14);
    assert_eq!(rules.max_renewal_count, 5);
    assert_eq!(rules.grace_period_days, 2);
    assert_eq!(rules.late_fine, rust_decimal::Decimal::new(500, 2));
    assert!(rules.allow_partial_payment);
    assert!(!rules.auto_fine);
    assert!(rules.is_valid());
}

#[tokio::test]
async fn test_security_wrong_password_keeps_hash_and_saves_toggles() {
    let h = harness();
    let Registration { identity, library } = register(&h, "secure@library.in").await;

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "security",
            &form(&[
                ("current_password", "wrong-password"),
                ("new_password", "another-pass-1"),
                ("confirm_password", "another-pass-1"),
                ("login_email_notification", "on"),
                ("allow_multiple_device_login", "on"),
                ("failed_login_attempts_limit", "12"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(outcome.messages[0].message, "Current password is incorrect.");

    let stored = IdentityRepository::find_by_id(h.store.as_ref(), &identity.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.password_hash, identity.password_hash);

    let security: SecurityPolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert!(security.login_email_notification);
    assert!(!security.lock_after_failed_attempts);
    assert_eq!(security.failed_login_attempts_limit, 12);
}

#[tokio::test]
async fn test_security_mismatched_new_passwords_keep_hash_and_save_toggles() {
    let h = harness();
    let Registration { identity, library } = register(&h, "mismatch@library.in").await;

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "security",
            &form(&[
                ("current_password", PASSWORD),
                ("new_password", "another-pass-1"),
                ("confirm_password", "another-pass-2"),
                ("two_factor_auth", "on"),
                ("failed_login_attempts_limit", "4"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(outcome.messages[0].level, MessageLevel::Error);
    assert_eq!(outcome.messages[0].message, "New passwords do not match.");

    let stored = IdentityRepository::find_by_id(h.store.as_ref(), &identity.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.password_hash, identity.password_hash);
    assert!(h.auth.sign_in(&identity.username, PASSWORD, false).await.is_ok());

    let security: SecurityPolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert!(security.two_factor_auth);
    assert!(!security.lock_after_failed_attempts);
    assert_eq!(security.failed_login_attempts_limit, 4);
}

#[tokio::test]
async fn test_security_toggles_only_skips_password_step() {
    let h = harness();
    let Registration { identity, library } = register(&h, "toggles@library.in").await;

    let outcome = h
        .settings
        .apply_section(&identity, &library, "security", &form(&[("force_password_reset", "on")]))
        .await
        .unwrap();
    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(outcome.messages[0].level, MessageLevel::Success);
    assert_eq!(outcome.messages[0].message, "Security settings updated successfully.");

    let security: SecurityPolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert!(security.force_password_reset);
}

#[tokio::test]
async fn test_security_password_change_then_sign_in() {
    let h = harness();
    let Registration { identity, library } = register(&h, "change@library.in").await;

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "security",
            &form(&[
                ("current_password", PASSWORD),
                ("new_password", "short"),
                ("confirm_password", "short"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(outcome.messages[0].message, "Password must be at least 8 characters.");

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "security",
            &form(&[
                ("current_password", PASSWORD),
                ("new_password", "changed-pass-9"),
                ("confirm_password", "changed-pass-9"),
            ]),
        )
        .await
        .unwrap();
    assert_eq!(outcome.messages[0].message, "Password updated successfully.");

    assert!(h.auth.sign_in(&identity.username, "changed-pass-9", false).await.is_ok());
    assert_eq!(
        h.auth.sign_in(&identity.username, PASSWORD, false).await.unwrap_err(),
        DomainError::InvalidCredentials
    );
}

#[tokio::test]
async fn test_system_section_round_trips_colour_and_contact() {
    let h = harness();
    let Registration { identity, library } = register(&h, "system@library.in").await;

    h.settings
        .apply_section(
            &identity,
            &library,
            "system",
            &form(&[
                ("primary_color", " #10b981 "),
                ("district", "Jalpaiguri"),
                ("phone_number", "03561 222 333"),
            ]),
        )
        .await
        .unwrap();

    let library = LibraryRepository::find_by_id(h.store.as_ref(), &library.id)
        .await
        .unwrap()
        .unwrap();
    let page = h.settings.page(library).await.unwrap();
    assert_eq!(page.system_settings.primary_color, "#10b981");
    assert_eq!(page.appearance.primary_color, "#10b981");
    assert_eq!(page.system_settings.district, "Jalpaiguri");
    assert_eq!(page.system_settings.org_phone, "03561 222 333");
    assert_eq!(page.system_settings.org_email, "system@library.in");
}

#[tokio::test]
async fn test_system_section_keeps_oversized_fields() {
    let h = harness();
    let Registration { identity, library } = register(&h, "bounds@library.in").await;
    let long_district = "d".repeat(101);
    let long_phone = "9".repeat(21);
    let long_colour = "#".repeat(21);

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "system",
            &form(&[
                ("district", long_district.as_str()),
                ("phone_number", long_phone.as_str()),
                ("primary_color", long_colour.as_str()),
                ("state", "Sikkim"),
            ]),
        )
        .await
        .unwrap();
    let messages: Vec<&str> = outcome.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Phone number too long.",
            "District too long.",
            "Primary colour must be 1 to 20 characters.",
        ]
    );
    assert!(outcome.messages.iter().all(|m| m.level == MessageLevel::Error));

    let stored = LibraryRepository::find_by_id(h.store.as_ref(), &library.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.district, "Alipurduar");
    assert_eq!(stored.phone_number, None);
    assert_eq!(stored.state, "Sikkim");

    let appearance: AppearancePolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert_eq!(appearance.primary_color, "#2563eb");
}

#[tokio::test]
async fn test_profile_section_keeps_out_of_bounds_names() {
    let h = harness();
    let Registration { identity, library } = register(&h, "names@library.in").await;
    let long_first_name = "f".repeat(151);

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "profile",
            &form(&[
                ("first_name", long_first_name.as_str()),
                ("last_name", "Barman"),
                ("library_name", "X"),
                ("institute_name", "Tea Garden College"),
                ("address", "  "),
            ]),
        )
        .await
        .unwrap();
    let messages: Vec<&str> = outcome.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "First name too long.",
            "Library name must be between 2 and 255 characters.",
            "Address is required.",
        ]
    );

    let admin = IdentityRepository::find_by_id(h.store.as_ref(), &identity.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.first_name, identity.first_name);
    assert_eq!(admin.last_name, "Barman");

    let stored = LibraryRepository::find_by_id(h.store.as_ref(), &library.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.library_name, library.library_name);
    assert_eq!(stored.institute_name, "Tea Garden College");
    assert_eq!(stored.address, "College Road");
}

#[tokio::test]
async fn test_profile_email_collision_reported_library_still_saved() {
    let h = harness();
    register(&h, "taken@library.in").await;
    let Registration { identity, library } = register(&h, "mine@library.in").await;

    let outcome = h
        .settings
        .apply_section(
            &identity,
            &library,
            "profile",
            &form(&[("email", "taken@library.in"), ("library_name", "Renamed Library")]),
        )
        .await
        .unwrap();
    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(outcome.messages[0].message, "Email already exists.");

    let library = LibraryRepository::find_by_id(h.store.as_ref(), &library.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(library.library_name, "Renamed Library");
}

#[tokio::test]
async fn test_notifications_absent_toggles_are_off() {
    let h = harness();
    let Registration { identity, library } = register(&h, "notify@library.in").await;

    h.settings
        .apply_section(&identity, &library, "notifications", &form(&[("weekly_database_backup", "on")]))
        .await
        .unwrap();

    let notifications: NotificationPolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert!(!notifications.email_overdue_reminder);
    assert!(!notifications.monthly_usage_report);
    assert!(notifications.weekly_database_backup);
}

#[tokio::test]
async fn test_unknown_section_changes_nothing() {
    let h = harness();
    let Registration { identity, library } = register(&h, "unknown@library.in").await;
    let before = h.settings.ensure_all(&library.id).await.unwrap();

    let outcome = h
        .settings
        .apply_section(&identity, &library, "appearance", &form(&[("dark_mode", "on")]))
        .await
        .unwrap();
    assert_eq!(outcome.messages[0].level, MessageLevel::Warning);
    assert_eq!(outcome.messages[0].message, "Unknown settings section: 'appearance'.");

    let appearance: AppearancePolicy = h.settings.ensure_typed(&library.id).await.unwrap();
    assert_eq!(appearance, before.appearance);
}

#[tokio::test]
async fn test_sign_in_and_password_reset() {
    let h = harness();
    let Registration { identity, library } = register(&h, "reset@library.in").await;

    let first = h.auth.sign_in(&identity.username, PASSWORD, false).await.unwrap();
    assert!(first.first_login);
    assert_eq!(first.max_age, None);
    let second = h.auth.sign_in(&identity.username, PASSWORD, true).await.unwrap();
    assert!(!second.first_login);
    assert_eq!(
        h.auth.authenticate_token(&second.token).await.unwrap().id,
        identity.id
    );

    let reset = h.auth.reset_password("Reset@Library.in").await.unwrap().unwrap();
    assert_eq!(reset.library_name, library.library_name);
    assert!(h.auth.sign_in(&identity.username, &reset.new_password, false).await.is_ok());
    assert!(h.auth.reset_password("ghost@library.in").await.unwrap().is_none());
}
