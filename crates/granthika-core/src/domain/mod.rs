//! # Granthika Core - Domain Module
//!
//! Entities owned by the accounts layer.

pub mod identity;
pub mod library;
pub mod presentation;
pub mod section;
pub mod settings;

pub use identity::AdminIdentity;
pub use library::{InstituteType, Library, LibraryProfile};
pub use presentation::{LoanView, NotificationToggleView, SettingsPage, SystemView};
pub use section::{decode_toggle, parse_or, SectionForm, SettingsSection};
pub use settings::{
    AggregateKind, AppearancePolicy, LibrarySettings, MemberPolicy, NotificationPolicy, RulePolicy,
    SecurityPolicy, SettingsAggregate, SettingsRecord, Subscription, SubscriptionPlan,
};
