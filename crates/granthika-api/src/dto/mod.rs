//! Form payloads and JSON view models.

pub mod auth;
pub mod dashboard;

pub use auth::{ForgetPasswordForm, SignInForm, SignUpForm};
pub use dashboard::{DashboardView, SubscriptionStatus};
