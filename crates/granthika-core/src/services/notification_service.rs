//! Account emails: the dispatcher port and the view models fed to it.
//!
//! Delivery is best effort. A dispatcher reports failure as `false` and never
//! raises, so callers decide whether the user should hear about it.

use std::sync::Arc;

use async_trait::async_trait;
use granthika_shared::utils::mask_email;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::{AdminIdentity, Library};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailKind {
    AccountCredentials,
    PasswordReset,
    Welcome,
}

impl MailKind {
    pub const ALL: [MailKind; 3] = [
        MailKind::AccountCredentials,
        MailKind::PasswordReset,
        MailKind::Welcome,
    ];

    /// Template name used by the renderer.
    pub fn as_str(&self) -> &'static str {
        match self {
            MailKind::AccountCredentials => "account_credentials",
            MailKind::PasswordReset => "password_reset",
            MailKind::Welcome => "welcome",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Renders `kind` with `variables` and delivers it to `recipient`.
    async fn send(&self, kind: MailKind, recipient: &str, variables: &serde_json::Value) -> bool;
}

pub struct NotificationService {
    dispatcher: Arc<dyn MailDispatcher>,
    brand_name: String,
    sign_in_url: String,
}

impl NotificationService {
    pub fn new(dispatcher: Arc<dyn MailDispatcher>, brand_name: String, sign_in_url: String) -> Self {
        Self {
            dispatcher,
            brand_name,
            sign_in_url,
        }
    }

    pub async fn send_credentials(&self, identity: &AdminIdentity, library: &Library, password: &str) -> bool {
        let variables = json!({
            "brand_name": self.brand_name,
            "sign_in_url": self.sign_in_url,
            "full_name": identity.display_name(),
            "username": identity.username,
            "email": identity.email,
            "password": password,
            "library_name": library.library_name,
            "library_code": library.library_code,
        });
        self.dispatch(MailKind::AccountCredentials, &identity.email, &variables).await
    }

    pub async fn send_password_reset(
        &self,
        identity: &AdminIdentity,
        new_password: &str,
        library_name: &str,
    ) -> bool {
        let variables = json!({
            "brand_name": self.brand_name,
            "sign_in_url": self.sign_in_url,
            "full_name": identity.display_name(),
            "username": identity.username,
            "password": new_password,
            "library_name": library_name,
        });
        self.dispatch(MailKind::PasswordReset, &identity.email, &variables).await
    }

    pub async fn send_welcome(&self, identity: &AdminIdentity, library_name: &str) -> bool {
        let variables = json!({
            "brand_name": self.brand_name,
            "sign_in_url": self.sign_in_url,
            "full_name": identity.display_name(),
            "username": identity.username,
            "library_name": library_name,
        });
        self.dispatch(MailKind::Welcome, &identity.email, &variables).await
    }

    async fn dispatch(&self, kind: MailKind, recipient: &str, variables: &serde_json::Value) -> bool {
        let delivered = self.dispatcher.send(kind, recipient, variables).await;
        if delivered {
            info!("Sent {} email to {}", kind.as_str(), mask_email(recipient));
        } else {
            warn!("Could not deliver {} email to {}", kind.as_str(), mask_email(recipient));
        }
        delivered
    }
}
