//! SMTP email sender using lettre

use std::time::Duration;

use async_trait::async_trait;
use granthika_core::services::{MailDispatcher, MailKind};
use granthika_shared::config::EmailSettings;
use granthika_shared::utils::mask_email;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use super::template::{RenderedMail, TemplateEngine};
use super::EmailError;

pub struct SmtpMailDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    templates: TemplateEngine,
}

impl SmtpMailDispatcher {
    pub fn new(settings: &EmailSettings, templates: TemplateEngine) -> Result<Self, EmailError> {
        let host = settings.smtp_host.as_str();
        let tls = match settings.tls_mode.as_str() {
            "tls" => Tls::Wrapper(tls_parameters(host)?),
            "starttls" => Tls::Opportunistic(tls_parameters(host)?),
            "none" => Tls::None,
            other => {
                return Err(EmailError::ConfigError(format!(
                    "Invalid TLS mode: {}. Must be 'none', 'starttls', or 'tls'",
                    other
                )))
            }
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(settings.smtp_port)
            .timeout(Some(Duration::from_secs(settings.timeout_seconds)))
            .tls(tls);
        if !settings.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.smtp_username.clone(),
                settings.smtp_password.clone(),
            ));
        }

        let from = format!("{} <{}>", settings.from_name, settings.from_address)
            .parse::<Mailbox>()
            .map_err(|e| EmailError::AddressError(format!("from address: {}", e)))?;

        debug!(
            "SMTP dispatcher ready for {}:{} (tls: {})",
            host, settings.smtp_port, settings.tls_mode
        );
        Ok(Self {
            transport: builder.build(),
            from,
            templates,
        })
    }

    fn build_message(&self, recipient: &str, mail: RenderedMail) -> Result<Message, EmailError> {
        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| EmailError::AddressError(format!("recipient: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject)
            .multipart(MultiPart::alternative_plain_html(mail.text_body, mail.html_body))
            .map_err(|e| EmailError::ConfigError(format!("Failed to build email: {}", e)))
    }

    async fn deliver(
        &self,
        kind: MailKind,
        recipient: &str,
        variables: &serde_json::Value,
    ) -> Result<(), EmailError> {
        let mail = self.templates.render(kind, variables)?;
        let message = self.build_message(recipient, mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::TransportError(e.to_string()))?;
        debug!("SMTP response code {}", response.code());
        Ok(())
    }
}

fn tls_parameters(host: &str) -> Result<TlsParameters, EmailError> {
    TlsParameters::builder(host.to_string())
        .build()
        .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))
}

#[async_trait]
impl MailDispatcher for SmtpMailDispatcher {
    async fn send(&self, kind: MailKind, recipient: &str, variables: &serde_json::Value) -> bool {
        match self.deliver(kind, recipient, variables).await {
            Ok(()) => {
                info!("Email {} delivered to {}", kind.as_str(), mask_email(recipient));
                true
            }
            Err(e) => {
                warn!("Email {} to {} failed: {}", kind.as_str(), mask_email(recipient), e);
                false
            }
        }
    }
}

/// Used when `email.enabled` is false. Renders so template mistakes still
/// show up in logs. Nothing is sent, so every mail reports as undelivered.
pub struct DisabledMailDispatcher {
    templates: TemplateEngine,
}

impl DisabledMailDispatcher {
    pub fn new(templates: TemplateEngine) -> Self {
        Self { templates }
    }
}

#[async_trait]
impl MailDispatcher for DisabledMailDispatcher {
    async fn send(&self, kind: MailKind, recipient: &str, variables: &serde_json::Value) -> bool {
        match self.templates.render(kind, variables) {
            Ok(mail) => {
                info!(
                    "Email sending disabled, skipping '{}' to {}",
                    mail.subject,
                    mask_email(recipient)
                );
                false
            }
            Err(e) => {
                warn!("Email {} could not be rendered: {}", kind.as_str(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(tls_mode: &str) -> EmailSettings {
        EmailSettings {
            enabled: true,
            smtp_host: "localhost".into(),
            smtp_port: 2525,
            smtp_username: String::new(),
            smtp_password: String::new(),
            tls_mode: tls_mode.into(),
            timeout_seconds: 1,
            from_address: "no-reply@granthika.local".into(),
            from_name: "Dooars Granthika".into(),
            brand_name: "Dooars Granthika".into(),
            sign_in_url: "http://localhost/accounts/sign_in".into(),
        }
    }

    #[test]
    fn test_invalid_tls_mode_rejected() {
        let result = SmtpMailDispatcher::new(&settings("ssl"), TemplateEngine::new().unwrap());
        assert!(matches!(result, Err(EmailError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_bad_recipient_reports_false() {
        let dispatcher = SmtpMailDispatcher::new(&settings("none"), TemplateEngine::new().unwrap()).unwrap();
        let vars = json!({
            "brand_name": "Dooars Granthika",
            "sign_in_url": "http://localhost/accounts/sign_in",
            "full_name": "Admin",
            "username": "DG000000",
            "library_name": "Library",
        });
        assert!(!dispatcher.send(MailKind::Welcome, "not an address", &vars).await);
    }

    #[tokio::test]
    async fn test_disabled_dispatcher_never_reports_delivery() {
        let dispatcher = DisabledMailDispatcher::new(TemplateEngine::new().unwrap());
        let vars = json!({
            "brand_name": "Dooars Granthika",
            "sign_in_url": "http://localhost/accounts/sign_in",
            "full_name": "Admin",
            "username": "DG000000",
            "library_name": "Library",
        });
        assert!(dispatcher.templates.render(MailKind::Welcome, &vars).is_ok());
        assert!(!dispatcher.send(MailKind::Welcome, "admin@library.in", &vars).await);
        assert!(!dispatcher.send(MailKind::Welcome, "admin@library.in", &json!({})).await);
    }
}
