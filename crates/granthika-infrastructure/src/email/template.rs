//! Email template rendering with Handlebars
//!
//! Templates are compiled into the binary. Every mail kind has a subject, a
//! plain text body and an HTML body. Only the HTML registry escapes values.

use granthika_core::services::MailKind;
use handlebars::Handlebars;
use tracing::debug;

use super::EmailError;

/// Subject plus both bodies of one rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

struct TemplateSource {
    kind: MailKind,
    subject: &'static str,
    text: &'static str,
    html: &'static str,
}

const SOURCES: [TemplateSource; 3] = [
    TemplateSource {
        kind: MailKind::AccountCredentials,
        subject: include_str!("../../templates/email/account_credentials.subject.hbs"),
        text: include_str!("../../templates/email/account_credentials.txt.hbs"),
        html: include_str!("../../templates/email/account_credentials.html.hbs"),
    },
    TemplateSource {
        kind: MailKind::PasswordReset,
        subject: include_str!("../../templates/email/password_reset.subject.hbs"),
        text: include_str!("../../templates/email/password_reset.txt.hbs"),
        html: include_str!("../../templates/email/password_reset.html.hbs"),
    },
    TemplateSource {
        kind: MailKind::Welcome,
        subject: include_str!("../../templates/email/welcome.subject.hbs"),
        text: include_str!("../../templates/email/welcome.txt.hbs"),
        html: include_str!("../../templates/email/welcome.html.hbs"),
    },
];

pub struct TemplateEngine {
    text: Handlebars<'static>,
    html: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, EmailError> {
        let mut text = Handlebars::new();
        text.set_strict_mode(true);
        text.register_escape_fn(handlebars::no_escape);

        let mut html = Handlebars::new();
        html.set_strict_mode(true);

        for source in &SOURCES {
            let name = source.kind.as_str();
            text.register_template_string(&subject_name(name), source.subject)
                .and_then(|_| text.register_template_string(name, source.text))
                .and_then(|_| html.register_template_string(name, source.html))
                .map_err(|e| EmailError::TemplateError(format!("{}: {}", name, e)))?;
        }

        Ok(Self { text, html })
    }

    pub fn render(&self, kind: MailKind, vars: &serde_json::Value) -> Result<RenderedMail, EmailError> {
        let name = kind.as_str();
        debug!("Rendering {} email", name);

        let render_err = |e: handlebars::RenderError| EmailError::TemplateError(format!("{}: {}", name, e));
        let subject = self.text.render(&subject_name(name), vars).map_err(render_err)?;
        let text_body = self.text.render(name, vars).map_err(render_err)?;
        let html_body = self.html.render(name, vars).map_err(render_err)?;

        Ok(RenderedMail {
            subject: subject.trim().to_string(),
            text_body,
            html_body,
        })
    }
}

fn subject_name(name: &str) -> String {
    format!("{}.subject", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credentials_vars() -> serde_json::Value {
        json!({
            "brand_name": "Dooars Granthika",
            "sign_in_url": "http://localhost/accounts/sign_in",
            "full_name": "Asha <Roy>",
            "username": "DG123456",
            "email": "asha@library.in",
            "password": "p&ss<word>",
            "library_name": "Hill Library",
            "library_code": "DG-AB12",
        })
    }

    #[test]
    fn test_every_kind_has_templates() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine.render(MailKind::AccountCredentials, &credentials_vars()).unwrap();
        assert_eq!(rendered.subject, "Your Library Account Credentials");
        assert!(rendered.text_body.contains("Welcome to Dooars Granthika!"));
        assert!(rendered.text_body.contains("Please login and change your password immediately."));
    }

    #[test]
    fn test_text_body_is_not_escaped_but_html_is() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine.render(MailKind::AccountCredentials, &credentials_vars()).unwrap();
        assert!(rendered.text_body.contains("Password: p&ss<word>"));
        assert!(rendered.html_body.contains("p&amp;ss&lt;word&gt;"));
        assert!(rendered.html_body.contains("Asha &lt;Roy&gt;"));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let engine = TemplateEngine::new().unwrap();
        let result = engine.render(MailKind::Welcome, &json!({ "brand_name": "X" }));
        assert!(matches!(result, Err(EmailError::TemplateError(_))));
    }
}
