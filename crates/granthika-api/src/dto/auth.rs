// ============================================================================
// Granthika API - Account Form DTOs
// File: crates/granthika-api/src/dto/auth.rs
// ============================================================================

use granthika_core::domain::{InstituteType, LibraryProfile};
use granthika_core::services::RegistrationRequest;
use serde::Deserialize;

/// Sign-in form. `remember_me` follows the checkbox convention.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub remember_me: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgetPasswordForm {
    #[serde(default)]
    pub email: String,
}

/// Registration form as posted, one flat field per input.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub library_name: String,
    #[serde(default)]
    pub institute_name: String,
    #[serde(default)]
    pub institute_type: String,
    #[serde(default)]
    pub institute_email: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub admin_full_name: String,
    #[serde(default)]
    pub admin_password: String,
    #[serde(default)]
    pub admin_confirm_password: String,
}

impl SignUpForm {
    /// `None` when the institute type is not one of the offered choices.
    pub fn into_request(self) -> Option<RegistrationRequest> {
        let institute_type = InstituteType::from_str(&self.institute_type)?;
        Some(RegistrationRequest {
            profile: LibraryProfile {
                library_name: self.library_name,
                institute_name: self.institute_name,
                institute_type,
                institute_email: self.institute_email,
                phone_number: self.phone_number,
                address: self.address,
                district: self.district,
                state: self.state,
                country: self.country,
            },
            admin_full_name: self.admin_full_name,
            admin_password: self.admin_password,
            admin_confirm_password: self.admin_confirm_password,
        })
    }
}
