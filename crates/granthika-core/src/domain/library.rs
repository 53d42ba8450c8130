// ============================================================================
// Granthika Core - Library Entity
// File: crates/granthika-core/src/domain/library.rs
// Description: The tenant record, one per admin identity
// ============================================================================

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Column bounds shared by registration and the settings forms.
pub const NAME_LENGTHS: RangeInclusive<usize> = 2..=255;
pub const PHONE_MAX: usize = 20;
pub const REGION_MAX: usize = 100;

/// Institute type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstituteType {
    Private,
    GovernmentRural,
    GovernmentUrban,
}

impl InstituteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstituteType::Private => "private",
            InstituteType::GovernmentRural => "government_rural",
            InstituteType::GovernmentUrban => "government_urban",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "private" => Some(InstituteType::Private),
            "government_rural" => Some(InstituteType::GovernmentRural),
            "government_urban" => Some(InstituteType::GovernmentUrban),
            _ => None,
        }
    }
}

impl Default for InstituteType {
    fn default() -> Self {
        InstituteType::Private
    }
}

/// Profile fields supplied on the registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LibraryProfile {
    #[validate(length(min = 2, max = 255, message = "Library name must be between 2 and 255 characters."))]
    pub library_name: String,

    #[validate(length(min = 2, max = 255, message = "Institute name must be between 2 and 255 characters."))]
    pub institute_name: String,

    pub institute_type: InstituteType,

    #[validate(email(message = "Enter a valid institute email."))]
    pub institute_email: String,

    #[validate(length(max = 20, message = "Phone number too long."))]
    pub phone_number: Option<String>,

    #[validate(length(min = 1, message = "Address is required."))]
    pub address: String,

    #[validate(length(max = 100, message = "District too long."))]
    pub district: String,

    #[validate(length(max = 100, message = "State too long."))]
    pub state: String,

    #[validate(length(max = 100, message = "Country too long."))]
    pub country: String,
}

/// Library (tenant) entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Set once at creation, never rewritten.
    pub library_code: String,
    pub library_name: String,
    pub institute_name: String,
    pub institute_type: InstituteType,
    pub institute_email: String,
    pub phone_number: Option<String>,
    pub address: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub library_logo: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Library {
    pub fn new(
        user_id: Uuid,
        library_code: String,
        profile: LibraryProfile,
    ) -> Result<Self, validator::ValidationErrors> {
        let profile = LibraryProfile {
            library_name: profile.library_name.trim().to_string(),
            institute_name: profile.institute_name.trim().to_string(),
            institute_type: profile.institute_type,
            institute_email: granthika_shared::utils::normalize_email(&profile.institute_email),
            phone_number: profile
                .phone_number
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            address: profile.address.trim().to_string(),
            district: profile.district.trim().to_string(),
            state: profile.state.trim().to_string(),
            country: profile.country.trim().to_string(),
        };
        profile.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            library_code,
            library_name: profile.library_name,
            institute_name: profile.institute_name,
            institute_type: profile.institute_type,
            institute_email: profile.institute_email,
            phone_number: profile.phone_number,
            address: profile.address,
            district: profile.district,
            state: profile.state,
            country: profile.country,
            library_logo: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Copy carrying a different code, used when a generated code collided.
    pub fn with_code(&self, library_code: String) -> Self {
        Self {
            library_code,
            ..self.clone()
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
