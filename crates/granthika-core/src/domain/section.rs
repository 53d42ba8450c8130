//! Settings form sections and the decoding rules for submitted fields.
//!
//! Every value arrives as an optional string. Text fields keep their current
//! value when absent, toggles follow the checkbox convention (`"on"` or
//! nothing) and numbers fall back to the stored value when they do not parse.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::str::FromStr;

use granthika_shared::constants::TOGGLE_ON;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Field carrying the section identifier on every settings form.
pub const FORM_TYPE_FIELD: &str = "form_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsSection {
    Profile,
    Security,
    System,
    Notifications,
    Fine,
}

impl SettingsSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsSection::Profile => "profile",
            SettingsSection::Security => "security",
            SettingsSection::System => "system",
            SettingsSection::Notifications => "notifications",
            SettingsSection::Fine => "fine",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "profile" => Some(SettingsSection::Profile),
            "security" => Some(SettingsSection::Security),
            "system" => Some(SettingsSection::System),
            "notifications" => Some(SettingsSection::Notifications),
            "fine" => Some(SettingsSection::Fine),
            _ => None,
        }
    }
}

/// `"on"` is true; any other value, or no value at all, is false.
pub fn decode_toggle(raw: Option<&str>) -> bool {
    raw == Some(TOGGLE_ON)
}

/// Parses `raw`, keeping `previous` when it is absent or malformed.
pub fn parse_or<T: FromStr>(raw: Option<&str>, previous: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(previous)
}

/// Like [`parse_or`], and also keeps `previous` for values outside `range`.
pub fn parse_in_range<T>(raw: Option<&str>, previous: T, range: &RangeInclusive<T>) -> T
where
    T: FromStr + PartialOrd,
{
    match raw.and_then(|v| v.trim().parse::<T>().ok()) {
        Some(value) if range.contains(&value) => value,
        _ => previous,
    }
}

/// Largest fine a `NUMERIC(8, 2)` column holds.
fn max_fine() -> Decimal {
    Decimal::new(99_999_999, 2)
}

/// Submitted form fields of one settings section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionForm {
    fields: HashMap<String, String>,
}

impl SectionForm {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn section_name(&self) -> &str {
        self.get(FORM_TYPE_FIELD).map(str::trim).unwrap_or("")
    }

    /// Trimmed value of `key`, or `current` when the field was not submitted.
    pub fn text_or(&self, key: &str, current: &str) -> String {
        self.get(key).unwrap_or(current).trim().to_string()
    }

    /// Same as [`Self::text_or`] but a blank submission clears the value.
    pub fn optional_text_or(&self, key: &str, current: Option<&str>) -> Option<String> {
        match self.get(key) {
            Some(value) => Some(value.trim().to_string()).filter(|v| !v.is_empty()),
            None => current.map(str::to_string),
        }
    }

    /// [`Self::text_or`] with a character-count bound. `None` means the
    /// submitted value is out of bounds and `current` should be kept.
    pub fn text_within(&self, key: &str, current: &str, lengths: &RangeInclusive<usize>) -> Option<String> {
        let value = self.text_or(key, current);
        lengths.contains(&value.chars().count()).then_some(value)
    }

    /// [`Self::optional_text_or`] limited to `max` characters.
    pub fn optional_text_within(&self, key: &str, current: Option<&str>, max: usize) -> Option<Option<String>> {
        match self.optional_text_or(key, current) {
            Some(value) if value.chars().count() > max => None,
            value => Some(value),
        }
    }

    pub fn toggle(&self, key: &str) -> bool {
        decode_toggle(self.get(key))
    }

    pub fn int_or(&self, key: &str, previous: i32, range: &RangeInclusive<i32>) -> i32 {
        parse_in_range(self.get(key), previous, range)
    }

    /// Non-negative amount with two decimal places.
    pub fn amount_or(&self, key: &str, previous: Decimal) -> Decimal {
        let range = Decimal::ZERO..=max_fine();
        parse_in_range(self.get(key), previous, &range).round_dp(2)
    }
}

impl From<HashMap<String, String>> for SectionForm {
    fn from(fields: HashMap<String, String>) -> Self {
        Self::new(fields)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SectionForm {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
