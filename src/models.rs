use chrono::{DateTime, Utc};
use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A caregiver account; the tenant boundary for all patient data. Keyed in
/// the store by the identity service's subject id, so the struct itself
/// carries no id field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<Value>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A care recipient record, owned by exactly one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    /// Calendar date as `YYYY-MM-DD`; validated before any write.
    pub date_of_birth: String,
    pub status: PatientStatus,
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Care-funnel stage. Case-insensitive on input, stored and serialized
/// uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientStatus {
    Inquiry,
    Onboarding,
    Active,
    Churned,
}

#[derive(Debug, Error)]
#[error("Invalid status '{0}': must be one of INQUIRY, ONBOARDING, ACTIVE, CHURNED")]
pub struct ParseStatusError(String);

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Inquiry => "INQUIRY",
            PatientStatus::Onboarding => "ONBOARDING",
            PatientStatus::Active => "ACTIVE",
            PatientStatus::Churned => "CHURNED",
        }
    }
}

impl FromStr for PatientStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INQUIRY" => Ok(PatientStatus::Inquiry),
            "ONBOARDING" => Ok(PatientStatus::Onboarding),
            "ACTIVE" => Ok(PatientStatus::Active),
            "CHURNED" => Ok(PatientStatus::Churned),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PatientStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PatientStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(DeError::custom)
    }
}

/// Structured postal address with optional geocoded components, as produced
/// by the admin UI's address autocomplete. Field names follow the geocoder's
/// wire format, so no camelCase renaming here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_components: Option<Vec<AddressComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

/// Create-patient request body. Required fields are `Option` so the handler
/// can answer missing input with a 400 instead of a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatient {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub status: Option<String>,
    pub address: Option<Address>,
    pub profile_image_url: Option<String>,
}

/// Partial update of a patient. Only fields present in the body are applied;
/// `middleName` distinguishes absent from explicit `null` so it can be
/// cleared.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatient {
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub middle_name: Option<Option<String>>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub status: Option<String>,
    pub address: Option<Address>,
    pub profile_image_url: Option<String>,
}

/// Partial update of the caller's own provider profile.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProvider {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_info: Option<Value>,
    pub profile_image_url: Option<String>,
}

/// Page metadata returned by the patient list endpoint. `has_more` is an
/// approximation: a full page is assumed to possibly have more.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
    pub count: usize,
    pub has_more: bool,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
