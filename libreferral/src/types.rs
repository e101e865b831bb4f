//! Records mirrored from the referral API
//!
//! These are plain serde records. Dates are kept as the strings the backend
//! sends; the client never normalizes them.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub type PatientId = i64;
pub type HospitalId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub contact_info: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub patient: Option<PatientId>,
    pub condition: String,
    pub treatment: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub patient: Option<PatientId>,
    pub diagnostic_type: String,
    pub result: String,
    pub date_taken: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Referral status
///
/// Statuses outside the known set decode to `Unknown` so one odd row does
/// not fail a whole aggregate fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferralStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ReferralStatus {
    /// Statuses a user can pick when creating a referral
    pub const SELECTABLE: [ReferralStatus; 3] = [
        ReferralStatus::Pending,
        ReferralStatus::Accepted,
        ReferralStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "Pending",
            ReferralStatus::Accepted => "Accepted",
            ReferralStatus::Rejected => "Rejected",
            ReferralStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    #[serde(default)]
    pub patient: Option<PatientId>,
    pub referred_from: HospitalId,
    pub referred_to: HospitalId,
    pub referral_reason: String,
    pub referral_date: String,
    pub status: ReferralStatus,
}

/// Body of a referral creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReferral {
    pub patient: Option<PatientId>,
    pub referred_from: Option<HospitalId>,
    pub referred_to: Option<HospitalId>,
    pub referral_reason: String,
    pub referral_date: String,
    pub status: ReferralStatus,
}

/// The hospital an equipment record belongs to
///
/// The backend sends either a bare id or an embedded hospital object.
/// Unassigned equipment comes back with `null` or no hospital at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HospitalRef {
    Id(HospitalId),
    Embedded {
        #[serde(default)]
        id: Option<HospitalId>,
        #[serde(default)]
        name: Option<String>,
    },
    #[default]
    Missing,
}

impl HospitalRef {
    /// Display label used when grouping search results
    pub fn label(&self) -> String {
        match self {
            HospitalRef::Embedded {
                name: Some(name), ..
            } if !name.is_empty() => name.clone(),
            HospitalRef::Embedded { id: Some(id), .. } | HospitalRef::Id(id) => {
                format!("Hospital ID: {}", id)
            }
            HospitalRef::Embedded { id: None, .. } | HospitalRef::Missing => {
                "Hospital ID: unknown".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    #[serde(default)]
    pub hospital: HospitalRef,
    #[serde(default)]
    pub equipment_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available: bool,
}

/// The signed-in user's hospital and role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub hospital: Option<HospitalId>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response of the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Username and password submitted by the login and register forms
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}
