//! Referral creation form

use chrono::Utc;

use crate::service::{Loadable, Route, Submission};
use crate::types::{Hospital, HospitalId, NewReferral, Patient, PatientId, ReferralStatus};
use crate::{ApiClient, Result};

/// Shown when the form's patient or hospital lists cannot be loaded
pub const OPTIONS_FAILED: &str = "Failed to fetch data.";

/// Shown when the creation request fails
pub const CREATE_FAILED: &str = "Referral creation failed.";

/// Today's date as `YYYY-MM-DD` (UTC)
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Choices offered by the form's pickers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferralOptions {
    pub patients: Vec<Patient>,
    pub hospitals: Vec<Hospital>,
}

/// Referral form fields
///
/// Nothing is validated client-side; unset pickers are sent as `null` and
/// the backend decides.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferralForm {
    pub patient: Option<PatientId>,
    pub referred_from: Option<HospitalId>,
    pub referred_to: Option<HospitalId>,
    pub reason: String,
    pub date: String,
    pub status: ReferralStatus,
}

impl Default for ReferralForm {
    fn default() -> Self {
        Self {
            patient: None,
            referred_from: None,
            referred_to: None,
            reason: String::new(),
            date: today(),
            status: ReferralStatus::Pending,
        }
    }
}

impl ReferralForm {
    pub fn to_request(&self) -> NewReferral {
        NewReferral {
            patient: self.patient,
            referred_from: self.referred_from,
            referred_to: self.referred_to,
            referral_reason: self.reason.clone(),
            referral_date: self.date.clone(),
            status: self.status,
        }
    }
}

/// Referral form service
#[derive(Clone)]
pub struct ReferralFormService {
    client: ApiClient,
}

impl ReferralFormService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch patients and hospitals concurrently; both must succeed
    pub async fn fetch_options(&self) -> Result<ReferralOptions> {
        let (patients, hospitals) =
            futures::try_join!(self.client.list_patients(), self.client.list_hospitals())?;
        Ok(ReferralOptions {
            patients,
            hospitals,
        })
    }

    pub async fn load_options(&self) -> Loadable<ReferralOptions> {
        Loadable::settle(self.fetch_options().await, OPTIONS_FAILED)
    }

    /// Submit the form as a single creation request
    pub async fn submit(&self, form: &ReferralForm) -> Submission {
        let request = form.to_request();
        tracing::info!(
            patient = ?request.patient,
            status = %request.status,
            "Creating referral"
        );
        let result = self.client.create_referral(&request).await;
        Submission::settle(result, Route::Home, CREATE_FAILED)
    }
}
