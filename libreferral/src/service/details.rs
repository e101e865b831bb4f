//! Patient details: history, referrals and diagnostics for one patient,
//! plus names for every hospital those referrals mention

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use futures::future::try_join_all;

use crate::service::Loadable;
use crate::types::{Diagnostic, HospitalId, MedicalHistory, Patient, Referral};
use crate::{ApiClient, Result};

/// Shown when any part of the details fetch fails
pub const DETAILS_FAILED: &str = "Failed to fetch patient details";

/// Shown for a hospital id with no resolved name
pub const UNKNOWN_HOSPITAL: &str = "Unknown";

/// Everything the details screen shows beyond the patient itself
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDetails {
    pub patient: Patient,
    pub medical_history: Vec<MedicalHistory>,
    pub referrals: Vec<Referral>,
    pub diagnostics: Vec<Diagnostic>,
    pub hospital_names: BTreeMap<HospitalId, String>,
}

impl PatientDetails {
    pub fn hospital_name(&self, id: HospitalId) -> &str {
        self.hospital_names
            .get(&id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_HOSPITAL)
    }
}

/// Distinct hospital ids referenced by a set of referrals
pub fn referenced_hospitals(referrals: &[Referral]) -> BTreeSet<HospitalId> {
    referrals
        .iter()
        .flat_map(|r| [r.referred_from, r.referred_to])
        .collect()
}

/// Session-scoped hospital name cache
///
/// Only created when `cache.hospital_names` is enabled. Cleared on logout.
#[derive(Debug, Default)]
pub struct HospitalDirectory {
    names: Mutex<HashMap<HospitalId, String>>,
}

impl HospitalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn names(&self) -> std::sync::MutexGuard<'_, HashMap<HospitalId, String>> {
        self.names.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, id: HospitalId) -> Option<String> {
        self.names().get(&id).cloned()
    }

    pub fn insert(&self, id: HospitalId, name: String) {
        self.names().insert(id, name);
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    pub fn clear(&self) {
        self.names().clear();
    }
}

/// Details service
#[derive(Clone)]
pub struct DetailsService {
    client: ApiClient,
    directory: Option<Arc<HospitalDirectory>>,
}

impl DetailsService {
    pub fn new(client: ApiClient, directory: Option<Arc<HospitalDirectory>>) -> Self {
        Self { client, directory }
    }

    pub fn directory(&self) -> Option<&Arc<HospitalDirectory>> {
        self.directory.as_ref()
    }

    /// Fetch details for a patient
    ///
    /// Three filtered requests run concurrently, then one hospital lookup per
    /// distinct referenced id. Any failure fails the whole fetch.
    pub async fn fetch(&self, patient: &Patient) -> Result<PatientDetails> {
        let id = patient.id;
        let (medical_history, referrals, diagnostics) = futures::try_join!(
            self.client.list_medical_history(Some(id)),
            self.client.list_referrals(Some(id)),
            self.client.list_diagnostics(Some(id))
        )?;

        let hospital_names = self.resolve_names(referenced_hospitals(&referrals)).await?;

        Ok(PatientDetails {
            patient: patient.clone(),
            medical_history,
            referrals,
            diagnostics,
            hospital_names,
        })
    }

    /// Load the details screen for a patient
    pub async fn load(&self, patient: &Patient) -> Loadable<PatientDetails> {
        Loadable::settle(self.fetch(patient).await, DETAILS_FAILED)
    }

    async fn resolve_names(&self, ids: BTreeSet<HospitalId>) -> Result<BTreeMap<HospitalId, String>> {
        let mut names = BTreeMap::new();
        let mut missing = Vec::new();

        for id in ids {
            match self.directory.as_ref().and_then(|d| d.get(id)) {
                Some(name) => {
                    names.insert(id, name);
                }
                None => missing.push(id),
            }
        }

        tracing::debug!(
            cached = names.len(),
            lookups = missing.len(),
            "Resolving hospital names"
        );

        let hospitals = try_join_all(missing.iter().map(|id| self.client.get_hospital(*id))).await?;

        for (id, hospital) in missing.into_iter().zip(hospitals) {
            if let Some(directory) = &self.directory {
                directory.insert(id, hospital.name.clone());
            }
            names.insert(id, hospital.name);
        }

        Ok(names)
    }
}
