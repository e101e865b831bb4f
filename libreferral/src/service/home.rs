//! Home screen: the six-collection aggregate fetch and equipment search

use crate::service::Loadable;
use crate::types::{Diagnostic, Equipment, Hospital, MedicalHistory, Patient, Referral, User};
use crate::{ApiClient, Result};

/// Shown in place of every home section when the aggregate fetch fails
pub const FETCH_FAILED: &str = "Failed to fetch data from one or more endpoints";

/// Shown when an equipment search fails
pub const EQUIPMENT_SEARCH_FAILED: &str = "Error searching for equipment";

/// Everything the home screen lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeData {
    pub hospitals: Vec<Hospital>,
    pub patients: Vec<Patient>,
    pub medical_history: Vec<MedicalHistory>,
    pub diagnostics: Vec<Diagnostic>,
    pub equipment: Vec<Equipment>,
    pub referrals: Vec<Referral>,
}

/// Home screen state after mount
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub data: Loadable<HomeData>,
    /// The signed-in user, when the lookup succeeded
    pub user: Option<User>,
}

/// Equipment search results for one hospital
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentGroup {
    pub hospital: String,
    pub equipment: Vec<Equipment>,
}

/// Group equipment by owning hospital, in first-seen order
///
/// Items without an equipment name still create their hospital's group but
/// are not listed in it.
pub fn group_by_hospital(items: &[Equipment]) -> Vec<EquipmentGroup> {
    let mut groups: Vec<EquipmentGroup> = Vec::new();

    for item in items {
        let label = item.hospital.label();
        let index = match groups.iter().position(|g| g.hospital == label) {
            Some(index) => index,
            None => {
                groups.push(EquipmentGroup {
                    hospital: label,
                    equipment: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let named = item
            .equipment_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if named {
            groups[index].equipment.push(item.clone());
        }
    }

    groups
}

/// Home service
#[derive(Clone)]
pub struct HomeService {
    client: ApiClient,
}

impl HomeService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch all six collections concurrently
    ///
    /// All-or-nothing: the first failing request fails the whole fetch.
    pub async fn fetch_all(&self) -> Result<HomeData> {
        let (hospitals, patients, medical_history, diagnostics, equipment, referrals) = futures::try_join!(
            self.client.list_hospitals(),
            self.client.list_patients(),
            self.client.list_medical_history(None),
            self.client.list_diagnostics(None),
            self.client.list_equipment(None),
            self.client.list_referrals(None)
        )?;

        tracing::debug!(
            hospitals = hospitals.len(),
            patients = patients.len(),
            referrals = referrals.len(),
            "Home data loaded"
        );

        Ok(HomeData {
            hospitals,
            patients,
            medical_history,
            diagnostics,
            equipment,
            referrals,
        })
    }

    /// Look up the signed-in user by the token's username claim
    ///
    /// Returns `Ok(None)` when there is no token or the token carries no
    /// username.
    pub async fn current_user(&self) -> Result<Option<User>> {
        match self.client.session().username()? {
            Some(username) => self.client.find_user(&username).await,
            None => Ok(None),
        }
    }

    /// Load the home screen
    ///
    /// The user lookup runs alongside the aggregate fetch but is not part of
    /// it: its failure is logged and the screen renders without a user.
    pub async fn load(&self) -> HomeView {
        let (data, user) = futures::join!(self.fetch_all(), self.current_user());

        let user = match user {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to look up current user");
                None
            }
        };

        HomeView {
            data: Loadable::settle(data, FETCH_FAILED),
            user,
        }
    }

    /// Search equipment by name
    ///
    /// A blank query issues no request and returns `None`.
    pub async fn search_equipment(&self, query: &str) -> Option<Loadable<Vec<EquipmentGroup>>> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        tracing::debug!(query, "Searching equipment");
        let result = self
            .client
            .list_equipment(Some(query))
            .await
            .map(|items| group_by_hospital(&items));

        Some(Loadable::settle(result, EQUIPMENT_SEARCH_FAILED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HospitalRef;

    fn equipment(id: i64, hospital: HospitalRef, name: Option<&str>) -> Equipment {
        Equipment {
            id,
            hospital,
            equipment_name: name.map(str::to_string),
            description: None,
            available: true,
        }
    }

    fn embedded(id: i64, name: &str) -> HospitalRef {
        HospitalRef::Embedded {
            id: Some(id),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_group_by_hospital_first_seen_order() {
        let items = vec![
            equipment(1, embedded(2, "Riverside"), Some("MRI")),
            equipment(2, embedded(1, "Central"), Some("CT")),
            equipment(3, embedded(2, "Riverside"), Some("X-Ray")),
        ];

        let groups = group_by_hospital(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].hospital, "Riverside");
        assert_eq!(groups[0].equipment.len(), 2);
        assert_eq!(groups[1].hospital, "Central");
    }

    #[test]
    fn test_group_by_hospital_id_fallback() {
        let items = vec![equipment(1, HospitalRef::Id(7), Some("Ventilator"))];

        let groups = group_by_hospital(&items);
        assert_eq!(groups[0].hospital, "Hospital ID: 7");
    }

    #[test]
    fn test_group_by_hospital_missing_hospital() {
        let items = vec![
            equipment(1, HospitalRef::Missing, Some("Portable X-ray")),
            equipment(2, HospitalRef::Missing, Some("Infusion pump")),
        ];

        let groups = group_by_hospital(&items);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].hospital, "Hospital ID: unknown");
        assert_eq!(groups[0].equipment.len(), 2);
    }

    #[test]
    fn test_unnamed_equipment_creates_empty_group() {
        let items = vec![
            equipment(1, embedded(4, "North"), None),
            equipment(2, embedded(5, "South"), Some("  ")),
        ];

        let groups = group_by_hospital(&items);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.equipment.is_empty()));
    }

    #[test]
    fn test_group_empty_input() {
        assert!(group_by_hospital(&[]).is_empty());
    }
}
