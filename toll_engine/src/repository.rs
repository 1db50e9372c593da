//! Vehicle register.
//!
//! The HTTP layer resolves registration numbers to vehicles through
//! the [`VehicleRepository`] trait.  Only an in-memory implementation
//! is provided; it is seeded from a JSON file at startup and accepts
//! new vehicles and passages while the process runs.

use crate::error::{Result, TollError};
use crate::models::Vehicle;
use chrono::NaiveDateTime;
use dashmap::DashMap;
use std::path::Path;
use tracing::info;

/// Lookup and recording of vehicles by registration number.
///
/// Repositories must be thread-safe (`Send + Sync`) because the API
/// shares one instance across all requests.
pub trait VehicleRepository: Send + Sync {
    fn find(&self, registration_number: &str) -> Option<Vehicle>;
    /// Fails if the registration number is already taken.
    fn register(&self, vehicle: Vehicle) -> Result<()>;
    /// Appends passages and returns the updated vehicle.
    fn record_passages(
        &self,
        registration_number: &str,
        passages: &[NaiveDateTime],
    ) -> Result<Vehicle>;
    /// All vehicles, ordered by registration number.
    fn list(&self) -> Vec<Vehicle>;
}

/// Registration numbers are matched case-insensitively and without
/// surrounding whitespace.
pub fn normalize_registration(registration_number: &str) -> String {
    registration_number.trim().to_uppercase()
}

#[derive(Debug, Default)]
pub struct InMemoryVehicleRepository {
    vehicles: DashMap<String, Vehicle>,
}

impl InMemoryVehicleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicles(vehicles: impl IntoIterator<Item = Vehicle>) -> Result<Self> {
        let repo = Self::new();
        for vehicle in vehicles {
            repo.register(vehicle)?;
        }
        Ok(repo)
    }

    /// Loads a JSON array of vehicles.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let vehicles: Vec<Vehicle> = serde_json::from_str(&data)?;
        let repo = Self::with_vehicles(vehicles)?;
        info!(path = %path.display(), vehicles = repo.vehicles.len(), "seeded vehicle register");
        Ok(repo)
    }
}

impl VehicleRepository for InMemoryVehicleRepository {
    fn find(&self, registration_number: &str) -> Option<Vehicle> {
        self.vehicles
            .get(&normalize_registration(registration_number))
            .map(|v| v.clone())
    }

    fn register(&self, mut vehicle: Vehicle) -> Result<()> {
        let key = normalize_registration(&vehicle.registration_number);
        match self.vehicles.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(TollError::VehicleAlreadyExists(key)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                vehicle.registration_number = key;
                slot.insert(vehicle);
                Ok(())
            }
        }
    }

    fn record_passages(
        &self,
        registration_number: &str,
        passages: &[NaiveDateTime],
    ) -> Result<Vehicle> {
        let key = normalize_registration(registration_number);
        let mut vehicle = self
            .vehicles
            .get_mut(&key)
            .ok_or(TollError::VehicleNotFound(key))?;
        vehicle.passages.extend_from_slice(passages);
        Ok(vehicle.clone())
    }

    fn list(&self) -> Vec<Vehicle> {
        let mut vehicles: Vec<Vehicle> = self.vehicles.iter().map(|e| e.value().clone()).collect();
        vehicles.sort_by(|a, b| a.registration_number.cmp(&b.registration_number));
        vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleCategory;
    use chrono::NaiveDate;

    fn car(reg: &str) -> Vehicle {
        Vehicle {
            registration_number: reg.to_string(),
            category: VehicleCategory::Car,
            passages: Vec::new(),
        }
    }

    #[test]
    fn test_lookup_is_normalised() {
        let repo = InMemoryVehicleRepository::with_vehicles([car("qnx-473")]).unwrap();
        let found = repo.find("  QNX-473 ").unwrap();
        assert_eq!(found.registration_number, "QNX-473");
        assert!(repo.find("ABC-123").is_none());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let repo = InMemoryVehicleRepository::new();
        repo.register(car("ABC-123")).unwrap();
        let err = repo.register(car("abc-123")).unwrap_err();
        assert!(matches!(err, TollError::VehicleAlreadyExists(reg) if reg == "ABC-123"));
    }

    #[test]
    fn test_record_passages_appends() {
        let repo = InMemoryVehicleRepository::with_vehicles([car("ABC-123")]).unwrap();
        let t = NaiveDate::from_ymd_opt(2013, 4, 29)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        repo.record_passages("ABC-123", &[t]).unwrap();
        let updated = repo.record_passages("abc-123", &[t]).unwrap();
        assert_eq!(updated.passages, vec![t, t]);
    }

    #[test]
    fn test_record_passages_for_missing_vehicle() {
        let repo = InMemoryVehicleRepository::new();
        let err = repo.record_passages("NOPE-1", &[]).unwrap_err();
        assert!(matches!(err, TollError::VehicleNotFound(_)));
    }

    #[test]
    fn test_shipped_seed_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/vehicles.json");
        let repo = InMemoryVehicleRepository::load(&path).unwrap();
        let regs: Vec<String> = repo.list().into_iter().map(|v| v.registration_number).collect();
        assert_eq!(regs, vec!["BUS-220", "DIP-007", "MCB-101", "QNX-473"]);
    }
}
