use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::catalog::{LabService, Offering, ServiceId};
use super::inventory::InventoryItem;
use super::orders::Order;
use super::patients::{Patient, PatientId};
use super::repository::{
    CatalogRepository, InventoryRepository, MediaStore, OrderRepository, PatientRepository,
    RepositoryError, ResultRepository, UpsertOutcome,
};
use super::results::{AudioClip, LabResult, ResultId};
use super::seed;

#[derive(Debug, Default)]
struct LabState {
    services: HashMap<ServiceId, LabService>,
    offerings: Vec<Offering>,
    orders: Vec<Order>,
    results: HashMap<ResultId, LabResult>,
    audio: HashMap<String, AudioClip>,
    patients: HashMap<PatientId, Patient>,
    inventory: Vec<InventoryItem>,
}

/// Process-local store backing every repository seam. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLabStore {
    state: Arc<Mutex<LabState>>,
}

impl InMemoryLabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the sample catalog, orders, results, patients,
    /// and stock levels.
    pub fn seeded() -> Self {
        let state = LabState {
            services: seed::services()
                .into_iter()
                .map(|service| (service.id.clone(), service))
                .collect(),
            offerings: Vec::new(),
            orders: seed::orders(),
            results: seed::results()
                .into_iter()
                .map(|result| (result.id.clone(), result))
                .collect(),
            audio: HashMap::new(),
            patients: seed::patients()
                .into_iter()
                .map(|patient| (patient.id.clone(), patient))
                .collect(),
            inventory: seed::inventory(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_inventory(self, items: Vec<InventoryItem>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.inventory = items;
        }
        self
    }

    fn state(&self) -> Result<MutexGuard<'_, LabState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lab store mutex poisoned".to_string()))
    }
}

impl CatalogRepository for InMemoryLabStore {
    fn insert_service(&self, service: LabService) -> Result<LabService, RepositoryError> {
        let mut state = self.state()?;
        let taken = state
            .services
            .values()
            .any(|existing| existing.code == service.code);
        if taken || state.services.contains_key(&service.id) {
            return Err(RepositoryError::Conflict);
        }
        state.services.insert(service.id.clone(), service.clone());
        Ok(service)
    }

    fn service_by_code(&self, code: &str) -> Result<Option<LabService>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .services
            .values()
            .find(|service| service.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    fn service_by_id(&self, id: &ServiceId) -> Result<Option<LabService>, RepositoryError> {
        Ok(self.state()?.services.get(id).cloned())
    }

    fn services(&self) -> Result<Vec<LabService>, RepositoryError> {
        Ok(self.state()?.services.values().cloned().collect())
    }

    fn insert_offering(&self, offering: Offering) -> Result<Offering, RepositoryError> {
        let mut state = self.state()?;
        if state.offerings.iter().any(|existing| existing.id == offering.id) {
            return Err(RepositoryError::Conflict);
        }
        state.offerings.push(offering.clone());
        Ok(offering)
    }

    fn offerings_for(&self, service_id: &ServiceId) -> Result<Vec<Offering>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .offerings
            .iter()
            .filter(|offering| &offering.service_id == service_id)
            .cloned()
            .collect())
    }
}

impl OrderRepository for InMemoryLabStore {
    fn orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.state()?.orders.clone())
    }

    fn order_by_number(&self, order_number: &str) -> Result<Option<Order>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .orders
            .iter()
            .find(|order| order.order_number.eq_ignore_ascii_case(order_number))
            .cloned())
    }
}

impl ResultRepository for InMemoryLabStore {
    fn results(&self) -> Result<Vec<LabResult>, RepositoryError> {
        Ok(self.state()?.results.values().cloned().collect())
    }

    fn fetch(&self, id: &ResultId) -> Result<Option<LabResult>, RepositoryError> {
        Ok(self.state()?.results.get(id).cloned())
    }

    fn modify<T, E, F>(&self, id: &ResultId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut LabResult) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut state = self.state()?;
        let Some(slot) = state.results.get_mut(id) else {
            return Ok(None);
        };

        let mut draft = slot.clone();
        let value = change(&mut draft)?;
        *slot = draft;
        Ok(Some(value))
    }

    fn result_by_share_uuid(&self, share_uuid: &str) -> Result<Option<LabResult>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .results
            .values()
            .find(|result| result.share_uuid.as_deref() == Some(share_uuid))
            .cloned())
    }
}

impl MediaStore for InMemoryLabStore {
    fn put_audio(&self, clip: AudioClip) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        if state.audio.contains_key(&clip.key) {
            return Err(RepositoryError::Conflict);
        }
        state.audio.insert(clip.key.clone(), clip);
        Ok(())
    }

    fn audio(&self, key: &str) -> Result<Option<AudioClip>, RepositoryError> {
        Ok(self.state()?.audio.get(key).cloned())
    }

    fn remove_audio(&self, key: &str) -> Result<(), RepositoryError> {
        self.state()?.audio.remove(key);
        Ok(())
    }
}

impl PatientRepository for InMemoryLabStore {
    fn upsert(&self, mut patient: Patient) -> Result<UpsertOutcome, RepositoryError> {
        let mut state = self.state()?;
        let existing = state
            .patients
            .values()
            .find(|stored| stored.document_id == patient.document_id)
            .map(|stored| stored.id.clone());

        match existing {
            Some(id) => {
                patient.id = id.clone();
                state.patients.insert(id, patient);
                Ok(UpsertOutcome::Updated)
            }
            None => {
                state.patients.insert(patient.id.clone(), patient);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    fn patient(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError> {
        Ok(self.state()?.patients.get(id).cloned())
    }

    fn patients(&self) -> Result<Vec<Patient>, RepositoryError> {
        Ok(self.state()?.patients.values().cloned().collect())
    }
}

impl InventoryRepository for InMemoryLabStore {
    fn items(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        Ok(self.state()?.inventory.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_keeps_the_stored_id() {
        let store = InMemoryLabStore::seeded();
        let outcome = store
            .upsert(Patient {
                id: PatientId("pat-new".to_string()),
                document_id: "1020304050".to_string(),
                full_name: "María José González".to_string(),
                email: None,
                phone: None,
            })
            .expect("upsert");

        assert_eq!(outcome, UpsertOutcome::Updated);
        let stored = store
            .patient(&PatientId("pat-001".to_string()))
            .expect("lookup")
            .expect("patient kept");
        assert_eq!(stored.full_name, "María José González");
        assert!(store
            .patient(&PatientId("pat-new".to_string()))
            .expect("lookup")
            .is_none());
    }

    #[test]
    fn duplicate_service_code_conflicts() {
        let store = InMemoryLabStore::seeded();
        let mut copy = store
            .service_by_code("lab-001")
            .expect("lookup")
            .expect("seeded service");
        copy.id = ServiceId("svc-copy".to_string());

        assert!(matches!(
            store.insert_service(copy),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn modify_skips_unknown_results() {
        let store = InMemoryLabStore::new();
        let outcome = store.modify(&ResultId("res-404".to_string()), |result| {
            result.result_data = Some("x".to_string());
            Ok::<_, RepositoryError>(())
        });
        assert!(matches!(outcome, Ok(None)));
    }

    #[test]
    fn failed_modify_leaves_the_result_untouched() {
        let store = InMemoryLabStore::seeded();
        let id = ResultId("res-002".to_string());
        let outcome = store.modify(&id, |result| {
            result.result_data = Some("parcial".to_string());
            Err::<(), _>(RepositoryError::Conflict)
        });
        assert!(matches!(outcome, Err(RepositoryError::Conflict)));

        let stored = store.fetch(&id).expect("lookup").expect("seeded");
        assert!(stored.result_data.is_none());
    }

    #[test]
    fn clones_share_state() {
        let store = InMemoryLabStore::new();
        let other = store.clone();
        other
            .put_audio(AudioClip {
                key: "k".to_string(),
                file_name: "nota.mp3".to_string(),
                content_type: "audio/mpeg".to_string(),
                bytes: vec![1, 2, 3],
            })
            .expect("stored");
        assert!(store.audio("k").expect("lookup").is_some());

        other.remove_audio("k").expect("removed");
        other.remove_audio("k").expect("missing key is fine");
        assert!(store.audio("k").expect("lookup").is_none());
    }
}
