//! Livestock lifecycle state machine and treatment history.
//!
//! An animal is `Alive`, `Sold` or `Deceased`. Each terminal state carries a
//! conditional field group that is mandatory on entry and cleared whenever
//! the status is anything else. Treatment records are independent
//! bookkeeping: recording a dose does not consume vaccine stock, and
//! deleting a record does not restore any.

use crate::store::InventoryStore;
use crate::types::*;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Candidate data for a status transition. Which fields are required
/// depends on the target status; the rest are ignored.
#[derive(Clone, Debug, Default)]
pub struct TransitionPayload {
    pub sale_date: Option<NaiveDate>,
    pub sale_value: Option<Decimal>,
    pub sale_reason: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub death_date: Option<NaiveDate>,
    pub death_reason: Option<String>,
}

impl TransitionPayload {
    fn into_sale(self) -> Result<SaleDetails> {
        Ok(SaleDetails {
            sale_date: self.sale_date.ok_or(Error::MissingRequiredField("sale_date"))?,
            sale_value: self.sale_value.ok_or(Error::MissingRequiredField("sale_value"))?,
            reason: self.sale_reason.ok_or(Error::MissingRequiredField("sale_reason"))?,
            buyer_name: self.buyer_name.ok_or(Error::MissingRequiredField("buyer_name"))?,
            buyer_phone: self
                .buyer_phone
                .ok_or(Error::MissingRequiredField("buyer_phone"))?,
        })
    }

    fn into_death(self) -> Result<DeathDetails> {
        Ok(DeathDetails {
            death_date: self
                .death_date
                .ok_or(Error::MissingRequiredField("death_date"))?,
            reason: self
                .death_reason
                .ok_or(Error::MissingRequiredField("death_reason"))?,
        })
    }
}

/// Register a new animal in the herd.
///
/// The external tag is a unique identifier; registration fails if another
/// animal already carries it (tags compare case-insensitively).
pub fn register_animal(store: &mut InventoryStore, animal: Animal) -> Result<Uuid> {
    if store.animal_by_tag(&animal.tag).is_ok() {
        return Err(Error::AlreadyExists(format!("animal tag '{}'", animal.tag)));
    }

    let animal_id = animal.id;
    tracing::info!("Registered animal '{}'", animal.tag);
    store.animals.insert(animal_id, animal);
    Ok(animal_id)
}

/// Move an animal to a new status.
///
/// The target status' conditional group must be complete; every other group
/// is cleared. `Alive` clears both groups and is the correction path for an
/// erroneous prior transition. Any status is currently reachable from any
/// other. The payload is validated in full before the animal is touched, so
/// a failed call changes nothing.
pub fn transition(
    store: &mut InventoryStore,
    animal_id: Uuid,
    new_status: AnimalStatus,
    payload: TransitionPayload,
) -> Result<AnimalStatus> {
    // Validate up front; the animal must exist even for a no-op payload.
    store.animal(animal_id)?;

    let (sale, death) = match new_status {
        AnimalStatus::Sold => (Some(payload.into_sale()?), None),
        AnimalStatus::Deceased => (None, Some(payload.into_death()?)),
        AnimalStatus::Alive => (None, None),
    };

    let animal = store.animal_mut(animal_id)?;
    let old_status = animal.status;
    animal.status = new_status;
    animal.sale = sale;
    animal.death = death;

    tracing::info!(
        "Animal '{}' transitioned {} -> {}",
        animal.tag,
        old_status,
        new_status
    );
    Ok(new_status)
}

/// Append a vaccination record for an animal.
///
/// Does not consume vaccine stock; callers that want the dose reflected in
/// the ledger call `consume` separately.
pub fn record_vaccination(
    store: &mut InventoryStore,
    animal_id: Uuid,
    vaccine_id: Uuid,
    applied_on: NaiveDate,
    next_dose_on: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<Uuid> {
    store.animal(animal_id)?;
    store.resource(vaccine_id)?;

    let record = VaccinationRecord {
        id: Uuid::new_v4(),
        animal_id,
        vaccine_id,
        applied_on,
        next_dose_on,
        notes,
    };
    let record_id = record.id;
    store.vaccinations.push(record);

    tracing::info!("Recorded vaccination {} for animal {}", record_id, animal_id);
    Ok(record_id)
}

/// Append a medication record for an animal. Independent of the ledger,
/// like `record_vaccination`.
pub fn record_medication(
    store: &mut InventoryStore,
    animal_id: Uuid,
    medicine_id: Uuid,
    applied_on: NaiveDate,
    notes: Option<String>,
) -> Result<Uuid> {
    store.animal(animal_id)?;
    store.resource(medicine_id)?;

    let record = MedicationRecord {
        id: Uuid::new_v4(),
        animal_id,
        medicine_id,
        applied_on,
        notes,
    };
    let record_id = record.id;
    store.medications.push(record);

    tracing::info!("Recorded medication {} for animal {}", record_id, animal_id);
    Ok(record_id)
}

/// Operator correction of a vaccination record's date or notes.
pub fn correct_vaccination(
    store: &mut InventoryStore,
    record_id: Uuid,
    applied_on: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<()> {
    let record = store
        .vaccinations
        .iter_mut()
        .find(|r| r.id == record_id)
        .ok_or_else(|| Error::NotFound(format!("vaccination record {}", record_id)))?;

    if let Some(date) = applied_on {
        record.applied_on = date;
    }
    if let Some(notes) = notes {
        record.notes = Some(notes);
    }
    Ok(())
}

/// Operator correction of a medication record's date or notes.
pub fn correct_medication(
    store: &mut InventoryStore,
    record_id: Uuid,
    applied_on: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<()> {
    let record = store
        .medications
        .iter_mut()
        .find(|r| r.id == record_id)
        .ok_or_else(|| Error::NotFound(format!("medication record {}", record_id)))?;

    if let Some(date) = applied_on {
        record.applied_on = date;
    }
    if let Some(notes) = notes {
        record.notes = Some(notes);
    }
    Ok(())
}

/// Delete a vaccination record. Consumed stock is not restored; the ledger
/// and the treatment history are independent by design.
pub fn remove_vaccination(store: &mut InventoryStore, record_id: Uuid) -> Result<()> {
    let before = store.vaccinations.len();
    store.vaccinations.retain(|r| r.id != record_id);
    if store.vaccinations.len() == before {
        return Err(Error::NotFound(format!("vaccination record {}", record_id)));
    }
    tracing::info!("Removed vaccination record {}", record_id);
    Ok(())
}

/// Delete a medication record. Same independence from the ledger.
pub fn remove_medication(store: &mut InventoryStore, record_id: Uuid) -> Result<()> {
    let before = store.medications.len();
    store.medications.retain(|r| r.id != record_id);
    if store.medications.len() == before {
        return Err(Error::NotFound(format!("medication record {}", record_id)));
    }
    tracing::info!("Removed medication record {}", record_id);
    Ok(())
}

/// Derived age of an animal on a given day. Never fails on a missing birth
/// date; that is the `Age::Unknown` sentinel.
pub fn age(store: &InventoryStore, animal_id: Uuid, today: NaiveDate) -> Result<Age> {
    let animal = store.animal(animal_id)?;
    Ok(match animal.birth_date {
        Some(birth) => {
            let (years, months) = calendar_age(birth, today);
            Age::Known { years, months }
        }
        None => Age::Unknown,
    })
}

/// Whole (years, months) elapsed from `birth` to `today`, day-adjusted.
/// Saturates at zero when the birth date lies in the future.
fn calendar_age(birth: NaiveDate, today: NaiveDate) -> (u32, u32) {
    if today < birth {
        return (0, 0);
    }

    let mut years = today.year() - birth.year();
    let mut months = today.month() as i32 - birth.month() as i32;
    if today.day() < birth.day() {
        months -= 1;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    (years as u32, months as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConsumableResource, ResourceKind, Unit};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (InventoryStore, Uuid, Uuid) {
        let mut store = InventoryStore::default();
        let a = Animal::new("MAT-001", "cattle", "Brahman", Sex::Female);
        let animal_id = a.id;
        store.animals.insert(a.id, a);

        let v = ConsumableResource::new(
            "Aftosa",
            ResourceKind::Vaccine,
            Unit::Milliliter,
            Decimal::from(200),
        )
        .unwrap();
        let vaccine_id = v.id;
        store.resources.insert(v.id, v);

        (store, animal_id, vaccine_id)
    }

    fn full_sale_payload() -> TransitionPayload {
        TransitionPayload {
            sale_date: Some(date(2025, 3, 10)),
            sale_value: Some(Decimal::from(1500)),
            sale_reason: Some("auction".into()),
            buyer_name: Some("Carlos".into()),
            buyer_phone: Some("555-0101".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let (mut store, _, _) = setup();

        // setup() registered MAT-001; tags compare case-insensitively
        let dup = Animal::new("mat-001", "cattle", "Gyr", Sex::Male);
        let result = register_animal(&mut store, dup);
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
        assert_eq!(store.animals.len(), 1);

        let other = Animal::new("MAT-002", "cattle", "Gyr", Sex::Male);
        register_animal(&mut store, other).unwrap();
        assert_eq!(store.animals.len(), 2);
    }

    #[test]
    fn test_sold_without_value_fails() {
        let (mut store, animal_id, _) = setup();

        let mut payload = full_sale_payload();
        payload.sale_value = None;

        let result = transition(&mut store, animal_id, AnimalStatus::Sold, payload);
        assert!(matches!(
            result,
            Err(Error::MissingRequiredField("sale_value"))
        ));
        // Nothing changed
        let animal = store.animal(animal_id).unwrap();
        assert_eq!(animal.status, AnimalStatus::Alive);
        assert!(animal.sale.is_none());
    }

    #[test]
    fn test_deceased_requires_date_and_reason() {
        let (mut store, animal_id, _) = setup();

        let payload = TransitionPayload {
            death_date: Some(date(2025, 2, 1)),
            ..Default::default()
        };
        let result = transition(&mut store, animal_id, AnimalStatus::Deceased, payload);
        assert!(matches!(
            result,
            Err(Error::MissingRequiredField("death_reason"))
        ));
    }

    #[test]
    fn test_sold_clears_prior_deceased_fields() {
        let (mut store, animal_id, _) = setup();

        let death_payload = TransitionPayload {
            death_date: Some(date(2025, 2, 1)),
            death_reason: Some("mistaken entry".into()),
            ..Default::default()
        };
        transition(&mut store, animal_id, AnimalStatus::Deceased, death_payload).unwrap();
        assert!(store.animal(animal_id).unwrap().death.is_some());

        transition(&mut store, animal_id, AnimalStatus::Sold, full_sale_payload()).unwrap();
        let animal = store.animal(animal_id).unwrap();
        assert_eq!(animal.status, AnimalStatus::Sold);
        assert!(animal.death.is_none());
        assert!(animal.sale.is_some());
        assert_eq!(animal.sale.as_ref().unwrap().buyer_name, "Carlos");
    }

    #[test]
    fn test_alive_clears_all_groups() {
        let (mut store, animal_id, _) = setup();

        transition(&mut store, animal_id, AnimalStatus::Sold, full_sale_payload()).unwrap();
        transition(
            &mut store,
            animal_id,
            AnimalStatus::Alive,
            TransitionPayload::default(),
        )
        .unwrap();

        let animal = store.animal(animal_id).unwrap();
        assert_eq!(animal.status, AnimalStatus::Alive);
        assert!(animal.sale.is_none());
        assert!(animal.death.is_none());
    }

    #[test]
    fn test_unknown_animal_is_not_found() {
        let (mut store, _, _) = setup();

        let result = transition(
            &mut store,
            Uuid::new_v4(),
            AnimalStatus::Alive,
            TransitionPayload::default(),
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_record_vaccination_does_not_touch_stock() {
        let (mut store, animal_id, vaccine_id) = setup();

        let record_id = record_vaccination(
            &mut store,
            animal_id,
            vaccine_id,
            date(2025, 1, 10),
            Some(date(2025, 7, 10)),
            None,
        )
        .unwrap();

        assert_eq!(store.vaccinations.len(), 1);
        assert_eq!(store.vaccinations[0].id, record_id);
        // Independent bookkeeping: the vaccine totals are untouched
        let vaccine = store.resource(vaccine_id).unwrap();
        assert_eq!(vaccine.used, Decimal::ZERO);
        assert_eq!(vaccine.ingested, Decimal::from(200));
    }

    #[test]
    fn test_record_vaccination_unknown_resource_fails() {
        let (mut store, animal_id, _) = setup();

        let result = record_vaccination(
            &mut store,
            animal_id,
            Uuid::new_v4(),
            date(2025, 1, 10),
            None,
            None,
        );
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(store.vaccinations.is_empty());
    }

    #[test]
    fn test_remove_treatment_does_not_restore_stock() {
        let (mut store, animal_id, vaccine_id) = setup();

        // Simulate a dose that was also consumed from the ledger
        store.resource_mut(vaccine_id).unwrap().used = Decimal::from(5);
        let record_id = record_vaccination(
            &mut store,
            animal_id,
            vaccine_id,
            date(2025, 1, 10),
            None,
            None,
        )
        .unwrap();

        remove_vaccination(&mut store, record_id).unwrap();
        assert!(store.vaccinations.is_empty());
        // Deleting the record leaves the ledger unreconciled, by design
        assert_eq!(store.resource(vaccine_id).unwrap().used, Decimal::from(5));
    }

    #[test]
    fn test_correct_vaccination_edits_date_and_notes() {
        let (mut store, animal_id, vaccine_id) = setup();

        let record_id = record_vaccination(
            &mut store,
            animal_id,
            vaccine_id,
            date(2025, 1, 10),
            None,
            None,
        )
        .unwrap();

        correct_vaccination(
            &mut store,
            record_id,
            Some(date(2025, 1, 12)),
            Some("left flank".into()),
        )
        .unwrap();

        let record = &store.vaccinations[0];
        assert_eq!(record.applied_on, date(2025, 1, 12));
        assert_eq!(record.notes.as_deref(), Some("left flank"));
    }

    #[test]
    fn test_record_medication_and_remove() {
        let (mut store, animal_id, _) = setup();
        let m = ConsumableResource::new(
            "Oxitetraciclina",
            ResourceKind::Medicine,
            Unit::Milliliter,
            Decimal::from(100),
        )
        .unwrap();
        let medicine_id = m.id;
        store.resources.insert(m.id, m);

        let record_id =
            record_medication(&mut store, animal_id, medicine_id, date(2025, 4, 2), None).unwrap();
        assert_eq!(store.medications.len(), 1);

        remove_medication(&mut store, record_id).unwrap();
        assert!(store.medications.is_empty());
        assert!(matches!(
            remove_medication(&mut store, record_id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_age_unknown_without_birth_date() {
        let (store, animal_id, _) = setup();
        let result = age(&store, animal_id, date(2025, 6, 1)).unwrap();
        assert_eq!(result, Age::Unknown);
    }

    #[test]
    fn test_age_known_with_birth_date() {
        let (mut store, animal_id, _) = setup();
        store.animal_mut(animal_id).unwrap().birth_date = Some(date(2023, 3, 15));

        let result = age(&store, animal_id, date(2025, 6, 1)).unwrap();
        assert_eq!(result, Age::Known { years: 2, months: 2 });
    }

    #[test]
    fn test_calendar_age_day_adjustment() {
        // One day short of the month boundary
        assert_eq!(calendar_age(date(2024, 1, 15), date(2025, 1, 14)), (0, 11));
        assert_eq!(calendar_age(date(2024, 1, 15), date(2025, 1, 15)), (1, 0));
        // Future birth date saturates
        assert_eq!(calendar_age(date(2026, 1, 1), date(2025, 1, 1)), (0, 0));
    }
}
