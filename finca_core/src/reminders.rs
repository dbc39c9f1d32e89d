//! Reminder window selection.
//!
//! Pure functions that, given "today" and a lookahead in days, pick out the
//! records whose deadline falls inside `[today, today + days]`. Nothing in
//! this module reads the clock or mutates state; composition happens in
//! [`build_reminder_report`].

use crate::store::InventoryStore;
use crate::types::*;
use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Default lookahead for expiries, maintenance and payments
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 7;
/// Default equipment issuance cycle
pub const DEFAULT_ISSUANCE_INTERVAL_MONTHS: u32 = 4;

fn in_window(date: NaiveDate, today: NaiveDate, days: i64) -> bool {
    date >= today && date <= today + Duration::days(days)
}

/// Resources whose expiry date falls in the window. Resources with no
/// expiry date never expire.
pub fn expiring_within(
    resources: &[ConsumableResource],
    today: NaiveDate,
    days: i64,
) -> Vec<ConsumableResource> {
    resources
        .iter()
        .filter(|r| matches!(r.expiry_date, Some(d) if in_window(d, today, days)))
        .cloned()
        .collect()
}

/// Vaccination records whose next dose falls in the window.
pub fn due_vaccinations_within(
    records: &[VaccinationRecord],
    today: NaiveDate,
    days: i64,
) -> Vec<VaccinationRecord> {
    records
        .iter()
        .filter(|r| matches!(r.next_dose_on, Some(d) if in_window(d, today, days)))
        .cloned()
        .collect()
}

/// Incomplete maintenance tasks scheduled inside the window.
pub fn due_maintenance_within(
    tasks: &[MaintenanceTask],
    today: NaiveDate,
    days: i64,
) -> Vec<MaintenanceTask> {
    tasks
        .iter()
        .filter(|t| !t.completed && in_window(t.scheduled_on, today, days))
        .cloned()
        .collect()
}

/// A worker whose next equipment issuance is due
#[derive(Clone, Debug, Serialize)]
pub struct IssuanceDue {
    pub worker_id: Uuid,
    pub worker_name: String,
    pub due_on: NaiveDate,
}

/// Workers whose derived next issuance date (`latest issuance + interval`)
/// is due by the end of the window.
///
/// Workers with no issuance history are excluded: there is no synthetic
/// "day zero". An issuance that is already overdue stays reportable until a
/// new one is recorded, which is why the lower bound of the window does not
/// apply here.
pub fn due_issuance_within(
    workers: &HashMap<Uuid, Worker>,
    issuances: &[EquipmentIssuance],
    today: NaiveDate,
    days: i64,
    interval_months: u32,
) -> Vec<IssuanceDue> {
    let mut latest: HashMap<Uuid, NaiveDate> = HashMap::new();
    for issuance in issuances {
        latest
            .entry(issuance.worker_id)
            .and_modify(|d| {
                if issuance.issued_on > *d {
                    *d = issuance.issued_on;
                }
            })
            .or_insert(issuance.issued_on);
    }

    let limit = today + Duration::days(days);
    let mut due = Vec::new();
    for (worker_id, last_issued) in latest {
        let Some(worker) = workers.get(&worker_id) else {
            tracing::warn!("Issuance references unknown worker {}", worker_id);
            continue;
        };
        let Some(due_on) = last_issued.checked_add_months(Months::new(interval_months)) else {
            continue;
        };
        if due_on <= limit {
            due.push(IssuanceDue {
                worker_id,
                worker_name: worker.name.clone(),
                due_on,
            });
        }
    }
    due
}

/// Unpaid payments whose due date falls in the window.
pub fn due_payments_within(
    payments: &[PaymentObligation],
    today: NaiveDate,
    days: i64,
) -> Vec<PaymentObligation> {
    payments
        .iter()
        .filter(|p| !p.paid && in_window(p.due_on, today, days))
        .cloned()
        .collect()
}

/// The composed reminder report handed to the consumer (e.g. a mailer).
/// Formatting and delivery are the consumer's concern.
#[derive(Clone, Debug, Serialize)]
pub struct ReminderReport {
    pub today: NaiveDate,
    pub lookahead_days: i64,
    pub expiring: Vec<ConsumableResource>,
    pub due_vaccinations: Vec<VaccinationRecord>,
    pub due_maintenance: Vec<MaintenanceTask>,
    pub due_issuance: Vec<IssuanceDue>,
    pub due_payments: Vec<PaymentObligation>,
}

impl ReminderReport {
    /// "Nothing due" only when every section is empty.
    pub fn is_empty(&self) -> bool {
        self.expiring.is_empty()
            && self.due_vaccinations.is_empty()
            && self.due_maintenance.is_empty()
            && self.due_issuance.is_empty()
            && self.due_payments.is_empty()
    }
}

/// Compose all five selections over the store. Sections are sorted by their
/// deadline so the output is stable.
pub fn build_reminder_report(
    store: &InventoryStore,
    today: NaiveDate,
    days: i64,
    issuance_interval_months: u32,
) -> ReminderReport {
    let resources: Vec<_> = store.resources.values().cloned().collect();

    let mut expiring = expiring_within(&resources, today, days);
    expiring.sort_by_key(|r| (r.expiry_date, r.name.clone()));

    let mut due_vaccinations = due_vaccinations_within(&store.vaccinations, today, days);
    due_vaccinations.sort_by_key(|r| r.next_dose_on);

    let mut due_maintenance = due_maintenance_within(&store.maintenance, today, days);
    due_maintenance.sort_by_key(|t| t.scheduled_on);

    let mut due_issuance = due_issuance_within(
        &store.workers,
        &store.issuances,
        today,
        days,
        issuance_interval_months,
    );
    due_issuance.sort_by_key(|d| (d.due_on, d.worker_name.clone()));

    let mut due_payments = due_payments_within(&store.payments, today, days);
    due_payments.sort_by_key(|p| p.due_on);

    let report = ReminderReport {
        today,
        lookahead_days: days,
        expiring,
        due_vaccinations,
        due_maintenance,
        due_issuance,
        due_payments,
    };

    tracing::info!(
        "Reminder report for {} (+{}d): {} expiring, {} vaccinations, {} maintenance, {} issuances, {} payments",
        today,
        days,
        report.expiring.len(),
        report.due_vaccinations.len(),
        report.due_maintenance.len(),
        report.due_issuance.len(),
        report.due_payments.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resource_expiring(name: &str, expiry: Option<NaiveDate>) -> ConsumableResource {
        let mut r = ConsumableResource::new(
            name,
            ResourceKind::Medicine,
            Unit::Milliliter,
            Decimal::from(10),
        )
        .unwrap();
        r.expiry_date = expiry;
        r
    }

    fn vaccination(next_dose: Option<NaiveDate>) -> VaccinationRecord {
        VaccinationRecord {
            id: Uuid::new_v4(),
            animal_id: Uuid::new_v4(),
            vaccine_id: Uuid::new_v4(),
            applied_on: date(2024, 12, 1),
            next_dose_on: next_dose,
            notes: None,
        }
    }

    #[test]
    fn test_expiry_window_is_inclusive() {
        let today = date(2025, 1, 1);
        let resources = vec![
            resource_expiring("on_today", Some(date(2025, 1, 1))),
            resource_expiring("on_limit", Some(date(2025, 1, 8))),
            resource_expiring("past", Some(date(2024, 12, 31))),
            resource_expiring("beyond", Some(date(2025, 1, 9))),
            resource_expiring("never", None),
        ];

        let hits = expiring_within(&resources, today, 7);
        let names: Vec<_> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["on_today", "on_limit"]);
    }

    #[test]
    fn test_vaccination_window() {
        let today = date(2025, 1, 1);
        let records = vec![
            vaccination(Some(date(2025, 1, 5))),
            vaccination(Some(date(2025, 1, 9))),
            vaccination(None),
        ];

        let due = due_vaccinations_within(&records, today, 7);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].next_dose_on, Some(date(2025, 1, 5)));
    }

    #[test]
    fn test_completed_maintenance_is_excluded() {
        let today = date(2025, 1, 1);
        let tasks = vec![
            MaintenanceTask {
                id: Uuid::new_v4(),
                equipment: "Tractor".into(),
                description: "oil change".into(),
                scheduled_on: date(2025, 1, 3),
                completed: false,
            },
            MaintenanceTask {
                id: Uuid::new_v4(),
                equipment: "Mower".into(),
                description: "blade".into(),
                scheduled_on: date(2025, 1, 3),
                completed: true,
            },
        ];

        let due = due_maintenance_within(&tasks, today, 7);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].equipment, "Tractor");
    }

    #[test]
    fn test_issuance_four_month_cycle() {
        let worker = Worker::new("Ana");
        let worker_id = worker.id;
        let mut workers = HashMap::new();
        workers.insert(worker_id, worker);

        let issuances = vec![EquipmentIssuance {
            id: Uuid::new_v4(),
            worker_id,
            issued_on: date(2025, 1, 1),
            notes: None,
        }];

        // next_due = 2025-05-01; slightly overdue workers stay reportable
        let due = due_issuance_within(&workers, &issuances, date(2025, 5, 2), 7, 4);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].due_on, date(2025, 5, 1));

        // A month early: nothing due yet
        let due = due_issuance_within(&workers, &issuances, date(2025, 4, 1), 7, 4);
        assert!(due.is_empty());
    }

    #[test]
    fn test_issuance_uses_latest_entry_per_worker() {
        let worker = Worker::new("Luis");
        let worker_id = worker.id;
        let mut workers = HashMap::new();
        workers.insert(worker_id, worker);

        let issuances = vec![
            EquipmentIssuance {
                id: Uuid::new_v4(),
                worker_id,
                issued_on: date(2025, 1, 1),
                notes: None,
            },
            EquipmentIssuance {
                id: Uuid::new_v4(),
                worker_id,
                issued_on: date(2025, 4, 15),
                notes: None,
            },
        ];

        // Due from the January issuance alone, but the April one supersedes it
        let due = due_issuance_within(&workers, &issuances, date(2025, 5, 2), 7, 4);
        assert!(due.is_empty());
    }

    #[test]
    fn test_worker_without_issuance_history_is_excluded() {
        let worker = Worker::new("Marta");
        let mut workers = HashMap::new();
        workers.insert(worker.id, worker);

        let due = due_issuance_within(&workers, &[], date(2025, 5, 2), 7, 4);
        assert!(due.is_empty());
    }

    #[test]
    fn test_paid_payments_are_excluded() {
        let today = date(2025, 1, 1);
        let payments = vec![
            PaymentObligation {
                id: Uuid::new_v4(),
                worker_id: None,
                amount: Decimal::from(500),
                due_on: date(2025, 1, 4),
                paid: false,
            },
            PaymentObligation {
                id: Uuid::new_v4(),
                worker_id: None,
                amount: Decimal::from(500),
                due_on: date(2025, 1, 4),
                paid: true,
            },
        ];

        let due = due_payments_within(&payments, today, 7);
        assert_eq!(due.len(), 1);
        assert!(!due[0].paid);
    }

    #[test]
    fn test_report_empty_only_when_all_sections_empty() {
        let mut store = InventoryStore::default();
        let today = date(2025, 1, 1);

        let report = build_reminder_report(&store, today, 7, 4);
        assert!(report.is_empty());

        // One expiring resource is enough to make the report non-empty
        let r = resource_expiring("Vacuna Aftosa", Some(date(2025, 1, 2)));
        store.resources.insert(r.id, r);
        let report = build_reminder_report(&store, today, 7, 4);
        assert!(!report.is_empty());
        assert_eq!(report.expiring.len(), 1);
    }

    #[test]
    fn test_report_sections_are_sorted_by_deadline() {
        let mut store = InventoryStore::default();
        let later = resource_expiring("B", Some(date(2025, 1, 6)));
        let sooner = resource_expiring("A", Some(date(2025, 1, 2)));
        store.resources.insert(later.id, later);
        store.resources.insert(sooner.id, sooner);

        let report = build_reminder_report(&store, date(2025, 1, 1), 7, 4);
        assert_eq!(report.expiring[0].name, "A");
        assert_eq!(report.expiring[1].name, "B");
    }
}
