//! Core domain types for the farm inventory system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Consumable resources and their units
//! - Livestock individuals and their status
//! - Treatment records (vaccinations, medications)
//! - Workers, equipment issuances, maintenance tasks and payments

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Resource Types
// ============================================================================

/// Kind of consumable resource tracked by the stock ledger
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Feed,
    Medicine,
    Pesticide,
    Fuel,
    Vaccine,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Feed => "feed",
            ResourceKind::Medicine => "medicine",
            ResourceKind::Pesticide => "pesticide",
            ResourceKind::Fuel => "fuel",
            ResourceKind::Vaccine => "vaccine",
        };
        f.write_str(s)
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feed" => Ok(ResourceKind::Feed),
            "medicine" => Ok(ResourceKind::Medicine),
            "pesticide" => Ok(ResourceKind::Pesticide),
            "fuel" => Ok(ResourceKind::Fuel),
            "vaccine" => Ok(ResourceKind::Vaccine),
            other => Err(format!("unknown resource kind '{}'", other)),
        }
    }
}

/// Unit of measure for a resource quantity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Unit,
    Kilogram,
    Gram,
    Liter,
    Milliliter,
    Gallon,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Unit => "unit",
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Liter => "L",
            Unit::Milliliter => "mL",
            Unit::Gallon => "gallon",
        };
        f.write_str(s)
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unit" | "units" => Ok(Unit::Unit),
            "kg" | "kilogram" => Ok(Unit::Kilogram),
            "g" | "gram" => Ok(Unit::Gram),
            "l" | "liter" | "litre" => Ok(Unit::Liter),
            "ml" | "milliliter" => Ok(Unit::Milliliter),
            "gallon" | "gallons" | "gal" => Ok(Unit::Gallon),
            other => Err(format!("unknown unit '{}'", other)),
        }
    }
}

/// One stock-keeping unit of a consumable resource.
///
/// The ledger tracks two running totals: `ingested` (everything ever added)
/// and `used` (everything ever consumed). The remaining stock is always
/// derived from the two, never stored. Invariant: `0 <= used <= ingested`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsumableResource {
    pub id: Uuid,
    pub name: String,
    pub kind: ResourceKind,
    pub unit: Unit,
    pub ingested: Decimal,
    pub used: Decimal,
    pub unit_price: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub supplier_ids: Vec<Uuid>,
    #[serde(default)]
    pub location_ids: Vec<Uuid>,
    pub description: Option<String>,
}

impl ConsumableResource {
    /// Create a new resource with an initial batch. `used` starts at zero,
    /// so the initial batch must not be negative or the resource would be
    /// born with more used than ingested.
    pub fn new(
        name: impl Into<String>,
        kind: ResourceKind,
        unit: Unit,
        initial: Decimal,
    ) -> crate::Result<Self> {
        if initial < Decimal::ZERO {
            return Err(crate::Error::InvalidQuantity(format!(
                "initial batch must not be negative, got {}",
                initial
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            unit,
            ingested: initial,
            used: Decimal::ZERO,
            unit_price: None,
            expiry_date: None,
            purchase_date: None,
            supplier_ids: vec![],
            location_ids: vec![],
            description: None,
        })
    }

    /// Remaining stock, derived from the two running totals.
    pub fn remaining(&self) -> Decimal {
        self.ingested - self.used
    }
}

// ============================================================================
// Livestock Types
// ============================================================================

/// Lifecycle status of a tracked animal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    Alive,
    Sold,
    Deceased,
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnimalStatus::Alive => "alive",
            AnimalStatus::Sold => "sold",
            AnimalStatus::Deceased => "deceased",
        };
        f.write_str(s)
    }
}

impl FromStr for AnimalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alive" => Ok(AnimalStatus::Alive),
            "sold" => Ok(AnimalStatus::Sold),
            "deceased" => Ok(AnimalStatus::Deceased),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("unknown sex '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Juvenile,
    Adult,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Sick,
    InTreatment,
    Quarantined,
}

/// Breeding marker for an animal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BreedingMethod {
    Natural,
    ArtificialInsemination,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BreedingInfo {
    pub method: BreedingMethod,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Conditional field group populated only while the animal is `Sold`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaleDetails {
    pub sale_date: NaiveDate,
    pub sale_value: Decimal,
    pub reason: String,
    pub buyer_name: String,
    pub buyer_phone: String,
}

/// Conditional field group populated only while the animal is `Deceased`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeathDetails {
    pub death_date: NaiveDate,
    pub reason: String,
}

/// One tracked livestock individual
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Animal {
    pub id: Uuid,
    /// External identifier, e.g. ear tag number
    pub tag: String,
    pub animal_type: String,
    pub breed: String,
    pub sex: Sex,
    pub weight_kg: Option<Decimal>,
    pub growth_stage: GrowthStage,
    pub birth_date: Option<NaiveDate>,
    pub status: AnimalStatus,
    pub health: HealthStatus,
    pub breeding: Option<BreedingInfo>,
    pub description: Option<String>,
    pub sale: Option<SaleDetails>,
    pub death: Option<DeathDetails>,
}

impl Animal {
    /// Register a new animal, initially alive with no conditional groups.
    pub fn new(
        tag: impl Into<String>,
        animal_type: impl Into<String>,
        breed: impl Into<String>,
        sex: Sex,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: tag.into(),
            animal_type: animal_type.into(),
            breed: breed.into(),
            sex,
            weight_kg: None,
            growth_stage: GrowthStage::Adult,
            birth_date: None,
            status: AnimalStatus::Alive,
            health: HealthStatus::Healthy,
            breeding: None,
            description: None,
            sale: None,
            death: None,
        }
    }
}

/// Derived age of an animal. `Unknown` when the birth date is absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Age {
    Known { years: u32, months: u32 },
    Unknown,
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Known { years, months } => write!(f, "{}y {}m", years, months),
            Age::Unknown => f.write_str("unknown"),
        }
    }
}

// ============================================================================
// Treatment Records
// ============================================================================

/// Append-only record of a vaccine dose applied to an animal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub id: Uuid,
    pub animal_id: Uuid,
    /// Vaccine stock record the dose came from
    pub vaccine_id: Uuid,
    pub applied_on: NaiveDate,
    pub next_dose_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Append-only record of a medicine application
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub medicine_id: Uuid,
    pub applied_on: NaiveDate,
    pub notes: Option<String>,
}

// ============================================================================
// Workers, Maintenance and Payments
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

impl Worker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
        }
    }
}

/// One equipment issuance event for a worker.
///
/// The next due date is never stored; it is derived as the latest issuance
/// date plus the configured interval (four months by default).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EquipmentIssuance {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub issued_on: NaiveDate,
    pub notes: Option<String>,
}

/// A scheduled maintenance task for a piece of equipment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub id: Uuid,
    pub equipment: String,
    pub description: String,
    pub scheduled_on: NaiveDate,
    pub completed: bool,
}

/// A scheduled wage payment with a realized flag
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentObligation {
    pub id: Uuid,
    pub worker_id: Option<Uuid>,
    pub amount: Decimal,
    pub due_on: NaiveDate,
    pub paid: bool,
}
