//! Stock ledger operations over consumable resources.
//!
//! The ledger never decreases either running total: `add_stock` only grows
//! `ingested` and `consume` only grows `used`. Corrections are out of scope.
//! Every successful mutation is appended to the audit log as a
//! [`StockEvent`](crate::audit::StockEvent).

use crate::audit::{HistorySink, StockAction, StockEvent};
use crate::store::InventoryStore;
use crate::{Error, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Totals returned by a successful `add_stock`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddReceipt {
    pub new_ingested: Decimal,
    pub new_remaining: Decimal,
}

/// Totals returned by a successful `consume`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsumeReceipt {
    pub new_used: Decimal,
    pub new_remaining: Decimal,
}

/// Add a batch to a resource's ingested total.
///
/// Fails with `InvalidQuantity` for non-positive amounts and `NotFound` for
/// unknown ids; validation happens before any mutation.
pub fn add_stock(
    store: &mut InventoryStore,
    sink: &mut dyn HistorySink,
    actor: &str,
    resource_id: Uuid,
    amount: Decimal,
) -> Result<AddReceipt> {
    require_positive(amount)?;

    let resource = store.resource_mut(resource_id)?;
    resource.ingested += amount;

    let receipt = AddReceipt {
        new_ingested: resource.ingested,
        new_remaining: resource.remaining(),
    };

    let event = StockEvent {
        id: Uuid::new_v4(),
        resource_id,
        resource_name: resource.name.clone(),
        actor: actor.to_string(),
        recorded_at: Utc::now(),
        action: StockAction::Added,
        amount,
        ingested_after: resource.ingested,
        used_after: resource.used,
    };
    sink.append(&event)?;

    tracing::info!(
        "Added {} to '{}': ingested {}, remaining {}",
        amount,
        event.resource_name,
        receipt.new_ingested,
        receipt.new_remaining
    );
    Ok(receipt)
}

/// Consume from a resource's remaining stock.
///
/// Fails with `InvalidQuantity` for non-positive amounts,
/// `InsufficientStock` when the amount exceeds what remains, and `NotFound`
/// for unknown ids. A failed call leaves the totals unchanged.
pub fn consume(
    store: &mut InventoryStore,
    sink: &mut dyn HistorySink,
    actor: &str,
    resource_id: Uuid,
    amount: Decimal,
) -> Result<ConsumeReceipt> {
    require_positive(amount)?;

    let resource = store.resource_mut(resource_id)?;
    let remaining = resource.remaining();
    if amount > remaining {
        return Err(Error::InsufficientStock {
            requested: amount,
            remaining,
        });
    }

    resource.used += amount;

    let receipt = ConsumeReceipt {
        new_used: resource.used,
        new_remaining: resource.remaining(),
    };

    let event = StockEvent {
        id: Uuid::new_v4(),
        resource_id,
        resource_name: resource.name.clone(),
        actor: actor.to_string(),
        recorded_at: Utc::now(),
        action: StockAction::Consumed,
        amount,
        ingested_after: resource.ingested,
        used_after: resource.used,
    };
    sink.append(&event)?;

    tracing::info!(
        "Consumed {} of '{}': used {}, remaining {}",
        amount,
        event.resource_name,
        receipt.new_used,
        receipt.new_remaining
    );
    Ok(receipt)
}

/// Pure read of a resource's remaining stock.
pub fn remaining(store: &InventoryStore, resource_id: Uuid) -> Result<Decimal> {
    Ok(store.resource(resource_id)?.remaining())
}

fn require_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidQuantity(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}
