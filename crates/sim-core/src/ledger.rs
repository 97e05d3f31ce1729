//! Authoritative stock of every resource kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::resource::ResourceKind;

/// Errors produced by ledger withdrawals.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// Stock on hand does not cover the request.
    #[error("insufficient {kind}: requested {requested}, available {available}")]
    Insufficient {
        kind: ResourceKind,
        requested: f32,
        available: f32,
    },
    /// Negative or non-finite withdrawal amount.
    #[error("invalid amount {0}")]
    InvalidAmount(f32),
}

/// Quantity on hand per resource kind. Quantities never go negative.
///
/// The simulation owns a single ledger and lends it to buildings while they
/// produce, so buildings processed earlier in a tick see stock first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    stock: BTreeMap<ResourceKind, f32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stock, 0 for kinds never seen.
    pub fn get(&self, kind: ResourceKind) -> f32 {
        self.stock.get(&kind).copied().unwrap_or(0.0)
    }

    /// Deposit `amount`. Negative or non-finite amounts are ignored.
    pub fn add(&mut self, kind: ResourceKind, amount: f32) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        *self.stock.entry(kind).or_insert(0.0) += amount;
    }

    /// Deposit without raising the stock above `cap`. Returns the amount applied.
    pub fn add_capped(&mut self, kind: ResourceKind, amount: f32, cap: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let current = self.get(kind);
        let room = (cap - current).max(0.0);
        let applied = amount.min(room);
        if applied > 0.0 {
            self.stock.insert(kind, current + applied);
        }
        applied
    }

    /// Withdraw `amount`, or leave the stock untouched if it does not cover it.
    pub fn consume(&mut self, kind: ResourceKind, amount: f32) -> Result<(), LedgerError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let available = self.get(kind);
        if available < amount {
            return Err(LedgerError::Insufficient {
                kind,
                requested: amount,
                available,
            });
        }
        self.stock.insert(kind, available - amount);
        Ok(())
    }

    /// Withdraw every request or none of them.
    ///
    /// Requests naming the same kind are summed before checking.
    pub fn consume_all(&mut self, requests: &[(ResourceKind, f32)]) -> Result<(), LedgerError> {
        let mut totals: BTreeMap<ResourceKind, f32> = BTreeMap::new();
        for &(kind, amount) in requests {
            if !amount.is_finite() || amount < 0.0 {
                return Err(LedgerError::InvalidAmount(amount));
            }
            *totals.entry(kind).or_insert(0.0) += amount;
        }
        for (&kind, &requested) in &totals {
            let available = self.get(kind);
            if available < requested {
                return Err(LedgerError::Insufficient {
                    kind,
                    requested,
                    available,
                });
            }
        }
        for (kind, requested) in totals {
            let available = self.get(kind);
            self.stock.insert(kind, available - requested);
        }
        Ok(())
    }

    /// Overwrite a stock level, used when rebuilding from a save.
    pub fn set(&mut self, kind: ResourceKind, amount: f32) {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        self.stock.insert(kind, amount);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f32)> + '_ {
        self.stock.iter().map(|(k, v)| (*k, *v))
    }
}
