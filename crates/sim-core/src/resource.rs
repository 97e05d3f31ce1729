//! Resource kinds and the per-kind display/pricing record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ValidationError;

/// Tradeable commodities plus money.
///
/// The discriminants are the stable ids written to save files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResourceKind {
    Money = 0,
    Wood = 1,
    Stone = 2,
    Iron = 3,
    Gold = 4,
    Crystal = 5,
    Energy = 6,
    Diamond = 7,
}

impl ResourceKind {
    /// Every kind in id order.
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Money,
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Iron,
        ResourceKind::Gold,
        ResourceKind::Crystal,
        ResourceKind::Energy,
        ResourceKind::Diamond,
    ];

    /// Kinds that trade on the market (everything except money).
    pub fn commodities() -> impl Iterator<Item = ResourceKind> {
        Self::ALL.into_iter().filter(|k| *k != ResourceKind::Money)
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or(ValidationError::UnknownResourceKind(id))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::Money => "Money",
            ResourceKind::Wood => "Wood",
            ResourceKind::Stone => "Stone",
            ResourceKind::Iron => "Iron",
            ResourceKind::Gold => "Gold",
            ResourceKind::Crystal => "Crystal",
            ResourceKind::Energy => "Energy",
            ResourceKind::Diamond => "Diamond",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A building's per-unit input or output of one resource kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub kind: ResourceKind,
    /// Units per unit of building production.
    pub rate: f32,
}

impl ResourceRequirement {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind, rate: 1.0 }
    }
}

/// Display and pricing record for one resource kind.
///
/// `amount` mirrors the ledger; the ledger stays authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
    pub amount: f32,
    /// Current market price per unit.
    pub base_price: f32,
    /// Set once the player has held a positive amount.
    pub owned: bool,
}

impl Resource {
    pub fn new(kind: ResourceKind, amount: f32, base_price: f32, owned: bool) -> Self {
        Self {
            kind,
            name: kind.display_name().to_string(),
            amount,
            base_price,
            owned,
        }
    }

    /// Market value of the current holding.
    pub fn holding_value(&self) -> f32 {
        self.amount * self.base_price
    }
}
