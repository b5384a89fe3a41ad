use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::types::Bounds;

/// Extra cost multiplier applied to line-haul moves when packing is requested.
pub const PACKING_COST_BUMP: f64 = 0.08;

const BUMP_ORDER: [AccessFactor; 4] = [
    AccessFactor::Stairs,
    AccessFactor::LongCarry,
    AccessFactor::Elevator,
    AccessFactor::Parking,
];

/// Physical condition at pickup or dropoff that adds labor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessFactor {
    Stairs,
    Elevator,
    LongCarry,
    Parking,
}

impl AccessFactor {
    pub const ALL: [AccessFactor; 4] = [
        AccessFactor::Stairs,
        AccessFactor::Elevator,
        AccessFactor::LongCarry,
        AccessFactor::Parking,
    ];

    /// Parse a single factor. The `none` sentinel is not a factor; use
    /// [`AccessFactor::parse_set`] for user lists.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stairs" => Ok(AccessFactor::Stairs),
            "elevator" => Ok(AccessFactor::Elevator),
            "long-carry" | "long_carry" | "longcarry" => Ok(AccessFactor::LongCarry),
            "parking" => Ok(AccessFactor::Parking),
            other => bail!(
                "Unknown access factor '{}' (expected stairs, elevator, long-carry, parking or none)",
                other
            ),
        }
    }

    /// Parse a user-supplied list. `none` on its own means no factors;
    /// `none` next to a real factor is rejected.
    pub fn parse_set<S: AsRef<str>>(items: &[S]) -> Result<BTreeSet<AccessFactor>> {
        let mut saw_none = false;
        let mut set = BTreeSet::new();

        for item in items {
            let item = item.as_ref().trim();
            if item.is_empty() {
                continue;
            }
            if item.eq_ignore_ascii_case("none") {
                saw_none = true;
            } else {
                set.insert(AccessFactor::parse(item)?);
            }
        }

        if saw_none && !set.is_empty() {
            bail!("Access factor 'none' cannot be combined with other factors");
        }
        Ok(set)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessFactor::Stairs => "stairs",
            AccessFactor::Elevator => "elevator",
            AccessFactor::LongCarry => "long-carry",
            AccessFactor::Parking => "parking",
        }
    }

    /// Hours added to the (low, high) ends of a local move.
    pub fn hour_delta(&self) -> Bounds {
        match self {
            AccessFactor::Stairs | AccessFactor::LongCarry => Bounds::new(0.5, 1.0),
            AccessFactor::Elevator | AccessFactor::Parking => Bounds::new(0.25, 0.5),
        }
    }

    /// Fraction added to the line-haul difficulty multiplier.
    pub fn cost_bump(&self) -> f64 {
        match self {
            AccessFactor::Stairs | AccessFactor::LongCarry => 0.05,
            AccessFactor::Elevator | AccessFactor::Parking => 0.03,
        }
    }
}

impl fmt::Display for AccessFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Widen base hours by every active factor. Deltas stack additively and are
/// not capped; both ends are floored at zero.
pub fn bump_hours_for_access(base: Bounds, access: &BTreeSet<AccessFactor>) -> Bounds {
    access
        .iter()
        .fold(base, |hours, factor| hours.widen(factor.hour_delta()))
        .floor_at_zero()
}

/// Line-haul difficulty multiplier: 1.0 plus one additive fraction per
/// factor, plus the packing fraction when packing is requested.
pub fn difficulty_bump(access: &BTreeSet<AccessFactor>, packing: bool) -> f64 {
    // Summation order changes the last bit of the result; keep it fixed
    let mut bump = BUMP_ORDER
        .iter()
        .filter(|factor| access.contains(factor))
        .fold(1.0, |bump, factor| bump + factor.cost_bump());
    if packing {
        bump += PACKING_COST_BUMP;
    }
    bump
}
