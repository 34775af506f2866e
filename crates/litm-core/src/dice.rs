//! Rolling `2d6 + power` and reading the result.
//!
//! A total of 10 or more is a success, 7 to 9 a success with consequences,
//! and 6 or less consequences only.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::commit::RollType;

/// Faces on each die.
pub const SIDES: u32 = 6;

/// The result band of a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// Total of 10 or more.
    Success,
    /// Total of 7 to 9.
    SuccessWithConsequences,
    /// Total of 6 or less.
    Consequences,
}

impl Outcome {
    /// Band for a roll total.
    pub fn from_total(total: i32) -> Self {
        match total {
            10.. => Self::Success,
            7..=9 => Self::SuccessWithConsequences,
            _ => Self::Consequences,
        }
    }

    /// Returns true for either success band.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Consequences)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::SuccessWithConsequences => write!(f, "Success with Consequences"),
            Self::Consequences => write!(f, "Consequences"),
        }
    }
}

/// A rolled and interpreted roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    /// The two dice.
    pub dice: [u32; 2],
    /// Power added to the dice.
    pub power: i32,
    /// Dice plus power.
    pub total: i32,
    /// Result band.
    pub outcome: Outcome,
    /// Power left to spend on effects.
    pub spendable_power: i32,
}

/// Roll two dice and add `total_power`.
pub fn roll(total_power: i32, roll_type: RollType, rng: &mut StdRng) -> RollOutcome {
    let dice = [rng.random_range(1..=SIDES), rng.random_range(1..=SIDES)];
    resolve(dice, total_power, roll_type)
}

/// Interpret already rolled dice.
pub fn resolve(dice: [u32; 2], total_power: i32, roll_type: RollType) -> RollOutcome {
    let pips: i32 = dice.iter().map(|&d| d as i32).sum();
    let total = pips.saturating_add(total_power);
    let outcome = Outcome::from_total(total);
    let spendable_power = match roll_type {
        RollType::Quick => 0,
        RollType::Tracked | RollType::Mitigate if outcome.is_success() => total_power.max(1),
        RollType::Tracked | RollType::Mitigate => 0,
    };
    RollOutcome {
        dice,
        power: total_power,
        total,
        outcome,
        spendable_power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn outcome_bands() {
        assert_eq!(Outcome::from_total(12), Outcome::Success);
        assert_eq!(Outcome::from_total(10), Outcome::Success);
        assert_eq!(Outcome::from_total(9), Outcome::SuccessWithConsequences);
        assert_eq!(Outcome::from_total(7), Outcome::SuccessWithConsequences);
        assert_eq!(Outcome::from_total(6), Outcome::Consequences);
        assert_eq!(Outcome::from_total(-4), Outcome::Consequences);
    }

    #[test]
    fn spendable_power_by_roll_type() {
        let tracked = resolve([5, 4], 2, RollType::Tracked);
        assert_eq!(tracked.total, 11);
        assert_eq!(tracked.spendable_power, 2);

        let quick = resolve([5, 4], 2, RollType::Quick);
        assert_eq!(quick.outcome, Outcome::Success);
        assert_eq!(quick.spendable_power, 0);

        let low_power = resolve([6, 3], -1, RollType::Mitigate);
        assert_eq!(low_power.outcome, Outcome::SuccessWithConsequences);
        assert_eq!(low_power.spendable_power, 1);

        let failed = resolve([1, 2], 3, RollType::Tracked);
        assert_eq!(failed.outcome, Outcome::Consequences);
        assert_eq!(failed.spendable_power, 0);
    }

    #[test]
    fn extreme_power_saturates() {
        let r = resolve([6, 6], i32::MAX, RollType::Tracked);
        assert_eq!(r.total, i32::MAX);
        assert_eq!(r.outcome, Outcome::Success);
        assert_eq!(r.spendable_power, i32::MAX);
    }

    #[test]
    fn roll_produces_valid_dice() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let r = roll(0, RollType::Tracked, &mut rng);
            assert!(r.dice.iter().all(|d| (1..=SIDES).contains(d)));
            assert_eq!(r.total, (r.dice[0] + r.dice[1]) as i32);
        }
    }

    #[test]
    fn roll_deterministic_with_seed() {
        let mut rng1 = StdRng::seed_from_u64(99);
        let mut rng2 = StdRng::seed_from_u64(99);
        assert_eq!(
            roll(3, RollType::Tracked, &mut rng1),
            roll(3, RollType::Tracked, &mut rng2)
        );
    }

    #[test]
    fn display() {
        assert_eq!(Outcome::SuccessWithConsequences.to_string(), "Success with Consequences");
    }
}
