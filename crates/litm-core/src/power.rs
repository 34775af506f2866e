//! Net power of a roll from its engaged tags.
//!
//! Burned tags add 3 each, power tags add 1 each, weaknesses subtract 1
//! each. Statuses do not stack: only the single highest status of each
//! polarity counts. The modifier is added last.

use serde::{Deserialize, Serialize};

use crate::tag::{Tag, TagState};

/// Power added by each burned tag unless configured otherwise.
pub const BURN_VALUE: i32 = 3;

/// Engaged tags split by polarity and type.
#[derive(Debug, Clone, Default)]
pub struct TagPartition<'a> {
    /// Any tag in the burned state.
    pub burned: Vec<&'a Tag>,
    /// Non-status tags engaged positively.
    pub power: Vec<&'a Tag>,
    /// Non-status tags engaged negatively.
    pub weakness: Vec<&'a Tag>,
    /// Statuses engaged positively.
    pub positive_statuses: Vec<&'a Tag>,
    /// Statuses engaged negatively.
    pub negative_statuses: Vec<&'a Tag>,
}

impl<'a> TagPartition<'a> {
    /// Partition a set of tags by their current polarity.
    ///
    /// Unselected tags are dropped.
    pub fn from_tags<I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        let mut partition = Self::default();
        for tag in tags {
            let status = tag.kind.is_status();
            match tag.state {
                TagState::Burned => partition.burned.push(tag),
                TagState::Positive if status => partition.positive_statuses.push(tag),
                TagState::Positive => partition.power.push(tag),
                TagState::Negative if status => partition.negative_statuses.push(tag),
                TagState::Negative => partition.weakness.push(tag),
                TagState::Unselected => {}
            }
        }
        partition
    }

    /// Returns true if no tag is engaged.
    pub fn is_empty(&self) -> bool {
        self.burned.is_empty()
            && self.power.is_empty()
            && self.weakness.is_empty()
            && self.positive_statuses.is_empty()
            && self.negative_statuses.is_empty()
    }
}

/// Which term of the total a tooltip line explains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Term {
    /// A burned tag.
    Burned,
    /// A power tag.
    Power,
    /// A weakness tag.
    Weakness,
    /// The winning positive status.
    PositiveStatus,
    /// The winning negative status.
    NegativeStatus,
    /// The free modifier.
    Modifier,
    /// Tier bonus from might.
    Might,
}

/// One line of the human-readable breakdown of a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipLine {
    /// Which term this line explains.
    pub term: Term,
    /// Tag name, or a fixed label for the modifier.
    pub label: String,
    /// Signed contribution to the total.
    pub delta: i32,
}

impl std::fmt::Display for TooltipLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:+}", self.label, self.delta)
    }
}

/// Every sub-total of a power calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerBreakdown {
    /// Burn value times the number of burned tags.
    pub burned_value: i32,
    /// Number of power tags.
    pub power_value: i32,
    /// Number of weakness tags.
    pub weakness_value: i32,
    /// Highest positive status.
    pub positive_status_value: i32,
    /// Highest negative status.
    pub negative_status_value: i32,
    /// Free modifier.
    pub modifier: i32,
    /// Net power before any might bonus.
    pub total_power: i32,
    /// One line per contributing term.
    pub tooltip: Vec<TooltipLine>,
}

impl PowerBreakdown {
    /// The tooltip rendered one line per term.
    pub fn tooltip_text(&self) -> String {
        self.tooltip
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Computes [`PowerBreakdown`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCalculator {
    /// Power added per burned tag.
    pub burn_value: i32,
}

impl Default for PowerCalculator {
    fn default() -> Self {
        Self {
            burn_value: BURN_VALUE,
        }
    }
}

impl PowerCalculator {
    /// Compute every sub-total and the net power of a partition.
    pub fn calculate(&self, partition: &TagPartition<'_>, modifier: i32) -> PowerBreakdown {
        let burned_value = count(&partition.burned).saturating_mul(self.burn_value);
        let power_value = count(&partition.power);
        let weakness_value = count(&partition.weakness);

        let positive = strongest(&partition.positive_statuses);
        let negative = strongest(&partition.negative_statuses);
        let positive_status_value = positive.map_or(0, |t| t.resolved_value());
        let negative_status_value = negative.map_or(0, |t| t.resolved_value());

        // Saturates: modifiers and status values may sit at the i32 limits.
        let total_power = burned_value
            .saturating_add(power_value)
            .saturating_add(positive_status_value)
            .saturating_sub(weakness_value)
            .saturating_sub(negative_status_value)
            .saturating_add(modifier);

        let mut tooltip = Vec::new();
        for tag in &partition.burned {
            tooltip.push(line(Term::Burned, &tag.name, self.burn_value));
        }
        for tag in &partition.power {
            tooltip.push(line(Term::Power, &tag.name, 1));
        }
        for tag in &partition.weakness {
            tooltip.push(line(Term::Weakness, &tag.name, -1));
        }
        if let Some(tag) = positive {
            tooltip.push(line(Term::PositiveStatus, &tag.to_string(), positive_status_value));
        }
        if let Some(tag) = negative {
            tooltip.push(line(Term::NegativeStatus, &tag.to_string(), -negative_status_value));
        }
        if modifier != 0 {
            tooltip.push(line(Term::Modifier, "Modifier", modifier));
        }

        PowerBreakdown {
            burned_value,
            power_value,
            weakness_value,
            positive_status_value,
            negative_status_value,
            modifier,
            total_power,
            tooltip,
        }
    }
}

/// Compute a breakdown with the default burn value.
pub fn calculate(partition: &TagPartition<'_>, modifier: i32) -> PowerBreakdown {
    PowerCalculator::default().calculate(partition, modifier)
}

/// Coerce modifier text to a number; anything non-numeric is 0.
pub fn coerce_modifier(raw: &str) -> i32 {
    let raw = raw.trim();
    raw.parse::<i32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i32))
        .unwrap_or(0)
}

fn count(tags: &[&Tag]) -> i32 {
    i32::try_from(tags.len()).unwrap_or(i32::MAX)
}

/// The first status with the strictly highest positive resolved value.
fn strongest<'a>(statuses: &[&'a Tag]) -> Option<&'a Tag> {
    let mut best: Option<&'a Tag> = None;
    let mut best_value = 0;
    for status in statuses {
        let v = status.resolved_value();
        if v > best_value {
            best_value = v;
            best = Some(*status);
        }
    }
    best
}

fn line(term: Term, label: &str, delta: i32) -> TooltipLine {
    TooltipLine {
        term,
        label: label.to_string(),
        delta,
    }
}
