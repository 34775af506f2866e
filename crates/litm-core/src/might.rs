//! Might: the tier bonus from adventure- and greatness-level tags.
//!
//! Each side takes the highest tier among its qualifying engaged tags
//! (adventure = 1, greatness = 2). The opposing side's hostile tags raise
//! its resistance; its favorable tags help the acting side. The two sides
//! cancel, so the result always lies in `-2..=2`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tag::{Tag, TagId, TagState, ThemeLevel};

/// Looks up the tier of the theme that owns a tag.
pub trait ThemeLookup {
    /// The tier of the theme owning `tag_id`, if any theme owns it.
    fn level_of(&self, tag_id: &str) -> Option<ThemeLevel>;
}

impl ThemeLookup for HashMap<TagId, ThemeLevel> {
    fn level_of(&self, tag_id: &str) -> Option<ThemeLevel> {
        self.get(tag_id).copied()
    }
}

/// An owned narrative theme and the ids of its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Theme identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Power tier.
    #[serde(default)]
    pub level: ThemeLevel,
    /// Ids of the power and weakness tags on this theme.
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

impl ThemeLookup for [Theme] {
    fn level_of(&self, tag_id: &str) -> Option<ThemeLevel> {
        self.iter()
            .find(|t| t.id == tag_id || t.tag_ids.iter().any(|id| id == tag_id))
            .map(|t| t.level)
    }
}

impl ThemeLookup for Vec<Theme> {
    fn level_of(&self, tag_id: &str) -> Option<ThemeLevel> {
        self.as_slice().level_of(tag_id)
    }
}

/// A lookup that knows no themes; every tag reads as origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThemes;

impl ThemeLookup for NoThemes {
    fn level_of(&self, _tag_id: &str) -> Option<ThemeLevel> {
        None
    }
}

/// Signed tier advantage of a roll, between -2 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Might(i32);

impl Might {
    /// Lowest possible might.
    pub const MIN: i32 = -2;
    /// Highest possible might.
    pub const MAX: i32 = 2;

    /// Build a might value, clamped to the legal range.
    pub fn new(value: i32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// The signed value.
    pub fn value(self) -> i32 {
        self.0
    }

    /// The power this might adds at the given weight per step.
    pub fn bonus(self, weight: i32) -> i32 {
        self.0.saturating_mul(weight)
    }

    /// The severity label, or `None` when neutral.
    pub fn label(self) -> Option<&'static str> {
        match self.0 {
            -2 => Some("extremely imperiled"),
            -1 => Some("imperiled"),
            1 => Some("favored"),
            2 => Some("extremely favored"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Might {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{label} ({:+})", self.0),
            None => write!(f, "neutral"),
        }
    }
}

/// Resolve a tag's tier: its own level, then its owning theme, then origin.
pub fn level_of<L: ThemeLookup + ?Sized>(themes: &L, tag: &Tag) -> ThemeLevel {
    tag.level
        .or_else(|| themes.level_of(&tag.id))
        .unwrap_or_default()
}

/// Compute the might of a roll.
///
/// `own` are tags the acting side controls; `opposing` are tags from the
/// other side of the conflict (GM or challenge tags).
pub fn roll_might<'a, L, O, P>(themes: &L, own: O, opposing: P) -> Might
where
    L: ThemeLookup + ?Sized,
    O: IntoIterator<Item = &'a Tag>,
    P: IntoIterator<Item = &'a Tag>,
{
    let mut might = 0;
    let mut opposing_might = 0;

    for tag in own {
        if !tag.state.is_engaged() || tag.state == TagState::Negative {
            continue;
        }
        might = might.max(level_of(themes, tag).might());
    }

    for tag in opposing {
        let tier = level_of(themes, tag).might();
        match tag.state {
            TagState::Unselected => {}
            TagState::Negative => opposing_might = opposing_might.max(tier),
            TagState::Positive | TagState::Burned => might = might.max(tier),
        }
    }

    Might::new(might - opposing_might)
}
