//! Tags, statuses, and their transient roll polarity.
//!
//! A [`Tag`] is a named narrative modifier. Statuses are tags whose
//! [`TagValue`] tracks a severity; everything else counts as a flat +1/-1
//! when engaged. The [`TagState`] polarity is session-only and is reset at
//! the start of every roll.

pub mod value;
mod wire;

pub use value::{StatusTrack, TagValue};

use serde::{Deserialize, Serialize};

/// Stable identifier of a tag within its owning scope.
pub type TagId = String;

/// What kind of narrative modifier a tag is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagType {
    /// A power tag on one of the character's themes.
    PowerTag,
    /// A weakness tag; always counts against the roll.
    WeaknessTag,
    /// A whole theme engaged as a single tag.
    ThemeTag,
    /// An item carried in the backpack.
    #[serde(alias = "backpack")]
    BackpackTag,
    /// A story tag from the shared, world-level registry.
    #[default]
    #[serde(alias = "tag")]
    StoryTag,
    /// A status tracking severity across up to six levels.
    Status,
    /// A tag classified from a story theme's free text.
    StoryThemeTag,
    /// A tag read from a targeted challenge.
    TargetTag,
}

impl TagType {
    /// Returns true for statuses, which contribute their level instead of 1.
    pub fn is_status(self) -> bool {
        self == Self::Status
    }

    /// Returns true for tags persisted on the character sheet itself.
    ///
    /// Burning one of these is written back to the character; any other
    /// burned tag is burned through the shared story registry.
    pub fn is_character_owned(self) -> bool {
        matches!(self, Self::PowerTag | Self::ThemeTag | Self::BackpackTag)
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PowerTag => "powerTag",
            Self::WeaknessTag => "weaknessTag",
            Self::ThemeTag => "themeTag",
            Self::BackpackTag => "backpackTag",
            Self::StoryTag => "storyTag",
            Self::Status => "status",
            Self::StoryThemeTag => "storyThemeTag",
            Self::TargetTag => "targetTag",
        };
        write!(f, "{s}")
    }
}

/// Polarity of a tag within the current roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagState {
    /// Not part of the roll.
    #[default]
    #[serde(rename = "")]
    Unselected,
    /// Counts against the roll.
    Negative,
    /// Counts for the roll.
    Positive,
    /// Consumed for a one-time +3.
    Burned,
}

impl TagState {
    /// Parse a polarity as sent by a sheet checkbox.
    ///
    /// Unknown text is treated as unselected.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "negative" => Self::Negative,
            "positive" => Self::Positive,
            "burned" => Self::Burned,
            _ => Self::Unselected,
        }
    }

    /// Returns true if the tag takes part in the roll.
    pub fn is_engaged(self) -> bool {
        self != Self::Unselected
    }
}

impl std::fmt::Display for TagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unselected => "",
            Self::Negative => "negative",
            Self::Positive => "positive",
            Self::Burned => "burned",
        };
        write!(f, "{s}")
    }
}

/// Power tier of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ThemeLevel {
    /// Starting tier; grants no might. Unknown tiers read as origin.
    #[default]
    Origin,
    /// Middle tier.
    Adventure,
    /// Highest tier.
    Greatness,
}

impl ThemeLevel {
    /// Might granted by engaging a tag of this tier.
    pub fn might(self) -> i32 {
        match self {
            Self::Origin => 0,
            Self::Adventure => 1,
            Self::Greatness => 2,
        }
    }
}

impl From<String> for ThemeLevel {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "adventure" => Self::Adventure,
            "greatness" => Self::Greatness,
            _ => Self::Origin,
        }
    }
}

impl std::fmt::Display for ThemeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Origin => "origin",
            Self::Adventure => "adventure",
            Self::Greatness => "greatness",
        };
        write!(f, "{s}")
    }
}

/// A named, typed modifier that can be engaged in a roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "wire::TagWire", into = "wire::TagWire")]
pub struct Tag {
    /// Stable identifier.
    pub id: TagId,
    /// Display text.
    pub name: String,
    /// What kind of tag this is.
    pub kind: TagType,
    /// Scalar value or status track, if any.
    pub value: Option<TagValue>,
    /// Only active character tags count toward power.
    pub is_active: bool,
    /// Permanently burnt.
    pub is_burnt: bool,
    /// Marked to burn with the next roll.
    pub to_burn: bool,
    /// Consumed after a single positive use; never offers a burn.
    pub is_single_use: bool,
    /// Explicit theme tier, if known.
    pub level: Option<ThemeLevel>,
    /// Polarity within the current roll.
    pub state: TagState,
}

impl Tag {
    /// Create an active, unselected tag with no value.
    pub fn new(id: impl Into<TagId>, name: impl Into<String>, kind: TagType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            value: None,
            is_active: true,
            is_burnt: false,
            to_burn: false,
            is_single_use: false,
            level: None,
            state: TagState::Unselected,
        }
    }

    /// Create a status with a scalar level.
    pub fn status(id: impl Into<TagId>, name: impl Into<String>, level: i32) -> Self {
        Self::new(id, name, TagType::Status).with_value(level)
    }

    /// Set the polarity.
    pub fn with_state(mut self, state: TagState) -> Self {
        self.state = state;
        self
    }

    /// Set a scalar value.
    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(TagValue::Scalar(value));
        self
    }

    /// Set a status track.
    pub fn with_track(mut self, track: StatusTrack) -> Self {
        self.value = Some(TagValue::Tracked(track));
        self
    }

    /// Set the theme tier.
    pub fn with_level(mut self, level: ThemeLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Mark the tag single-use.
    pub fn single_use(mut self) -> Self {
        self.is_single_use = true;
        self
    }

    /// Set whether the tag is active.
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// The value this tag contributes as a status, or 0.
    pub fn resolved_value(&self) -> i32 {
        self.value.as_ref().map_or(0, TagValue::resolved)
    }

    /// The polarities a player may pick for this tag.
    pub fn states(&self) -> Vec<TagState> {
        match self.kind {
            TagType::WeaknessTag | TagType::TargetTag => vec![TagState::Negative],
            TagType::Status => vec![TagState::Negative, TagState::Positive],
            _ if self.is_single_use => vec![TagState::Negative, TagState::Positive],
            _ => vec![TagState::Negative, TagState::Positive, TagState::Burned],
        }
    }

    /// Returns true if `state` is one of [`Tag::states`] or unselected.
    pub fn allows(&self, state: TagState) -> bool {
        state == TagState::Unselected || self.states().contains(&state)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(v) if self.kind.is_status() => write!(f, "{}-{}", self.name, v.resolved()),
            _ => write!(f, "{}", self.name),
        }
    }
}
