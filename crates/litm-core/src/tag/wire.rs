//! JSON shape of a tag as saved by sheets and sent between peers.
//!
//! Saved data carries either `value` or a `values` track, with boxes that
//! may be numbers, numeric strings, `false`, `""`, or `null`.

use serde::{Deserialize, Serialize};

use super::{StatusTrack, Tag, TagState, TagType, TagValue, ThemeLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(super) enum Slot {
    Int(i64),
    Float(f64),
    Flag(bool),
    Text(String),
}

impl Slot {
    fn to_level(&self) -> Option<i32> {
        match self {
            Self::Int(n) => i32::try_from(*n).ok(),
            Self::Float(n) if n.is_finite() => Some(n.trunc() as i32),
            Self::Float(_) | Self::Flag(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn default_active() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TagWire {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: TagType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Option<Slot>>>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    is_burnt: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    to_burn: bool,
    #[serde(default)]
    is_single_use: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<ThemeLevel>,
    #[serde(default)]
    state: Option<TagState>,
}

impl From<TagWire> for Tag {
    fn from(w: TagWire) -> Self {
        let scalar = w.value.as_ref().and_then(Slot::to_level);
        let value = match (scalar, w.values) {
            (Some(v), _) => Some(TagValue::Scalar(v)),
            (None, Some(slots)) => Some(TagValue::Tracked(StatusTrack::new(
                slots
                    .iter()
                    .map(|s| s.as_ref().and_then(Slot::to_level))
                    .collect(),
            ))),
            (None, None) => None,
        };

        Tag {
            id: w.id,
            name: w.name,
            kind: w.kind,
            value,
            is_active: w.is_active,
            is_burnt: w.is_burnt,
            to_burn: w.to_burn,
            is_single_use: w.is_single_use,
            level: w.level,
            state: w.state.unwrap_or_default(),
        }
    }
}

impl From<Tag> for TagWire {
    fn from(t: Tag) -> Self {
        let (value, values) = match t.value {
            Some(TagValue::Scalar(v)) => (Some(Slot::Int(i64::from(v))), None),
            Some(TagValue::Tracked(track)) => (
                None,
                Some(
                    track
                        .slots()
                        .iter()
                        .map(|s| s.map(|v| Slot::Int(i64::from(v))))
                        .collect(),
                ),
            ),
            None => (None, None),
        };

        TagWire {
            id: t.id,
            name: t.name,
            kind: t.kind,
            value,
            values,
            is_active: t.is_active,
            is_burnt: t.is_burnt,
            to_burn: t.to_burn,
            is_single_use: t.is_single_use,
            level: t.level,
            state: Some(t.state),
        }
    }
}
