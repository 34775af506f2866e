//! Peer mirroring of roll sessions.
//!
//! Several users may watch the same actor's roll. Every local mutation is
//! broadcast as a [`PeerEvent`]; delivery is best-effort with no ordering or
//! acknowledgement. A received delta replaces the local pools it carries
//! wholesale, so the last update to arrive wins.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LitmResult;
use crate::tag::Tag;

/// The transient pools of one actor's roll session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDelta {
    /// Message identifier.
    pub id: Uuid,
    /// Actor whose roll this describes.
    pub actor_id: String,
    /// Tags added from the character sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_tags: Option<Vec<Tag>>,
    /// Ad-hoc engaged tags (story tags, statuses, GM and target tags).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_state: Option<Vec<Tag>>,
    /// Free modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<i32>,
}

impl SessionDelta {
    /// A delta carrying nothing for `actor_id`.
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: actor_id.into(),
            character_tags: None,
            tag_state: None,
            modifier: None,
        }
    }
}

/// A message exchanged between peers watching the same tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PeerEvent {
    /// A roll session changed.
    UpdateRollDialog(SessionDelta),
    /// A roll finished or was cancelled; clear the session.
    #[serde(rename_all = "camelCase")]
    ResetRollDialog {
        /// Actor whose session to clear.
        actor_id: String,
    },
    /// Ask the GM to burn a story tag.
    BurnStoryTag {
        /// The tag to burn.
        tag: Tag,
    },
}

impl PeerEvent {
    /// Encode for the wire.
    pub fn to_json(&self) -> LitmResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the wire.
    pub fn from_json(json: &str) -> LitmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Fire-and-forget transport to other peers.
pub trait PeerChannel {
    /// Send an event to every other peer.
    fn broadcast(&mut self, event: &PeerEvent);
}

/// A channel that records every event; useful for replaying into peers.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    /// Events in broadcast order.
    pub sent: Vec<PeerEvent>,
}

impl PeerChannel for Outbox {
    fn broadcast(&mut self, event: &PeerEvent) {
        self.sent.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{TagState, TagType};

    #[test]
    fn delta_round_trip_on_the_wire() {
        let mut delta = SessionDelta::new("actor-1");
        delta.modifier = Some(2);
        delta.tag_state = Some(vec![
            Tag::new("fog", "Fog", TagType::StoryTag).with_state(TagState::Negative),
        ]);
        let event = PeerEvent::UpdateRollDialog(delta.clone());
        let json = event.to_json().unwrap();
        assert!(json.contains(r#""event":"updateRollDialog""#));
        assert!(!json.contains("characterTags"));
        assert_eq!(PeerEvent::from_json(&json).unwrap(), event);
    }

    #[test]
    fn reset_event_shape() {
        let event = PeerEvent::ResetRollDialog {
            actor_id: "a".into(),
        };
        let v: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(v["event"], "resetRollDialog");
        assert_eq!(v["data"]["actorId"], "a");
    }

    #[test]
    fn unknown_event_is_an_error() {
        assert!(PeerEvent::from_json(r#"{"event":"dance","data":{}}"#).is_err());
    }

    #[test]
    fn outbox_records_in_order() {
        let mut outbox = Outbox::default();
        outbox.broadcast(&PeerEvent::ResetRollDialog { actor_id: "a".into() });
        outbox.broadcast(&PeerEvent::ResetRollDialog { actor_id: "b".into() });
        assert_eq!(outbox.sent.len(), 2);
    }
}
