//! Tags available to engage, grouped by who owns them.

use serde::{Deserialize, Serialize};

use crate::story::{SharedConfig, StoryConfig};
use crate::tag::Tag;

/// Every tag a roll may draw on that is not already engaged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagFeed {
    /// Statuses and story tags on the acting actor.
    pub own: Vec<Tag>,
    /// Tags from the shared story registry.
    pub story: Vec<Tag>,
    /// Tags on other actors tracked by the GM.
    pub opposing: Vec<Tag>,
    /// Tags on targeted challenges.
    pub targets: Vec<Tag>,
}

impl TagFeed {
    /// Story and GM-tracked tags for `actor_id` from the shared registry.
    pub fn from_story(config: &StoryConfig, actor_id: &str) -> Self {
        Self {
            own: Vec::new(),
            story: config.tags.clone(),
            opposing: config.actor_tags_except(actor_id),
            targets: Vec::new(),
        }
    }

    /// Set the acting actor's own statuses and story tags.
    pub fn with_own(mut self, own: Vec<Tag>) -> Self {
        self.own = own;
        self
    }

    /// Set the tags of targeted challenges.
    pub fn with_targets(mut self, targets: Vec<Tag>) -> Self {
        self.targets = targets;
        self
    }

    /// Every tag in the feed.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.own
            .iter()
            .chain(&self.story)
            .chain(&self.opposing)
            .chain(&self.targets)
    }

    /// Find a tag by id.
    pub fn find(&self, tag_id: &str) -> Option<&Tag> {
        self.iter().find(|t| t.id == tag_id)
    }

    /// Returns true if `tag_id` belongs to the other side of the conflict.
    pub fn is_opposing(&self, tag_id: &str) -> bool {
        self.opposing.iter().chain(&self.targets).any(|t| t.id == tag_id)
    }
}

/// Read accessor for the tags a session may engage.
pub trait TagSource {
    /// The tags currently available to `actor_id`.
    fn feed(&self, actor_id: &str) -> TagFeed;
}

impl TagSource for TagFeed {
    fn feed(&self, _actor_id: &str) -> TagFeed {
        self.clone()
    }
}

impl TagSource for SharedConfig {
    fn feed(&self, actor_id: &str) -> TagFeed {
        TagFeed::from_story(&self.read(), actor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryActor;
    use crate::tag::TagType;

    #[test]
    fn shared_config_feed_splits_story_and_opposing() {
        let shared = SharedConfig::new(StoryConfig {
            tags: vec![Tag::new("rain", "Rain", TagType::StoryTag)],
            actors: vec![StoryActor {
                id: "ogre".into(),
                name: "Ogre".into(),
                tags: vec![Tag::new("huge", "Huge", TagType::StoryTag)],
            }],
            ..StoryConfig::default()
        });
        let feed = shared.feed("hero");
        assert_eq!(feed.story.len(), 1);
        assert!(feed.is_opposing("huge"));
        assert!(!feed.is_opposing("rain"));
        assert!(feed.find("rain").is_some());
        assert!(feed.find("nope").is_none());
    }

    #[test]
    fn targets_are_opposing() {
        let feed = TagFeed::default()
            .with_targets(vec![Tag::new("club", "Club", TagType::TargetTag)])
            .with_own(vec![Tag::status("hurt", "Hurt", 2)]);
        assert!(feed.is_opposing("club"));
        assert!(!feed.is_opposing("hurt"));
        assert_eq!(feed.iter().count(), 2);
    }
}
