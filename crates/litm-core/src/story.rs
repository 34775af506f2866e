//! World-level state shared by every player: story tags, story themes, and
//! the fellowship.
//!
//! [`SharedConfig`] is a handle passed explicitly to each roll session. It
//! only offers whole-value read and replace, so concurrent writers resolve
//! as last-writer-wins.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::classify::classify_into;
use crate::tag::{Tag, TagId, TagState, TagType};

/// A theme owned by the story rather than by one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTheme {
    /// Theme identifier; engaging the whole theme uses this id.
    pub id: TagId,
    /// Title in bracket notation, e.g. `[Dragon's Hoard++]`.
    pub name: String,
    /// Permanently burnt.
    #[serde(default)]
    pub is_burnt: bool,
    /// Polarity of the theme title within the current roll.
    #[serde(default, deserialize_with = "nullable_state")]
    pub state: TagState,
    /// The theme's own tags, also in bracket notation.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl StoryTheme {
    /// The theme title as a classified tag carrying the theme's state.
    pub fn title_tag(&self) -> Tag {
        let mut tag = classify_into(Tag::new(
            self.id.clone(),
            self.name.clone(),
            TagType::StoryThemeTag,
        ));
        tag.is_burnt = self.is_burnt;
        tag.state = self.state;
        tag
    }

    /// Classify every tag name in place.
    pub fn classify_tags(&mut self) {
        self.tags = std::mem::take(&mut self.tags)
            .into_iter()
            .map(classify_into)
            .collect();
    }

    /// Clear the title's and every tag's polarity.
    pub fn clear_states(&mut self) {
        self.state = TagState::Unselected;
        for tag in &mut self.tags {
            tag.state = TagState::Unselected;
        }
    }
}

fn nullable_state<'de, D>(deserializer: D) -> Result<TagState, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<TagState>::deserialize(deserializer)?.unwrap_or_default())
}

/// An actor whose tags the GM tracks in the story registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryActor {
    /// Actor identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Tags and statuses on this actor.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// The fellowship theme shared by all player characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fellowship {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Fellowship power tags; always single-use.
    #[serde(default)]
    pub power_tags: Vec<Tag>,
    /// Fellowship weaknesses.
    #[serde(default)]
    pub weakness: Vec<Tag>,
    /// Experience marked on the fellowship.
    #[serde(default)]
    pub experience: u32,
}

impl Fellowship {
    /// Returns true if `tag_id` is one of the fellowship weaknesses.
    pub fn has_weakness(&self, tag_id: &str) -> bool {
        self.weakness.iter().any(|w| w.id == tag_id)
    }
}

/// The complete shared story state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryConfig {
    /// Story tags and statuses visible to every player.
    pub tags: Vec<Tag>,
    /// Actors tracked by the GM.
    pub actors: Vec<StoryActor>,
    /// Story themes.
    pub story_themes: Vec<StoryTheme>,
    /// The fellowship theme.
    pub fellowship: Fellowship,
}

impl StoryConfig {
    /// Mark a story tag (or an actor's tag) burnt and clear its polarity.
    ///
    /// Returns false if no tag with that id is tracked.
    pub fn burn_tag(&mut self, tag_id: &str) -> bool {
        let tags = self
            .tags
            .iter_mut()
            .chain(self.actors.iter_mut().flat_map(|a| a.tags.iter_mut()))
            .chain(self.story_themes.iter_mut().flat_map(|t| t.tags.iter_mut()));
        let mut found = false;
        for tag in tags.filter(|t| t.id == tag_id) {
            tag.is_burnt = true;
            tag.state = TagState::Unselected;
            found = true;
        }
        for theme in self.story_themes.iter_mut().filter(|t| t.id == tag_id) {
            theme.is_burnt = true;
            theme.state = TagState::Unselected;
            found = true;
        }
        found
    }

    /// Tags on every tracked actor other than `actor_id`.
    pub fn actor_tags_except(&self, actor_id: &str) -> Vec<Tag> {
        self.actors
            .iter()
            .filter(|a| a.id != actor_id)
            .flat_map(|a| a.tags.iter().cloned())
            .collect()
    }
}

/// Cloneable handle to the shared [`StoryConfig`].
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<StoryConfig>>,
}

impl SharedConfig {
    /// Wrap an initial configuration.
    pub fn new(config: StoryConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// A copy of the current configuration.
    pub fn read(&self) -> StoryConfig {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: StoryConfig) {
        match self.inner.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    /// Read, modify, and replace in one step.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut StoryConfig),
    {
        self.update_with(f);
    }

    /// Like [`SharedConfig::update`], returning what the closure returns.
    pub fn update_with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut StoryConfig) -> R,
    {
        let mut config = self.read();
        let out = f(&mut config);
        self.replace(config);
        out
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tag::ThemeLevel;

    fn theme() -> StoryTheme {
        StoryTheme {
            id: "st-1".into(),
            name: "[Dragon's Hoard++]".into(),
            is_burnt: false,
            state: TagState::Positive,
            tags: vec![
                Tag::new("st-1a", "[Gold Coins-2]", TagType::StoryTag),
                Tag::new("st-1b", "[--Cursed]", TagType::StoryTag),
            ],
        }
    }

    #[test]
    fn title_tag_is_classified() {
        let tag = theme().title_tag();
        assert_eq!(tag.id, "st-1");
        assert_eq!(tag.name, "Dragon's Hoard");
        assert_eq!(tag.level, Some(ThemeLevel::Greatness));
        assert_eq!(tag.state, TagState::Positive);
    }

    #[test]
    fn classify_tags_in_place() {
        let mut theme = theme();
        theme.classify_tags();
        assert_eq!(theme.tags[0].name, "Gold Coins");
        assert_eq!(theme.tags[0].resolved_value(), 2);
        assert_eq!(theme.tags[1].kind, TagType::WeaknessTag);
        assert_eq!(theme.tags[1].id, "st-1b");
    }

    #[test]
    fn clear_states_resets_title_and_tags() {
        let mut theme = theme();
        theme.tags[0].state = TagState::Burned;
        theme.clear_states();
        assert_eq!(theme.state, TagState::Unselected);
        assert!(theme.tags.iter().all(|t| t.state == TagState::Unselected));
    }

    #[test]
    fn burn_tag_across_registry() {
        let mut config = StoryConfig {
            tags: vec![Tag::new("fog", "Thick Fog", TagType::StoryTag).with_state(TagState::Burned)],
            story_themes: vec![theme()],
            ..StoryConfig::default()
        };
        assert!(config.burn_tag("fog"));
        assert!(config.tags[0].is_burnt);
        assert_eq!(config.tags[0].state, TagState::Unselected);
        assert!(config.burn_tag("st-1"));
        assert!(config.story_themes[0].is_burnt);
        assert!(!config.burn_tag("missing"));
    }

    #[test]
    fn actor_tags_exclude_acting_actor() {
        let config = StoryConfig {
            actors: vec![
                StoryActor {
                    id: "hero".into(),
                    name: "Hero".into(),
                    tags: vec![Tag::new("h", "Bold", TagType::StoryTag)],
                },
                StoryActor {
                    id: "ogre".into(),
                    name: "Ogre".into(),
                    tags: vec![Tag::new("o", "Huge", TagType::StoryTag)],
                },
            ],
            ..StoryConfig::default()
        };
        let tags = config.actor_tags_except("hero");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, "o");
    }

    #[test]
    fn shared_handle_is_last_writer_wins() {
        let shared = SharedConfig::default();
        let other = shared.clone();

        let mut a = shared.read();
        let mut b = other.read();
        a.fellowship.experience = 1;
        b.fellowship.experience = 2;
        shared.replace(a);
        other.replace(b);

        assert_eq!(shared.read().fellowship.experience, 2);
        shared.update(|c| c.fellowship.experience += 1);
        assert_eq!(other.read().fellowship.experience, 3);
    }

    #[test]
    fn story_config_from_saved_json() {
        let config: StoryConfig = serde_json::from_value(json!({
            "tags": [{"id": "t", "name": "Rain", "type": "tag", "values": [null, null]}],
            "actors": [],
            "storyThemes": [{"id": "s", "name": "[Storm+]", "state": null, "tags": []}]
        }))
        .unwrap();
        assert_eq!(config.tags[0].kind, TagType::StoryTag);
        assert_eq!(config.story_themes[0].state, TagState::Unselected);
        assert_eq!(config.fellowship, Fellowship::default());
    }
}
