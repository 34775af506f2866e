pub mod classify;
pub mod power;
pub mod roll;
pub mod targets;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use litm_core::{
    EngineConfig, Fellowship, RollSession, SharedConfig, StoryConfig, Tag, TagFeed, TagId, TagState,
    Theme, ThemeLevel,
};
use serde::Deserialize;

/// A roll session saved as JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionFile {
    /// Acting actor.
    pub actor_id: String,
    /// Free modifier.
    pub modifier: i32,
    /// Tags with the polarity to engage them at.
    pub tags: Vec<Tag>,
    /// Tiers of the acting actor's tags, by tag id.
    pub own_levels: BTreeMap<TagId, ThemeLevel>,
    /// Ids of tags that belong to the other side.
    pub opposing_tags: Vec<TagId>,
    /// The party's fellowship theme, used for weakness experience.
    pub fellowship: Fellowship,
}

/// Read and parse a session file.
pub fn load_session(path: &Path) -> Result<SessionFile, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid session {}: {e}", path.display()))
}

/// Read the engine configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    EngineConfig::from_json(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

/// Replay a session file into a live roll session.
///
/// Opposing tags are offered through the feed and then engaged, so they
/// count against the roll's might.
pub fn build_session(file: SessionFile, config: EngineConfig) -> RollSession {
    let actor_id = if file.actor_id.is_empty() {
        "actor".to_string()
    } else {
        file.actor_id
    };

    let opposing_ids: HashSet<&str> = file.opposing_tags.iter().map(String::as_str).collect();
    let (opposing, own): (Vec<Tag>, Vec<Tag>) = file
        .tags
        .into_iter()
        .partition(|t| opposing_ids.contains(t.id.as_str()));

    let feed = TagFeed {
        opposing: opposing
            .iter()
            .map(|t| t.clone().with_state(TagState::Unselected))
            .collect(),
        ..TagFeed::default()
    };

    let shared = SharedConfig::new(StoryConfig {
        fellowship: file.fellowship,
        ..StoryConfig::default()
    });
    let mut session = RollSession::new(actor_id, config, shared)
        .with_themes(themes_from_levels(&file.own_levels))
        .with_feed(feed);
    for tag in own {
        let state = tag.state;
        if state.is_engaged() {
            session.engage(tag, state);
        }
    }
    for tag in opposing {
        if tag.state.is_engaged() {
            session.set_polarity(&tag.id, tag.state);
        }
    }
    session.set_modifier(file.modifier);
    session
}

/// One synthetic theme per tier holding the tags at that tier.
fn themes_from_levels(levels: &BTreeMap<TagId, ThemeLevel>) -> Vec<Theme> {
    [ThemeLevel::Origin, ThemeLevel::Adventure, ThemeLevel::Greatness]
        .into_iter()
        .map(|level| Theme {
            id: level.to_string(),
            name: level.to_string(),
            level,
            tag_ids: levels
                .iter()
                .filter(|(_, l)| **l == level)
                .map(|(id, _)| id.clone())
                .collect(),
        })
        .filter(|t| !t.tag_ids.is_empty())
        .collect()
}

/// Human-readable name of a tag state.
pub fn state_label(state: TagState) -> &'static str {
    match state {
        TagState::Unselected => "-",
        TagState::Negative => "negative",
        TagState::Positive => "positive",
        TagState::Burned => "burned",
    }
}
