//! The transient state of one roll dialog.
//!
//! A [`RollSession`] tracks which tags are engaged and at what polarity,
//! keeps at most one tag burned across every pool, and recomputes total
//! power after each mutation. Sessions are never persisted: they start
//! zeroed and are reset once the roll completes or is cancelled.

pub mod feed;

pub use feed::{TagFeed, TagSource};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::might::{Might, Theme, roll_might};
use crate::power::{PowerBreakdown, TagPartition, Term, TooltipLine, coerce_modifier};
use crate::story::{SharedConfig, StoryTheme};
use crate::sync::{PeerChannel, PeerEvent, SessionDelta};
use crate::tag::{Tag, TagState, TagType};

/// An immutable view of a session after a change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Acting actor.
    pub actor_id: String,
    /// Free modifier.
    pub modifier: i32,
    /// Every engaged tag with its polarity.
    pub engaged: Vec<Tag>,
    /// Linear power terms.
    pub breakdown: PowerBreakdown,
    /// Tier advantage.
    pub might: Might,
    /// Linear power plus the might bonus.
    pub total_power: i32,
}

impl SessionSnapshot {
    /// Engaged tags currently burned.
    pub fn burned(&self) -> impl Iterator<Item = &Tag> {
        self.engaged.iter().filter(|t| t.state == TagState::Burned)
    }
}

/// Receives a snapshot after every session mutation.
pub trait SessionObserver {
    /// Called with the new state.
    fn on_change(&mut self, snapshot: &SessionSnapshot);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionSnapshot),
{
    fn on_change(&mut self, snapshot: &SessionSnapshot) {
        self(snapshot);
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Character(usize),
    Adhoc(usize),
    ThemeTitle(usize),
    ThemeTag(usize, usize),
}

/// The authoritative engaged-tag state of one roll.
pub struct RollSession {
    actor_id: String,
    config: EngineConfig,
    shared: SharedConfig,
    themes: Vec<Theme>,
    feed: TagFeed,
    character_tags: Vec<Tag>,
    tag_state: Vec<Tag>,
    story_themes: Vec<StoryTheme>,
    modifier: i32,
    observers: Vec<Box<dyn SessionObserver>>,
    peer: Option<Box<dyn PeerChannel>>,
}

impl std::fmt::Debug for RollSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollSession")
            .field("actor_id", &self.actor_id)
            .field("character_tags", &self.character_tags)
            .field("tag_state", &self.tag_state)
            .field("story_themes", &self.story_themes)
            .field("modifier", &self.modifier)
            .finish_non_exhaustive()
    }
}

impl RollSession {
    /// Start a zeroed session for `actor_id`.
    ///
    /// Story theme polarities left over from an earlier roll are cleared,
    /// both locally and in the shared configuration.
    pub fn new(actor_id: impl Into<String>, config: EngineConfig, shared: SharedConfig) -> Self {
        let actor_id = actor_id.into();
        shared.update(|c| c.story_themes.iter_mut().for_each(StoryTheme::clear_states));

        let mut story_themes = shared.read().story_themes;
        for theme in &mut story_themes {
            theme.classify_tags();
        }
        let feed = TagFeed::from_story(&shared.read(), &actor_id);

        debug!(actor = %actor_id, themes = story_themes.len(), "roll session started");
        Self {
            actor_id,
            config,
            shared,
            themes: Vec::new(),
            feed,
            character_tags: Vec::new(),
            tag_state: Vec::new(),
            story_themes,
            modifier: 0,
            observers: Vec::new(),
            peer: None,
        }
    }

    /// Set the acting actor's themes, used to look up tag tiers.
    pub fn with_themes(mut self, themes: Vec<Theme>) -> Self {
        self.themes = themes;
        self
    }

    /// Set the tags available to engage.
    pub fn with_feed(mut self, feed: TagFeed) -> Self {
        self.feed = feed;
        self
    }

    /// Mirror every change to other peers.
    pub fn with_peer(mut self, peer: Box<dyn PeerChannel>) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Register an observer for every change.
    pub fn observe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Acting actor.
    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Session configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared story configuration this session writes to.
    pub fn shared(&self) -> &SharedConfig {
        &self.shared
    }

    /// The acting actor's themes.
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    /// Free modifier.
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// Tags added from the character sheet.
    pub fn character_tags(&self) -> &[Tag] {
        &self.character_tags
    }

    /// Story themes with their current polarities.
    pub fn story_themes(&self) -> &[StoryTheme] {
        &self.story_themes
    }

    /// Re-read the available tags from a source.
    pub fn refresh(&mut self, source: &dyn TagSource) {
        self.feed = source.feed(&self.actor_id);
        self.changed();
    }

    /// Engage a tag that is not yet tracked.
    ///
    /// A polarity the tag does not offer is narrowed to one it does. Tags
    /// without a name and tags that are already tracked are ignored.
    pub fn engage(&mut self, mut tag: Tag, state: TagState) -> bool {
        if tag.name.trim().is_empty() {
            debug!(tag = %tag.id, "nameless tag not engaged");
            return false;
        }
        if self.locate(&tag.id).is_some() {
            debug!(tag = %tag.id, "tag already engaged");
            return false;
        }

        tag.state = admit(&tag, state);
        let burned = tag.state == TagState::Burned;
        let id = tag.id.clone();
        if tag.kind.is_character_owned() || tag.kind == TagType::WeaknessTag {
            self.character_tags.push(tag);
        } else {
            self.tag_state.push(tag);
        }
        if burned {
            self.demote_burned_except(&id);
        }
        self.changed();
        true
    }

    /// Add a tag selected on the character sheet.
    ///
    /// Weaknesses are engaged negatively; any other tag positively, or
    /// burned when `to_burn` is set.
    pub fn add_character_tag(&mut self, tag: Tag, to_burn: bool) -> bool {
        let state = if tag.kind == TagType::WeaknessTag {
            TagState::Negative
        } else if to_burn {
            TagState::Burned
        } else {
            TagState::Positive
        };
        self.engage(tag, state)
    }

    /// Copy the active and burnt flags of a sheet tag onto its engaged copy.
    pub fn update_character_tag(&mut self, tag: &Tag) {
        let Some(engaged) = self.character_tags.iter_mut().find(|t| t.id == tag.id) else {
            warn!(tag = %tag.id, "update for a tag not in the roll ignored");
            return;
        };
        engaged.is_active = tag.is_active;
        engaged.is_burnt = tag.is_burnt;
        self.changed();
    }

    /// Change the polarity of a tracked or available tag.
    ///
    /// Available tags that are not yet tracked are copied into the session
    /// on first engagement. Burning a tag demotes every other burned tag to
    /// positive. Unknown ids are ignored.
    pub fn set_polarity(&mut self, tag_id: &str, state: TagState) -> bool {
        let applied = match self.locate(tag_id) {
            Some(slot) => self.apply(slot, state),
            None => match self.feed.find(tag_id) {
                Some(tag) => {
                    let mut tag = tag.clone();
                    tag.state = admit(&tag, state);
                    let applied = tag.state;
                    self.tag_state.push(tag);
                    applied
                }
                None => {
                    warn!(tag = %tag_id, "polarity change for unknown tag ignored");
                    return false;
                }
            },
        };

        if applied == TagState::Burned {
            self.demote_burned_except(tag_id);
        }
        self.write_story_states();
        self.changed();
        true
    }

    /// Drop a tag from the roll. Calling it again has no effect.
    pub fn disengage(&mut self, tag_id: &str) -> bool {
        let before = self.character_tags.len() + self.tag_state.len();
        self.character_tags.retain(|t| t.id != tag_id);
        self.tag_state.retain(|t| t.id != tag_id);
        let mut removed = before != self.character_tags.len() + self.tag_state.len();

        let mut themes_changed = false;
        for theme in &mut self.story_themes {
            if theme.id == tag_id && theme.state.is_engaged() {
                theme.state = TagState::Unselected;
                themes_changed = true;
            }
            for tag in theme.tags.iter_mut().filter(|t| t.id == tag_id) {
                if tag.state.is_engaged() {
                    tag.state = TagState::Unselected;
                    themes_changed = true;
                }
            }
        }
        removed |= themes_changed;

        if !removed {
            return false;
        }
        if themes_changed {
            self.write_story_states();
        }
        self.changed();
        true
    }

    /// Replace the free modifier.
    pub fn set_modifier(&mut self, modifier: i32) {
        self.modifier = modifier;
        self.changed();
    }

    /// Replace the free modifier from form text; non-numbers count as 0.
    pub fn set_modifier_text(&mut self, raw: &str) {
        self.set_modifier(coerce_modifier(raw));
    }

    /// Every engaged tag that counts toward the roll.
    ///
    /// Inactive character tags are excluded.
    pub fn engaged_tags(&self) -> Vec<Tag> {
        let adhoc = self.tag_state.iter().filter(|t| t.state.is_engaged()).cloned();
        let character = self
            .character_tags
            .iter()
            .filter(|t| t.is_active && t.state.is_engaged())
            .cloned();
        let themes = self.story_themes.iter().flat_map(|theme| {
            let title = theme.state.is_engaged().then(|| theme.title_tag());
            title
                .into_iter()
                .chain(theme.tags.iter().filter(|t| t.state.is_engaged()).cloned())
        });
        adhoc.chain(character).chain(themes).collect()
    }

    /// Recompute power and might from the engaged tags.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.evaluate(self.engaged_tags(), self.modifier)
    }

    /// Score an arbitrary engaged set with this session's themes and feed.
    pub(crate) fn evaluate(&self, engaged: Vec<Tag>, modifier: i32) -> SessionSnapshot {
        let partition = TagPartition::from_tags(&engaged);
        let mut breakdown = self.config.calculator().calculate(&partition, modifier);

        let (opposing, own): (Vec<&Tag>, Vec<&Tag>) =
            engaged.iter().partition(|t| self.feed.is_opposing(&t.id));
        let might = roll_might(self.themes.as_slice(), own, opposing);
        let bonus = might.bonus(self.config.might_weight);
        if let Some(label) = might.label() {
            breakdown.tooltip.push(TooltipLine {
                term: Term::Might,
                label: label.to_string(),
                delta: bonus,
            });
        }

        SessionSnapshot {
            actor_id: self.actor_id.clone(),
            modifier,
            total_power: breakdown.total_power.saturating_add(bonus),
            engaged,
            breakdown,
            might,
        }
    }

    /// Linear power plus the might bonus.
    pub fn total_power(&self) -> i32 {
        self.snapshot().total_power
    }

    /// The pools a peer needs to mirror this session.
    pub fn delta(&self) -> SessionDelta {
        let mut delta = SessionDelta::new(self.actor_id.clone());
        delta.character_tags = Some(self.character_tags.clone());
        delta.tag_state = Some(self.tag_state.clone());
        delta.modifier = Some(self.modifier);
        delta
    }

    /// Apply an event from another peer.
    ///
    /// Updates for this actor replace the pools they carry wholesale.
    /// Events are never re-broadcast.
    pub fn receive(&mut self, event: &PeerEvent) {
        match event {
            PeerEvent::UpdateRollDialog(delta) => {
                if delta.actor_id != self.actor_id {
                    return;
                }
                if let Some(tags) = &delta.character_tags {
                    self.character_tags = tags.clone();
                }
                if let Some(tags) = &delta.tag_state {
                    self.tag_state = tags.clone();
                }
                if let Some(modifier) = delta.modifier {
                    self.modifier = modifier;
                }
                debug!(actor = %self.actor_id, delta = %delta.id, "peer update applied");
                self.notify();
            }
            PeerEvent::ResetRollDialog { actor_id } if *actor_id == self.actor_id => {
                self.clear();
                self.notify();
            }
            PeerEvent::ResetRollDialog { .. } | PeerEvent::BurnStoryTag { .. } => {}
        }
    }

    /// Empty every pool and zero the modifier, then tell peers to do the same.
    pub fn reset(&mut self) {
        self.clear();
        self.notify();
        if let Some(peer) = self.peer.as_mut() {
            peer.broadcast(&PeerEvent::ResetRollDialog {
                actor_id: self.actor_id.clone(),
            });
        }
    }

    fn clear(&mut self) {
        self.character_tags.clear();
        self.tag_state.clear();
        self.modifier = 0;
        for theme in &mut self.story_themes {
            theme.clear_states();
        }
        self.write_story_states();
        debug!(actor = %self.actor_id, "roll session reset");
    }

    fn locate(&self, tag_id: &str) -> Option<Slot> {
        if let Some(i) = self.character_tags.iter().position(|t| t.id == tag_id) {
            return Some(Slot::Character(i));
        }
        if let Some(i) = self.tag_state.iter().position(|t| t.id == tag_id) {
            return Some(Slot::Adhoc(i));
        }
        for (i, theme) in self.story_themes.iter().enumerate() {
            if theme.id == tag_id {
                return Some(Slot::ThemeTitle(i));
            }
            if let Some(j) = theme.tags.iter().position(|t| t.id == tag_id) {
                return Some(Slot::ThemeTag(i, j));
            }
        }
        None
    }

    fn apply(&mut self, slot: Slot, state: TagState) -> TagState {
        match slot {
            Slot::Character(i) => set_admitted(&mut self.character_tags[i], state),
            Slot::Adhoc(i) => set_admitted(&mut self.tag_state[i], state),
            Slot::ThemeTitle(i) => {
                let theme = &mut self.story_themes[i];
                theme.state = admit(&theme.title_tag(), state);
                theme.state
            }
            Slot::ThemeTag(i, j) => set_admitted(&mut self.story_themes[i].tags[j], state),
        }
    }

    fn demote_burned_except(&mut self, keep: &str) {
        let mut demoted = 0;
        let pools = self
            .character_tags
            .iter_mut()
            .chain(self.tag_state.iter_mut())
            .chain(self.story_themes.iter_mut().flat_map(|t| t.tags.iter_mut()));
        for tag in pools.filter(|t| t.id != keep && t.state == TagState::Burned) {
            tag.state = TagState::Positive;
            demoted += 1;
        }
        for theme in &mut self.story_themes {
            if theme.id != keep && theme.state == TagState::Burned {
                theme.state = TagState::Positive;
                demoted += 1;
            }
        }

        // Available tags arriving already burned are tracked as positive.
        let arrivals: Vec<Tag> = self
            .feed
            .iter()
            .filter(|t| t.id != keep && t.state == TagState::Burned)
            .filter(|t| !self.tag_state.iter().any(|s| s.id == t.id))
            .map(|t| t.clone().with_state(TagState::Positive))
            .collect();
        demoted += arrivals.len();
        self.tag_state.extend(arrivals);

        if demoted > 0 {
            debug!(kept = %keep, demoted, "other burned tags demoted");
        }
    }

    fn write_story_states(&self) {
        if self.story_themes.is_empty() {
            return;
        }
        self.shared.update(|config| {
            for shared in &mut config.story_themes {
                let Some(local) = self.story_themes.iter().find(|t| t.id == shared.id) else {
                    continue;
                };
                shared.state = local.state;
                for tag in &mut shared.tags {
                    if let Some(l) = local.tags.iter().find(|t| t.id == tag.id) {
                        tag.state = l.state;
                    }
                }
            }
        });
    }

    fn changed(&mut self) {
        self.notify();
        let delta = self.delta();
        if let Some(peer) = self.peer.as_mut() {
            peer.broadcast(&PeerEvent::UpdateRollDialog(delta));
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        debug!(actor = %self.actor_id, total = snapshot.total_power, "session changed");
        for observer in &mut self.observers {
            observer.on_change(&snapshot);
        }
    }
}

/// Narrow `state` to one the tag offers.
fn admit(tag: &Tag, state: TagState) -> TagState {
    if tag.allows(state) {
        return state;
    }
    if state == TagState::Burned && tag.allows(TagState::Positive) {
        return TagState::Positive;
    }
    TagState::Negative
}

fn set_admitted(tag: &mut Tag, state: TagState) -> TagState {
    tag.state = admit(tag, state);
    tag.state
}
