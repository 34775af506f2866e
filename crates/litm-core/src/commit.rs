//! Finishing a roll.
//!
//! Committing hands the final engaged set to a [`CommitSink`] and resets the
//! session. Players may be held back by GM moderation. After a roll,
//! [`Consequences`] lists the tags it used up and the experience it earned.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{LitmError, LitmResult};
use crate::might::{Might, Theme};
use crate::power::PowerBreakdown;
use crate::session::RollSession;
use crate::story::{Fellowship, SharedConfig};
use crate::sync::{PeerChannel, PeerEvent};
use crate::tag::{Tag, TagId, TagState};

/// How a roll's result is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollType {
    /// Resolve the action with no spendable power.
    Quick,
    /// Spend power on tracked effects.
    #[default]
    Tracked,
    /// Spend power to reduce consequences.
    Mitigate,
}

impl RollType {
    /// Wire name of this roll type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Tracked => "tracked",
            Self::Mitigate => "mitigate",
        }
    }
}

impl std::fmt::Display for RollType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RollType {
    type Err = LitmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "tracked" => Ok(Self::Tracked),
            "mitigate" => Ok(Self::Mitigate),
            _ => Err(LitmError::UnknownRollType(s.to_string())),
        }
    }
}

/// What a player asks to roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollRequest {
    /// Acting actor.
    pub actor_id: String,
    /// Roll title shown with the result.
    #[serde(default)]
    pub title: String,
    /// How the result is spent.
    #[serde(default)]
    pub roll_type: RollType,
    /// Engaged tags with their polarities.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Free modifier.
    #[serde(default)]
    pub modifier: i32,
}

/// A roll held back until the GM approves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRequest {
    /// Request identifier.
    pub id: Uuid,
    /// The roll awaiting approval.
    pub request: RollRequest,
    /// Power the roll would have as requested.
    pub total_power: i32,
}

/// Who is committing a roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Authority {
    /// The user is the GM.
    pub is_gm: bool,
    /// The GM approved this roll.
    pub approved: bool,
}

impl Authority {
    /// The GM, who never needs moderation.
    pub fn gm() -> Self {
        Self {
            is_gm: true,
            approved: false,
        }
    }

    /// A player without approval.
    pub fn player() -> Self {
        Self::default()
    }

    /// The same user with the GM's approval.
    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }

    /// Returns true if this user may roll without waiting for the GM.
    pub fn may_roll(&self, config: &EngineConfig) -> bool {
        config.skip_moderation || self.is_gm || self.approved
    }
}

/// A finished roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollCommit {
    /// Commit identifier.
    pub id: Uuid,
    /// Acting actor.
    pub actor_id: String,
    /// Roll title.
    pub title: String,
    /// How the result is spent.
    pub roll_type: RollType,
    /// Linear power plus the might bonus.
    pub total_power: i32,
    /// Tier advantage.
    pub might: Might,
    /// Every linear term.
    pub breakdown: PowerBreakdown,
    /// Tags burned by this roll.
    pub burned_tags: Vec<Tag>,
    /// Single-use tags invoked positively, used up by this roll.
    pub single_use_consumed: Vec<Tag>,
    /// The first weakness invoked, which may earn experience.
    pub weakness_triggered: Option<Tag>,
    /// When the roll was committed.
    pub committed_at: DateTime<Utc>,
}

/// Receives committed rolls.
pub trait CommitSink {
    /// Record one finished roll.
    fn submit_roll(&mut self, commit: &RollCommit);
}

impl CommitSink for Vec<RollCommit> {
    fn submit_roll(&mut self, commit: &RollCommit) {
        self.push(commit.clone());
    }
}

impl RollSession {
    /// The current engaged set as a roll request.
    pub fn request(&self, title: impl Into<String>, roll_type: RollType) -> RollRequest {
        RollRequest {
            actor_id: self.actor_id().to_string(),
            title: title.into(),
            roll_type,
            tags: self.engaged_tags(),
            modifier: self.modifier(),
        }
    }

    /// Wrap a request for the GM to approve.
    pub fn moderation_request(&self, request: RollRequest) -> ModerationRequest {
        let total_power = self.evaluate(request.tags.clone(), request.modifier).total_power;
        ModerationRequest {
            id: Uuid::new_v4(),
            request,
            total_power,
        }
    }

    /// Commit a roll and reset the session.
    ///
    /// Fails with [`LitmError::ModerationRequired`] when moderation is on and
    /// the user is neither the GM nor approved; the session is left as is.
    pub fn commit(
        &mut self,
        request: RollRequest,
        authority: Authority,
        sink: &mut dyn CommitSink,
    ) -> LitmResult<RollCommit> {
        if !authority.may_roll(self.config()) {
            warn!(actor = %request.actor_id, "roll held for moderation");
            return Err(LitmError::ModerationRequired {
                actor: request.actor_id,
            });
        }

        let snapshot = self.evaluate(request.tags, request.modifier);
        let burned_tags: Vec<Tag> = snapshot.burned().cloned().collect();
        let single_use_consumed = snapshot
            .engaged
            .iter()
            .filter(|t| t.is_single_use && t.state == TagState::Positive)
            .filter(|t| !t.kind.is_status())
            .cloned()
            .collect();
        // Any non-status tag invoked against the roll counts as its weakness.
        let weakness_triggered = snapshot
            .engaged
            .iter()
            .find(|t| !t.kind.is_status() && t.state == TagState::Negative)
            .cloned();

        let commit = RollCommit {
            id: Uuid::new_v4(),
            actor_id: request.actor_id,
            title: request.title,
            roll_type: request.roll_type,
            total_power: snapshot.total_power,
            might: snapshot.might,
            breakdown: snapshot.breakdown,
            burned_tags,
            single_use_consumed,
            weakness_triggered,
            committed_at: Utc::now(),
        };

        sink.submit_roll(&commit);
        info!(
            actor = %commit.actor_id,
            roll = %commit.roll_type,
            power = commit.total_power,
            might = commit.might.value(),
            "roll committed"
        );
        self.reset();
        Ok(commit)
    }
}

/// Experience earned by invoking a weakness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "themeId", rename_all = "camelCase")]
pub enum ExperienceGain {
    /// One experience on the character theme that owns the weakness.
    Theme(String),
    /// One experience on the fellowship theme.
    Fellowship,
}

/// What a committed roll uses up and earns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consequences {
    /// Character sheet tags to mark burnt.
    pub sheet_burns: Vec<Tag>,
    /// Story tags the GM must burn.
    pub story_burns: Vec<Tag>,
    /// Experience from the triggered weakness.
    pub experience: Option<ExperienceGain>,
}

impl Consequences {
    /// Work out the consequences of a roll for the actor's themes.
    pub fn of(
        commit: &RollCommit,
        themes: &[Theme],
        fellowship: &Fellowship,
        config: &EngineConfig,
    ) -> Self {
        let mut out = Self::default();
        for tag in commit.burned_tags.iter().chain(&commit.single_use_consumed) {
            if tag.kind.is_character_owned() {
                out.sheet_burns.push(tag.clone());
            } else {
                out.story_burns.push(tag.clone());
            }
        }

        out.experience = commit.weakness_triggered.as_ref().and_then(|weakness| {
            if let Some(theme) = themes.iter().find(|t| t.tag_ids.contains(&weakness.id)) {
                return Some(ExperienceGain::Theme(theme.id.clone()));
            }
            let room = fellowship.experience < config.max_fellowship_experience;
            (room && fellowship.has_weakness(&weakness.id)).then_some(ExperienceGain::Fellowship)
        });
        out
    }

    /// Ids of the character sheet tags to mark burnt.
    pub fn sheet_burn_ids(&self) -> Vec<TagId> {
        self.sheet_burns.iter().map(|t| t.id.clone()).collect()
    }

    /// Apply the story side of the consequences.
    ///
    /// The GM burns story tags directly; anyone else asks the GM through the
    /// peer channel. Fellowship experience is written to the shared config
    /// without exceeding the configured cap.
    pub fn apply(
        &self,
        shared: &SharedConfig,
        authority: Authority,
        peer: &mut dyn PeerChannel,
        config: &EngineConfig,
    ) {
        for tag in &self.story_burns {
            if authority.is_gm {
                if !shared.update_with(|c| c.burn_tag(&tag.id)) {
                    warn!(tag = %tag.id, "burnt tag not found in story");
                }
            } else {
                peer.broadcast(&PeerEvent::BurnStoryTag { tag: tag.clone() });
            }
        }

        if self.experience == Some(ExperienceGain::Fellowship) {
            let cap = config.max_fellowship_experience;
            shared.update(|c| {
                if c.fellowship.experience < cap {
                    c.fellowship.experience += 1;
                }
            });
            debug!(cap, "fellowship experience marked");
        }
    }
}

/// Handle a player's request to burn a story tag. Only the GM acts on it.
///
/// Returns true if a tag was burnt.
pub fn handle_burn_request(shared: &SharedConfig, authority: Authority, event: &PeerEvent) -> bool {
    let PeerEvent::BurnStoryTag { tag } = event else {
        return false;
    };
    if !authority.is_gm {
        return false;
    }
    let burnt = shared.update_with(|c| c.burn_tag(&tag.id));
    if burnt {
        info!(tag = %tag.id, "story tag burnt on request");
    } else {
        warn!(tag = %tag.id, "burn request for unknown story tag");
    }
    burnt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryConfig;
    use crate::sync::Outbox;
    use crate::tag::{TagType, ThemeLevel};

    fn session(config: EngineConfig) -> RollSession {
        let shared = SharedConfig::new(StoryConfig {
            tags: vec![Tag::new("fog", "Thick Fog", TagType::StoryTag)],
            fellowship: Fellowship {
                name: "Company".into(),
                weakness: vec![Tag::new("squabbling", "Squabbling", TagType::WeaknessTag)],
                experience: 2,
                ..Fellowship::default()
            },
            ..StoryConfig::default()
        });
        RollSession::new("hero", config, shared)
    }

    fn themes() -> Vec<Theme> {
        vec![Theme {
            id: "knight".into(),
            name: "Knight".into(),
            level: ThemeLevel::Adventure,
            tag_ids: vec!["sword".into(), "coward".into()],
        }]
    }

    #[test]
    fn roll_type_parsing() {
        assert_eq!("Quick".parse::<RollType>().unwrap(), RollType::Quick);
        assert_eq!(RollType::default(), RollType::Tracked);
        assert!(matches!(
            "epic".parse::<RollType>(),
            Err(LitmError::UnknownRollType(s)) if s == "epic"
        ));
        assert_eq!(serde_json::to_string(&RollType::Mitigate).unwrap(), r#""mitigate""#);
    }

    #[test]
    fn commit_submits_once_and_resets() {
        let mut s = session(EngineConfig::default()).with_themes(themes());
        s.add_character_tag(Tag::new("sword", "Sword", TagType::PowerTag), false);
        s.add_character_tag(Tag::new("coward", "Coward", TagType::WeaknessTag), false);
        s.add_character_tag(Tag::new("rope", "Rope", TagType::BackpackTag).single_use(), false);
        s.set_polarity("fog", TagState::Burned);

        let mut sink = Vec::new();
        let request = s.request("Charge", RollType::Tracked);
        let commit = s.commit(request, Authority::player(), &mut sink).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0], commit);
        assert_eq!(commit.title, "Charge");
        assert_eq!(commit.breakdown.total_power, 3 + 2 - 1);
        assert_eq!(commit.might.value(), 1);
        assert_eq!(commit.total_power, 4 + 3);
        assert_eq!(commit.burned_tags.len(), 1);
        assert_eq!(commit.single_use_consumed[0].id, "rope");
        assert_eq!(commit.weakness_triggered.as_ref().map(|t| t.id.as_str()), Some("coward"));
        assert!(s.engaged_tags().is_empty());
    }

    #[test]
    fn negative_story_tag_is_the_triggered_weakness() {
        let mut s = session(EngineConfig::default()).with_themes(themes());
        s.set_polarity("fog", TagState::Negative);
        s.engage(Tag::status("hurt", "Hurt", 2), TagState::Negative);

        let request = s.request("Sneak", RollType::Quick);
        let commit = s.commit(request, Authority::player(), &mut Vec::new()).unwrap();
        assert_eq!(commit.weakness_triggered.as_ref().map(|t| t.id.as_str()), Some("fog"));

        let fellowship = s.shared().read().fellowship;
        let consequences = Consequences::of(&commit, s.themes(), &fellowship, s.config());
        assert_eq!(consequences.experience, None);
    }

    #[test]
    fn moderation_holds_players_back() {
        let mut s = session(EngineConfig::default().with_moderation());
        s.add_character_tag(Tag::new("sword", "Sword", TagType::PowerTag), false);
        let mut sink = Vec::new();

        let request = s.request("Charge", RollType::Quick);
        let held = s.commit(request.clone(), Authority::player(), &mut sink);
        assert!(matches!(held, Err(LitmError::ModerationRequired { actor }) if actor == "hero"));
        assert!(sink.is_empty());
        assert_eq!(s.engaged_tags().len(), 1);

        let pending = s.moderation_request(request.clone());
        assert_eq!(pending.total_power, 1);

        s.commit(request.clone(), Authority::player().approved(), &mut sink).unwrap();
        assert_eq!(sink.len(), 1);

        s.commit(request, Authority::gm(), &mut sink).unwrap();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn consequences_route_burns_and_experience() {
        let mut s = session(EngineConfig::default()).with_themes(themes());
        s.add_character_tag(Tag::new("sword", "Sword", TagType::PowerTag), true);
        s.add_character_tag(Tag::new("coward", "Coward", TagType::WeaknessTag), false);
        s.engage(Tag::new("ally", "Old Ally", TagType::StoryTag).single_use(), TagState::Positive);

        let request = s.request("Strike", RollType::Tracked);
        let commit = s.commit(request, Authority::gm(), &mut Vec::new()).unwrap();
        let fellowship = s.shared().read().fellowship;
        let consequences = Consequences::of(&commit, s.themes(), &fellowship, s.config());

        assert_eq!(consequences.sheet_burn_ids(), vec!["sword".to_string()]);
        assert_eq!(consequences.story_burns[0].id, "ally");
        assert_eq!(consequences.experience, Some(ExperienceGain::Theme("knight".into())));
    }

    #[test]
    fn fellowship_weakness_earns_capped_experience() {
        let config = EngineConfig::default();
        let mut s = session(config.clone());
        s.add_character_tag(Tag::new("squabbling", "Squabbling", TagType::WeaknessTag), false);
        let request = s.request("Argue", RollType::Quick);
        let commit = s.commit(request, Authority::player(), &mut Vec::new()).unwrap();

        let shared = s.shared().clone();
        let mut outbox = Outbox::default();
        let consequences = Consequences::of(&commit, &[], &shared.read().fellowship, &config);
        assert_eq!(consequences.experience, Some(ExperienceGain::Fellowship));
        consequences.apply(&shared, Authority::player(), &mut outbox, &config);
        assert_eq!(shared.read().fellowship.experience, 3);

        let again = Consequences::of(&commit, &[], &shared.read().fellowship, &config);
        assert_eq!(again.experience, None);
    }

    #[test]
    fn players_ask_the_gm_to_burn_story_tags() {
        let config = EngineConfig::default();
        let mut s = session(config.clone());
        s.set_polarity("fog", TagState::Burned);
        let request = s.request("Vanish", RollType::Mitigate);
        let commit = s.commit(request, Authority::player(), &mut Vec::new()).unwrap();
        let shared = s.shared().clone();

        let consequences = Consequences::of(&commit, &[], &shared.read().fellowship, &config);
        let mut outbox = Outbox::default();
        consequences.apply(&shared, Authority::player(), &mut outbox, &config);
        assert!(!shared.read().tags[0].is_burnt);
        assert_eq!(outbox.sent.len(), 1);

        assert!(!handle_burn_request(&shared, Authority::player(), &outbox.sent[0]));
        assert!(handle_burn_request(&shared, Authority::gm(), &outbox.sent[0]));
        assert!(shared.read().tags[0].is_burnt);
    }

    #[test]
    fn gm_burns_story_tags_directly() {
        let config = EngineConfig::default();
        let mut s = session(config.clone());
        s.set_polarity("fog", TagState::Burned);
        let request = s.request("Vanish", RollType::Mitigate);
        let commit = s.commit(request, Authority::gm(), &mut Vec::new()).unwrap();
        let shared = s.shared().clone();

        let mut outbox = Outbox::default();
        Consequences::of(&commit, &[], &shared.read().fellowship, &config)
            .apply(&shared, Authority::gm(), &mut outbox, &config);
        assert!(outbox.sent.is_empty());
        assert!(shared.read().tags[0].is_burnt);
    }
}
