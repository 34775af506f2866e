//! Roll engine for Legend in the Mist.
//!
//! Classifies tag names written in bracket notation, computes the net power
//! of a roll from its engaged tags, resolves might from theme tiers, and
//! tracks the engaged-tag state of a roll dialog including the rule that at
//! most one tag is burned per roll. Committing, dice, and post-roll
//! consequences sit on top of the session.

pub mod challenge;
pub mod classify;
pub mod commit;
pub mod config;
pub mod dice;
pub mod error;
pub mod might;
pub mod power;
pub mod session;
pub mod story;
pub mod sync;
pub mod tag;

pub use challenge::target_tags;
pub use classify::{classify, classify_into, extract_bracketed, tag_id_for};
pub use commit::{
    Authority, CommitSink, Consequences, ExperienceGain, ModerationRequest, RollCommit,
    RollRequest, RollType, handle_burn_request,
};
pub use config::EngineConfig;
pub use dice::{Outcome, RollOutcome};
pub use error::{LitmError, LitmResult};
pub use might::{Might, NoThemes, Theme, ThemeLookup, roll_might};
pub use power::{PowerBreakdown, PowerCalculator, TagPartition, Term, TooltipLine};
pub use session::{RollSession, SessionObserver, SessionSnapshot, TagFeed, TagSource};
pub use story::{Fellowship, SharedConfig, StoryActor, StoryConfig, StoryTheme};
pub use sync::{Outbox, PeerChannel, PeerEvent, SessionDelta};
pub use tag::{StatusTrack, Tag, TagId, TagState, TagType, TagValue, ThemeLevel};
