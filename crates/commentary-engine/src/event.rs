//! Event kinds and their delivery priorities.
//!
//! `EventKind` is the closed set of match happenings the engine can narrate.
//! Adding a kind means adding its templates, its priority class, and its
//! placeholder slot names here.

use serde::{Deserialize, Serialize};

/// A kind of match event that may produce commentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Kickoff,
    Goal,
    Pass,
    LongPass,
    ShotOnTarget,
    ShotOffTarget,
    Save,
    TackleSuccess,
    TackleFail,
    Foul,
    YellowCard,
    RedCard,
    PossessionChange,
    DribbleSuccess,
    Interception,
    HalfTime,
    FullTime,
    CornerKick,
    FreeKick,
    Substitution,
    BuildUp,
}

/// Delivery priority classes, low to high. Only the relative order matters:
/// possession chatter yields to everything, goals and red cards preempt
/// everything.
pub mod priority {
    pub const AMBIENT: u8 = 1;
    pub const PASS: u8 = 2;
    pub const SET_PIECE: u8 = 3;
    pub const TURNOVER: u8 = 4;
    pub const SAVE: u8 = 5;
    pub const SHOT: u8 = 6;
    pub const MILESTONE: u8 = 7;
    pub const GOAL: u8 = 8;

    pub const MAX: u8 = GOAL;
}

impl EventKind {
    /// Queue priority for commentary of this kind.
    pub fn priority(self) -> u8 {
        use EventKind::*;
        match self {
            PossessionChange => priority::AMBIENT,
            Pass | LongPass | BuildUp => priority::PASS,
            TackleSuccess | TackleFail | Foul | CornerKick | FreeKick | Substitution => {
                priority::SET_PIECE
            }
            DribbleSuccess | Interception => priority::TURNOVER,
            Save => priority::SAVE,
            ShotOnTarget | ShotOffTarget => priority::SHOT,
            YellowCard | Kickoff | HalfTime | FullTime => priority::MILESTONE,
            Goal | RedCard => priority::GOAL,
        }
    }

    /// Named placeholder slots for this kind, in parameter order.
    ///
    /// A template variant may reference a parameter either positionally
    /// (`{0}`, `{1}`, ...) or by the slot name listed here.
    pub fn slot_names(self) -> &'static [&'static str] {
        use EventKind::*;
        match self {
            Kickoff => &["home", "away"],
            Goal => &["scorer", "team", "home", "away"],
            Pass | LongPass | BuildUp => &["from", "to", "team"],
            ShotOnTarget | ShotOffTarget => &["player", "team"],
            Save => &["keeper", "player"],
            TackleSuccess | TackleFail => &["tackler", "player"],
            Foul | YellowCard | RedCard => &["player", "opponent"],
            PossessionChange | CornerKick | FreeKick => &["team"],
            DribbleSuccess => &["player"],
            Interception => &["player", "team"],
            HalfTime | FullTime => &["home", "home_score", "away", "away_score"],
            Substitution => &["incoming", "outgoing"],
        }
    }

    /// All kinds, for iteration in tests and template audits.
    pub fn all() -> &'static [EventKind] {
        use EventKind::*;
        &[
            Kickoff,
            Goal,
            Pass,
            LongPass,
            ShotOnTarget,
            ShotOffTarget,
            Save,
            TackleSuccess,
            TackleFail,
            Foul,
            YellowCard,
            RedCard,
            PossessionChange,
            DribbleSuccess,
            Interception,
            HalfTime,
            FullTime,
            CornerKick,
            FreeKick,
            Substitution,
            BuildUp,
        ]
    }
}
