//! Rolling match context consulted by the event classifier.

/// What the engine remembers about the match between events.
///
/// Created at match start, mutated by every handler, reset at full time and
/// on shutdown.
#[derive(Debug, Clone, Default)]
pub struct MatchContext {
    pub home_team: String,
    pub away_team: String,
    pub last_from_player: String,
    pub last_to_player: String,
    pub consecutive_passes: u32,
    pub last_possession_team: String,
    pub exciting_moment: bool,
}

/// What one pass event looked like against the rolling context.
#[derive(Debug, Clone, Copy)]
pub struct PassObservation {
    /// Length of the current unbroken pass chain, this pass included.
    pub streak: u32,
    /// The pair `(from, to)` is identical to the immediately preceding pass.
    pub repeated_pair: bool,
}

impl MatchContext {
    /// Records a pass and reports the streak/dedup view of it.
    ///
    /// The streak grows only while each pass starts from the previous
    /// receiver; any other source resets it to 1.
    pub fn record_pass(&mut self, from: &str, to: &str) -> PassObservation {
        let streak = if !self.last_to_player.is_empty() && from == self.last_to_player {
            self.consecutive_passes + 1
        } else {
            1
        };
        let repeated_pair = from == self.last_from_player && to == self.last_to_player;

        self.consecutive_passes = streak;
        self.last_from_player = from.to_string();
        self.last_to_player = to.to_string();

        PassObservation {
            streak,
            repeated_pair,
        }
    }

    /// Records a possession change; returns true when the team actually
    /// changed. A real change breaks any pass streak; a repeat report of
    /// the same team leaves it intact.
    pub fn record_possession(&mut self, team: &str) -> bool {
        let changed = team != self.last_possession_team;
        if changed {
            self.last_possession_team = team.to_string();
            self.consecutive_passes = 0;
        }
        changed
    }

    /// An interception breaks the pass streak.
    pub fn record_interception(&mut self) {
        self.consecutive_passes = 0;
    }

    /// Clears per-match state, keeping nothing.
    pub fn reset(&mut self) {
        *self = MatchContext::default();
    }
}
