//! Emission throttling: per-kind cooldowns plus a global spacing floor.
//!
//! The registry is deterministic: `allow` takes the current instant as a
//! parameter and never reads the wall clock itself. The engine owns a
//! [`Clock`] and passes timestamps in, which makes cooldown behavior fully
//! time-travelable under test.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::event::EventKind;

/// Source of "now" for throttling decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Tracks last-emit times and decides whether commentary of a kind is
/// currently allowed.
#[derive(Debug, Clone)]
pub struct ThrottleRegistry {
    default_cooldown: Duration,
    global_floor: Duration,
    kind_cooldowns: HashMap<EventKind, Duration>,
    bypass_global: HashSet<EventKind>,
    last_by_kind: HashMap<EventKind, Instant>,
    last_global: Option<Instant>,
}

impl ThrottleRegistry {
    pub fn new(
        default_cooldown: Duration,
        global_floor: Duration,
        kind_cooldowns: HashMap<EventKind, Duration>,
        bypass_global: HashSet<EventKind>,
    ) -> Self {
        Self {
            default_cooldown,
            global_floor,
            kind_cooldowns,
            bypass_global,
            last_by_kind: HashMap::new(),
            last_global: None,
        }
    }

    /// Effective cooldown for a kind.
    pub fn cooldown(&self, kind: EventKind) -> Duration {
        self.kind_cooldowns
            .get(&kind)
            .copied()
            .unwrap_or(self.default_cooldown)
    }

    /// Returns whether commentary of `kind` may be emitted at `now`, and on
    /// success records `now` as the last emission for the kind and globally.
    ///
    /// The very first call for a kind is always allowed (subject to the
    /// global floor). Kinds in the bypass set skip the floor check but still
    /// stamp the global timestamp, so routine chatter stays spaced out after
    /// an urgent call.
    pub fn allow(&mut self, kind: EventKind, now: Instant) -> bool {
        if !self.bypass_global.contains(&kind) {
            if let Some(last) = self.last_global {
                if now.duration_since(last) < self.global_floor {
                    return false;
                }
            }
        }

        if let Some(last) = self.last_by_kind.get(&kind) {
            if now.duration_since(*last) < self.cooldown(kind) {
                return false;
            }
        }

        self.last_by_kind.insert(kind, now);
        self.last_global = Some(now);
        true
    }

    /// Forgets all recorded emission times (match restart).
    pub fn reset(&mut self) {
        self.last_by_kind.clear();
        self.last_global = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(cooldown_ms: u64, floor_ms: u64) -> ThrottleRegistry {
        ThrottleRegistry::new(
            Duration::from_millis(cooldown_ms),
            Duration::from_millis(floor_ms),
            HashMap::new(),
            HashSet::from([EventKind::Goal, EventKind::RedCard]),
        )
    }

    #[test]
    fn test_first_call_is_allowed() {
        let mut reg = registry(2000, 0);
        assert!(reg.allow(EventKind::Pass, Instant::now()));
    }

    #[test]
    fn test_within_cooldown_denied_after_denied_again_allowed() {
        let mut reg = registry(2000, 0);
        let t0 = Instant::now();

        assert!(reg.allow(EventKind::Pass, t0));
        // t + C - epsilon
        assert!(!reg.allow(EventKind::Pass, t0 + Duration::from_millis(1999)));
        // the denied call must not have stamped a new time
        assert!(reg.allow(EventKind::Pass, t0 + Duration::from_millis(2001)));
    }

    #[test]
    fn test_global_floor_gates_across_kinds() {
        let mut reg = registry(0, 3000);
        let t0 = Instant::now();

        assert!(reg.allow(EventKind::Pass, t0));
        assert!(!reg.allow(EventKind::Save, t0 + Duration::from_millis(1000)));
        assert!(reg.allow(EventKind::Save, t0 + Duration::from_millis(3000)));
    }

    #[test]
    fn test_bypass_kind_ignores_floor_but_stamps_it() {
        let mut reg = registry(0, 3000);
        let t0 = Instant::now();

        assert!(reg.allow(EventKind::Pass, t0));
        // goal lands inside the floor and is still allowed
        assert!(reg.allow(EventKind::Goal, t0 + Duration::from_millis(500)));
        // ...and pushes the floor forward for routine kinds
        assert!(!reg.allow(EventKind::Pass, t0 + Duration::from_millis(3200)));
        assert!(reg.allow(EventKind::Pass, t0 + Duration::from_millis(3600)));
    }

    #[test]
    fn test_per_kind_override() {
        let mut reg = ThrottleRegistry::new(
            Duration::from_millis(2000),
            Duration::ZERO,
            HashMap::from([(EventKind::Goal, Duration::ZERO)]),
            HashSet::new(),
        );
        let t0 = Instant::now();

        assert!(reg.allow(EventKind::Goal, t0));
        assert!(reg.allow(EventKind::Goal, t0)); // zero cooldown, same instant
        assert!(reg.allow(EventKind::Pass, t0));
        assert!(!reg.allow(EventKind::Pass, t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut reg = registry(5000, 5000);
        let t0 = Instant::now();

        assert!(reg.allow(EventKind::Pass, t0));
        assert!(!reg.allow(EventKind::Pass, t0 + Duration::from_millis(10)));
        reg.reset();
        assert!(reg.allow(EventKind::Pass, t0 + Duration::from_millis(10)));
    }
}
