//! The commentary engine: event handlers, policy, and lifecycle.
//!
//! One handler per match event. Each handler classifies the event against
//! the rolling context, applies sampling and cooldown policy, renders a
//! template, and enqueues the line for the render worker. Handlers never
//! block and never fail: bad input, throttling, and a full queue all end in
//! "no commentary", not an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::EngineConfig;
use crate::context::MatchContext;
use crate::event::EventKind;
use crate::narrator::Narrator;
use crate::queue::DispatchQueue;
use crate::templates::{default_templates, TemplateBank};
use crate::throttle::{Clock, SystemClock, ThrottleRegistry};
use crate::worker::RenderWorker;
use crate::EngineError;

/// Mutable state shared by all producers, guarded as one unit so
/// check-cooldown-then-record and context updates are atomic.
#[derive(Debug)]
struct EngineState {
    context: MatchContext,
    throttle: ThrottleRegistry,
    rng: SmallRng,
}

/// Live match commentary engine.
///
/// Handlers may be called from any thread; rendering happens on a dedicated
/// background worker so producers never wait on speech.
pub struct CommentaryEngine {
    config: EngineConfig,
    templates: TemplateBank,
    clock: Arc<dyn Clock>,
    queue: Arc<DispatchQueue>,
    worker: Mutex<RenderWorker>,
    state: Mutex<EngineState>,
    enabled: AtomicBool,
}

impl CommentaryEngine {
    /// Creates an engine with built-in templates and the system clock, and
    /// starts the render worker.
    pub fn new(config: EngineConfig, narrator: Arc<dyn Narrator>) -> Self {
        Self::with_parts(config, default_templates(), narrator, Arc::new(SystemClock))
    }

    /// Creates an engine from explicit parts. Tests inject a manual clock
    /// and a recording narrator here.
    pub fn with_parts(
        config: EngineConfig,
        templates: TemplateBank,
        narrator: Arc<dyn Narrator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let throttle = ThrottleRegistry::new(
            config.throttle.default_cooldown(),
            config.throttle.global_floor(),
            config.throttle.kind_cooldowns(),
            config.throttle.bypass_global.iter().copied().collect(),
        );
        let queue = Arc::new(DispatchQueue::new(config.delivery.queue_capacity));
        let worker = RenderWorker::spawn(
            Arc::clone(&queue),
            narrator,
            config.delivery.utterance_gap(),
        );

        Self {
            enabled: AtomicBool::new(config.enabled),
            config,
            templates,
            clock,
            queue,
            worker: Mutex::new(worker),
            state: Mutex::new(EngineState {
                context: MatchContext::default(),
                throttle,
                rng,
            }),
        }
    }

    /// Creates an engine from a configuration file.
    pub fn from_config_file(
        path: &std::path::Path,
        narrator: Arc<dyn Narrator>,
    ) -> Result<Self, EngineError> {
        let config = EngineConfig::from_file(path)?;
        Ok(Self::new(config, narrator))
    }

    // ---- lifecycle -------------------------------------------------------

    /// Stops intake, lets the worker drain what is already queued, and
    /// returns once the worker has exited. Idempotent; after this returns
    /// no further speech occurs and handlers are no-ops.
    pub fn shutdown(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.queue.close();
        if let Ok(mut worker) = self.worker.lock() {
            worker.join();
        }
        self.lock_state().context.reset();
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Lines dropped because the queue was full.
    pub fn dropped_items(&self) -> u64 {
        self.queue.dropped()
    }

    /// Lines queued but not yet spoken.
    pub fn pending_items(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- event handlers --------------------------------------------------

    /// Match kickoff. Resets context and cooldown history for a new match
    /// and remembers the team names for later score lines.
    pub fn on_match_start(&self, home_team: &str, away_team: &str) {
        if !self.is_enabled() || home_team.is_empty() || away_team.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        st.context.reset();
        st.throttle.reset();
        st.context.home_team = home_team.to_string();
        st.context.away_team = away_team.to_string();
        if self.gate(&mut st, EventKind::Kickoff, None) {
            self.render_and_enqueue(&mut st, EventKind::Kickoff, &[home_team, away_team]);
        }
    }

    /// A completed pass. Tracks streaks, skips literal repeats, and samples
    /// heavily: build-up streaks matter more than single passes.
    pub fn on_pass(&self, from: &str, to: &str, long_pass: bool) {
        if !self.is_enabled() || from.is_empty() || to.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        let obs = st.context.record_pass(from, to);
        if obs.repeated_pair {
            return;
        }

        let (kind, rate) = if obs.streak >= self.config.sampling.build_up_threshold {
            (EventKind::BuildUp, self.config.sampling.build_up_rate)
        } else if long_pass {
            (EventKind::LongPass, self.config.sampling.pass_rate)
        } else {
            (EventKind::Pass, self.config.sampling.pass_rate)
        };

        if self.gate(&mut st, kind, Some(rate)) {
            self.render_and_enqueue(&mut st, kind, &[from, to]);
        }
    }

    /// A shot at goal. Never sampled; raises the excitement flag.
    pub fn on_shot(&self, player: &str, team: &str, on_target: bool) {
        if !self.is_enabled() || player.is_empty() {
            return;
        }
        let kind = if on_target {
            EventKind::ShotOnTarget
        } else {
            EventKind::ShotOffTarget
        };
        let mut st = self.lock_state();
        st.context.exciting_moment = true;
        if self.gate(&mut st, kind, None) {
            self.render_and_enqueue(&mut st, kind, &[player, team]);
        }
    }

    /// A goal. Always emitted at maximum priority, regardless of cooldown
    /// state for anything else.
    pub fn on_goal(&self, scorer: &str, team: &str, home_score: u32, away_score: u32) {
        if !self.is_enabled() || scorer.is_empty() || team.is_empty() {
            return;
        }
        let home = home_score.to_string();
        let away = away_score.to_string();
        let mut st = self.lock_state();
        st.context.exciting_moment = true;
        if self.gate(&mut st, EventKind::Goal, None) {
            self.render_and_enqueue(&mut st, EventKind::Goal, &[scorer, team, &home, &away]);
        }
    }

    /// A goalkeeper save.
    pub fn on_save(&self, keeper: &str, shooter: &str) {
        if !self.is_enabled() || keeper.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(&mut st, EventKind::Save, None) {
            self.render_and_enqueue(&mut st, EventKind::Save, &[keeper, shooter]);
        }
    }

    /// A tackle attempt. Sampled; an unsuccessful tackle that drew a
    /// whistle reads as a foul, not as a missed challenge.
    pub fn on_tackle(&self, tackler: &str, tackled: &str, successful: bool, foul_given: bool) {
        if !self.is_enabled() || tackler.is_empty() {
            return;
        }
        let kind = if successful {
            EventKind::TackleSuccess
        } else if foul_given {
            EventKind::Foul
        } else {
            EventKind::TackleFail
        };
        let mut st = self.lock_state();
        if self.gate(&mut st, kind, Some(self.config.sampling.tackle_rate)) {
            self.render_and_enqueue(&mut st, kind, &[tackler, tackled]);
        }
    }

    /// A free-standing foul (no tackle context).
    pub fn on_foul(&self, fouler: &str, fouled: &str) {
        if !self.is_enabled() || fouler.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(&mut st, EventKind::Foul, None) {
            self.render_and_enqueue(&mut st, EventKind::Foul, &[fouler, fouled]);
        }
    }

    /// Half time, with the literal score.
    pub fn on_half_time(&self, home_score: u32, away_score: u32) {
        if !self.is_enabled() {
            return;
        }
        let hs = home_score.to_string();
        let aw = away_score.to_string();
        let mut st = self.lock_state();
        st.context.exciting_moment = false;
        let home = Self::team_or(&st.context.home_team, "The home side");
        let away = Self::team_or(&st.context.away_team, "the away side");
        if self.gate(&mut st, EventKind::HalfTime, None) {
            self.render_and_enqueue(&mut st, EventKind::HalfTime, &[&home, &hs, &away, &aw]);
        }
    }

    /// Full time, with the final score. Resets the match context.
    pub fn on_full_time(&self, home_score: u32, away_score: u32) {
        if !self.is_enabled() {
            return;
        }
        let hs = home_score.to_string();
        let aw = away_score.to_string();
        let mut st = self.lock_state();
        let home = Self::team_or(&st.context.home_team, "The home side");
        let away = Self::team_or(&st.context.away_team, "the away side");
        if self.gate(&mut st, EventKind::FullTime, None) {
            self.render_and_enqueue(&mut st, EventKind::FullTime, &[&home, &hs, &away, &aw]);
        }
        st.context.reset();
    }

    /// Possession swinging to another team. Only speaks when the game is
    /// already exciting; otherwise just updates context.
    pub fn on_possession_change(&self, team: &str) {
        if !self.is_enabled() || team.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        let changed = st.context.record_possession(team);
        if !changed || !st.context.exciting_moment {
            return;
        }
        if self.gate(&mut st, EventKind::PossessionChange, None) {
            self.render_and_enqueue(&mut st, EventKind::PossessionChange, &[team]);
        }
    }

    pub fn on_corner_kick(&self, team: &str) {
        if !self.is_enabled() || team.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(&mut st, EventKind::CornerKick, None) {
            self.render_and_enqueue(&mut st, EventKind::CornerKick, &[team]);
        }
    }

    pub fn on_free_kick(&self, team: &str) {
        if !self.is_enabled() || team.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(&mut st, EventKind::FreeKick, None) {
            self.render_and_enqueue(&mut st, EventKind::FreeKick, &[team]);
        }
    }

    /// Throw-ins happen far too often to narrate; deliberately silent.
    pub fn on_throw_in(&self, _team: &str) {}

    pub fn on_yellow_card(&self, player: &str) {
        if !self.is_enabled() || player.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(&mut st, EventKind::YellowCard, None) {
            self.render_and_enqueue(&mut st, EventKind::YellowCard, &[player]);
        }
    }

    pub fn on_red_card(&self, player: &str) {
        if !self.is_enabled() || player.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(&mut st, EventKind::RedCard, None) {
            self.render_and_enqueue(&mut st, EventKind::RedCard, &[player]);
        }
    }

    pub fn on_substitution(&self, incoming: &str, outgoing: &str) {
        if !self.is_enabled() || incoming.is_empty() || outgoing.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(&mut st, EventKind::Substitution, None) {
            self.render_and_enqueue(&mut st, EventKind::Substitution, &[incoming, outgoing]);
        }
    }

    /// A take-on. Only successful dribbles are worth a line, and only a
    /// sampled fraction of those.
    pub fn on_dribble(&self, player: &str, successful: bool) {
        if !self.is_enabled() || player.is_empty() || !successful {
            return;
        }
        let mut st = self.lock_state();
        if self.gate(
            &mut st,
            EventKind::DribbleSuccess,
            Some(self.config.sampling.dribble_rate),
        ) {
            st.context.exciting_moment = true;
            self.render_and_enqueue(&mut st, EventKind::DribbleSuccess, &[player]);
        }
    }

    /// A pass cut out. Breaks any pass streak.
    pub fn on_interception(&self, player: &str, team: &str) {
        if !self.is_enabled() || player.is_empty() {
            return;
        }
        let mut st = self.lock_state();
        st.context.record_interception();
        if self.gate(&mut st, EventKind::Interception, None) {
            self.render_and_enqueue(&mut st, EventKind::Interception, &[player, team]);
        }
    }

    // ---- internals -------------------------------------------------------

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Applies the sampling roll and the cooldown check in the configured
    /// order. Holding the state lock makes check-then-record atomic across
    /// producers.
    fn gate(&self, st: &mut EngineState, kind: EventKind, sample_rate: Option<f32>) -> bool {
        let now = self.clock.now();
        if self.config.sampling.throttle_before_sampling {
            st.throttle.allow(kind, now) && self.roll(st, sample_rate)
        } else {
            self.roll(st, sample_rate) && st.throttle.allow(kind, now)
        }
    }

    fn roll(&self, st: &mut EngineState, sample_rate: Option<f32>) -> bool {
        match sample_rate {
            Some(rate) => rate >= 1.0 || st.rng.gen::<f32>() < rate,
            None => true,
        }
    }

    fn render_and_enqueue(&self, st: &mut EngineState, kind: EventKind, params: &[&str]) {
        let text = self.templates.render(kind, params, &mut st.rng);
        if text.is_empty() {
            return;
        }
        self.queue.enqueue(text, kind.priority());
    }

    fn team_or(name: &str, fallback: &str) -> String {
        if name.is_empty() {
            fallback.to_string()
        } else {
            name.to_string()
        }
    }
}

impl Drop for CommentaryEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for CommentaryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentaryEngine")
            .field("enabled", &self.is_enabled())
            .field("pending", &self.queue.len())
            .field("dropped", &self.queue.dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrator::RecordingNarrator;
    use std::time::{Duration, Instant};

    /// Test clock that only moves when told to.
    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    fn test_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.seed = Some(42);
        config.delivery.utterance_gap_ms = 0;
        config
    }

    fn engine_with(
        config: EngineConfig,
    ) -> (Arc<CommentaryEngine>, Arc<RecordingNarrator>, Arc<ManualClock>) {
        let narrator = Arc::new(RecordingNarrator::new());
        let clock = Arc::new(ManualClock::new());
        let engine = CommentaryEngine::with_parts(
            config,
            default_templates(),
            Arc::clone(&narrator) as Arc<dyn Narrator>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        (Arc::new(engine), narrator, clock)
    }

    #[test]
    fn test_goal_always_speaks_despite_cooldowns() {
        let (engine, narrator, _clock) = engine_with(test_config());

        // Exhaust the global floor with a save, then score immediately.
        engine.on_save("Keane", "Smith");
        engine.on_goal("Smith", "Redwood FC", 1, 0);
        engine.shutdown();

        // Both land: the save stamps the floor, the goal ignores it.
        let lines = narrator.lines();
        assert_eq!(lines.len(), 2, "got {:?}", lines);
        assert!(lines.iter().any(|l| l.contains("Keane")));
    }

    #[test]
    fn test_repeated_pass_pair_speaks_at_most_once() {
        let mut config = test_config();
        config.sampling.pass_rate = 1.0;
        config.throttle.default_cooldown_ms = 0;
        config.throttle.global_floor_ms = 0;
        let (engine, narrator, _clock) = engine_with(config);

        engine.on_pass("Adams", "Baker", false);
        engine.on_pass("Adams", "Baker", false);
        engine.shutdown();

        assert!(narrator.len() <= 1, "got {:?}", narrator.lines());
    }

    #[test]
    fn test_pass_chain_reaches_build_up_branch() {
        let mut config = test_config();
        config.sampling.pass_rate = 1.0;
        config.sampling.build_up_rate = 1.0;
        config.throttle.default_cooldown_ms = 0;
        config.throttle.global_floor_ms = 0;
        let (engine, narrator, _clock) = engine_with(config);

        let players = ["A", "B", "C", "D", "E", "F"];
        for pair in players.windows(2) {
            engine.on_pass(pair[0], pair[1], false);
        }
        engine.shutdown();

        // The fifth pass completes a streak of 5 and must take the
        // build-up branch. Build-up variants have no placeholders, so the
        // spoken line matches a variant verbatim.
        let build_up = default_templates()
            .get(EventKind::BuildUp)
            .cloned()
            .unwrap_or_default();
        let lines = narrator.lines();
        assert_eq!(lines.len(), 5);
        assert!(
            lines.iter().any(|l| build_up.contains(l)),
            "no build-up line in {:?}",
            lines
        );
        // ...and the first four, below the streak threshold, must not.
        assert!(!lines[..4].iter().any(|l| build_up.contains(l)));
    }

    #[test]
    fn test_cooldown_suppresses_then_releases() {
        let mut config = test_config();
        config.sampling.pass_rate = 1.0;
        config.throttle.default_cooldown_ms = 2000;
        config.throttle.global_floor_ms = 0;
        let (engine, narrator, clock) = engine_with(config);

        engine.on_pass("Adams", "Baker", false);
        clock.advance(Duration::from_millis(1999));
        engine.on_pass("Baker", "Clark", false);
        clock.advance(Duration::from_millis(2));
        engine.on_pass("Clark", "Dunn", false);
        engine.shutdown();

        assert_eq!(narrator.len(), 2, "got {:?}", narrator.lines());
    }

    #[test]
    fn test_possession_change_needs_excitement() {
        let mut config = test_config();
        config.throttle.global_floor_ms = 0;
        config.throttle.default_cooldown_ms = 0;
        let (engine, narrator, _clock) = engine_with(config);

        engine.on_possession_change("Redwood FC"); // quiet game: silent
        engine.on_shot("Smith", "Redwood FC", true); // now it's exciting
        engine.on_possession_change("Harbor Town");
        engine.shutdown();

        let lines = narrator.lines();
        assert!(
            lines.iter().any(|l| l.contains("Harbor Town")),
            "got {:?}",
            lines
        );
        assert!(!lines.iter().any(|l| l.contains("Redwood FC win")));
    }

    #[test]
    fn test_empty_identity_is_silent_noop() {
        let (engine, narrator, _clock) = engine_with(test_config());

        engine.on_goal("", "Redwood FC", 1, 0);
        engine.on_pass("Adams", "", false);
        engine.on_red_card("");
        engine.shutdown();

        assert!(narrator.is_empty(), "got {:?}", narrator.lines());
    }

    #[test]
    fn test_shutdown_is_final_and_idempotent() {
        let (engine, narrator, _clock) = engine_with(test_config());

        engine.on_goal("Smith", "Redwood FC", 1, 0);
        engine.shutdown();
        let spoken = narrator.len();

        engine.on_goal("Jones", "Harbor Town", 1, 1); // after shutdown: no-op
        engine.shutdown(); // second shutdown: harmless
        assert_eq!(narrator.len(), spoken);
        assert!(!narrator.lines().iter().any(|l| l.contains("Jones")));
    }

    #[test]
    fn test_disabled_engine_is_silent() {
        let mut config = test_config();
        config.enabled = false;
        let (engine, narrator, _clock) = engine_with(config);

        engine.on_goal("Smith", "Redwood FC", 1, 0);
        engine.shutdown();
        assert!(narrator.is_empty());
    }

    #[test]
    fn test_reenable_after_disable() {
        let (engine, narrator, _clock) = engine_with(test_config());

        engine.set_enabled(false);
        engine.on_goal("Smith", "Redwood FC", 1, 0);
        engine.set_enabled(true);
        engine.on_goal("Jones", "Redwood FC", 2, 0);
        engine.shutdown();

        let lines = narrator.lines();
        assert!(!lines.iter().any(|l| l.contains("Smith")));
        assert!(lines.iter().any(|l| l.contains("Jones")));
    }

    #[test]
    fn test_half_time_carries_teams_and_score() {
        let mut config = test_config();
        config.throttle.global_floor_ms = 0;
        let (engine, narrator, _clock) = engine_with(config);

        engine.on_match_start("Redwood FC", "Harbor Town");
        engine.on_half_time(2, 1);
        engine.shutdown();

        let lines = narrator.lines();
        let half = lines
            .iter()
            .find(|l| l.contains('2') && l.contains('1'))
            .unwrap_or_else(|| panic!("no half-time line in {:?}", lines));
        assert!(half.contains("Redwood FC"));
        assert!(half.contains("Harbor Town"));
    }

    #[test]
    fn test_failed_tackle_with_whistle_reads_as_foul() {
        let mut config = test_config();
        config.sampling.tackle_rate = 1.0;
        config.throttle.global_floor_ms = 0;
        config.throttle.default_cooldown_ms = 0;
        let (engine, narrator, _clock) = engine_with(config);

        engine.on_tackle("Vance", "Smith", false, true);
        engine.shutdown();

        let lines = narrator.lines();
        assert_eq!(lines.len(), 1);
        assert!(
            lines[0].to_lowercase().contains("foul")
                || lines[0].contains("whistle")
                || lines[0].contains("free kick"),
            "not a foul line: {}",
            lines[0]
        );
    }

    #[test]
    fn test_throttle_before_sampling_order() {
        let mut config = test_config();
        config.sampling.pass_rate = 1.0;
        config.sampling.throttle_before_sampling = true;
        config.throttle.default_cooldown_ms = 60_000;
        config.throttle.global_floor_ms = 0;
        let (engine, narrator, _clock) = engine_with(config);

        engine.on_pass("Adams", "Baker", false);
        engine.on_pass("Baker", "Clark", false); // throttled before any roll
        engine.shutdown();

        assert_eq!(narrator.len(), 1);
    }
}
