//! Template bank: per-kind phrasing variants and placeholder substitution.
//!
//! Each event kind owns an ordered list of variant strings. Rendering picks
//! one variant uniformly at random (caller-supplied RNG, so tests can seed
//! it) and substitutes parameters into positional (`{0}`) and named
//! (`{scorer}`) placeholders. Unknown placeholders are left verbatim — a
//! template/parameter mismatch should be visible in tests, not papered over.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::EventKind;

/// Errors that can occur loading template files.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Phrasing variants keyed by event kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateBank {
    /// Variant strings per kind (e.g. `goal = ["GOAL! {scorer} scores!", ...]`)
    #[serde(default)]
    pub variants: HashMap<EventKind, Vec<String>>,
}

impl TemplateBank {
    /// Loads a template bank from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses a template bank from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, TemplateError> {
        Ok(toml::from_str(content)?)
    }

    /// Returns the variants for a kind, if any are registered.
    pub fn get(&self, kind: EventKind) -> Option<&Vec<String>> {
        self.variants.get(&kind)
    }

    /// Renders one randomly chosen variant for `kind`, substituting `params`
    /// into positional and named placeholders.
    ///
    /// An empty or missing variant set renders to an empty string; the caller
    /// treats that as "no commentary". Every occurrence of a placeholder is
    /// replaced, so a name repeated in a variant is fully substituted.
    pub fn render<R: Rng>(&self, kind: EventKind, params: &[&str], rng: &mut R) -> String {
        let Some(variants) = self.variants.get(&kind) else {
            return String::new();
        };
        let Some(template) = variants.choose(rng) else {
            return String::new();
        };

        let mut text = template.clone();
        let names = kind.slot_names();
        for (i, value) in params.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i), value);
            if let Some(name) = names.get(i) {
                text = text.replace(&format!("{{{}}}", name), value);
            }
        }
        text
    }
}

/// Returns the built-in English template bank.
pub fn default_templates() -> TemplateBank {
    let mut variants: HashMap<EventKind, Vec<String>> = HashMap::new();

    let mut insert = |kind: EventKind, lines: &[&str]| {
        variants.insert(kind, lines.iter().map(|s| s.to_string()).collect());
    };

    insert(
        EventKind::Kickoff,
        &[
            "And we're underway! {home} versus {away}!",
            "The match begins! {home} taking on {away} today!",
            "Kick off! Let's see what {home} and {away} have in store for us!",
            "Welcome to today's match between {home} and {away}! We're underway!",
        ],
    );
    insert(
        EventKind::Goal,
        &[
            "GOAL! {scorer} scores for {team}! The score is now {home} to {away}!",
            "What a strike from {scorer}! {team} find the net!",
            "{scorer} finds the back of the net! Brilliant finish for {team}!",
            "And it's in! {scorer} with a fantastic goal for {team}!",
            "GOOOAL! {scorer} puts it away! {scorer} makes it {home} - {away}!",
        ],
    );
    insert(
        EventKind::Pass,
        &[
            "{from} finds {to}",
            "{from} to {to}",
            "Nice ball from {from} to {to}",
            "{from} picks out {to}",
            "Good ball from {from} to {to}",
            "{from} threads it through to {to}",
            "Clever pass from {from}, {to} receives it well",
        ],
    );
    insert(
        EventKind::LongPass,
        &[
            "Long ball from {from} searching for {to}!",
            "{from} launches it forward to {to}!",
            "Ambitious pass from {from} looking for {to} up field!",
            "{from} goes long to {to}",
            "Switching play, {from} to {to}",
        ],
    );
    insert(
        EventKind::ShotOnTarget,
        &[
            "{player} with a shot! The keeper will have to deal with that!",
            "Strike from {player}! Testing the goalkeeper!",
            "{player} lets fly! Good effort from {team}!",
            "Shot on goal from {player}! {team} looking dangerous!",
        ],
    );
    insert(
        EventKind::ShotOffTarget,
        &[
            "{player} shoots... but it's wide!",
            "Off target from {player}. {team} will be disappointed with that.",
            "{player} blazes it over! Should have done better there.",
            "Wild effort from {player}. That's nowhere near the target.",
        ],
    );
    insert(
        EventKind::Save,
        &[
            "Great save by {keeper}! Denying {player} there!",
            "{keeper} with a fantastic stop! {player} can't believe it!",
            "What a save! {keeper} keeps it out!",
            "Brilliant goalkeeping from {keeper} to deny {player}!",
        ],
    );
    insert(
        EventKind::TackleSuccess,
        &[
            "Strong tackle from {tackler} on {player}!",
            "{tackler} wins the ball with a great challenge!",
            "Clean tackle from {tackler}, dispossessing {player}.",
            "{tackler} times it perfectly to win the ball from {player}!",
        ],
    );
    insert(
        EventKind::TackleFail,
        &[
            "{tackler} goes in for the tackle but {player} evades it!",
            "{player} skips past the challenge from {tackler}!",
            "Nice skill from {player} to avoid {tackler}'s tackle!",
        ],
    );
    insert(
        EventKind::Foul,
        &[
            "Foul by {player} on {opponent}. Free kick awarded.",
            "{player} brings down {opponent}. The referee blows his whistle.",
            "That's a foul from {player}. {opponent} wins the free kick.",
        ],
    );
    insert(
        EventKind::YellowCard,
        &[
            "Yellow card for {player}! That was a reckless challenge.",
            "{player} goes into the book for that foul.",
            "The referee shows {player} a yellow card.",
        ],
    );
    insert(
        EventKind::RedCard,
        &[
            "RED CARD! {player} is sent off!",
            "Oh no! {player} sees red! That's a terrible tackle!",
            "{player} has to go! Straight red card!",
        ],
    );
    insert(
        EventKind::PossessionChange,
        &[
            "{team} win back possession.",
            "Ball turned over to {team}.",
            "{team} regain control of the ball.",
            "{team} in control now.",
        ],
    );
    insert(
        EventKind::DribbleSuccess,
        &[
            "Brilliant dribbling from {player}!",
            "{player} beats his man with some fancy footwork!",
            "Skillful play from {player} to get past the defender!",
        ],
    );
    insert(
        EventKind::Interception,
        &[
            "Interception by {player}! {team} win it back!",
            "{player} reads it well and intercepts! Good awareness!",
            "Stolen by {player}! {team} back in possession!",
        ],
    );
    insert(
        EventKind::HalfTime,
        &[
            "That's halftime! The score is {home} {home_score}, {away} {away_score}.",
            "The referee blows for halftime. {home} {home_score}, {away} {away_score} as we head to the break.",
            "End of the first half. {home} {home_score}, {away} {away_score}.",
        ],
    );
    insert(
        EventKind::FullTime,
        &[
            "That's the final whistle! {home} {home_score}, {away} {away_score}!",
            "It's all over! Final score: {home} {home_score}, {away} {away_score}!",
            "Full time! {home} {home_score}, {away} {away_score}!",
        ],
    );
    insert(
        EventKind::CornerKick,
        &[
            "Corner kick for {team}.",
            "{team} have won a corner.",
            "It's gone behind. Corner to {team}.",
        ],
    );
    insert(
        EventKind::FreeKick,
        &[
            "Free kick awarded to {team}.",
            "{team} with a free kick in a promising position.",
            "The referee points to the spot of the foul. Free kick, {team}.",
        ],
    );
    insert(
        EventKind::Substitution,
        &[
            "Substitution: {incoming} replaces {outgoing}.",
            "{outgoing} makes way for {incoming}.",
            "Fresh legs: {incoming} is coming on for {outgoing}.",
        ],
    );
    insert(
        EventKind::BuildUp,
        &[
            "Building from the back",
            "Patient build-up play",
            "Working the ball forward",
            "Looking for an opening",
            "Probing for space",
            "Keeping possession",
        ],
    );

    TemplateBank { variants }
}

/// Returns a starter template file as a TOML string.
///
/// Covers the high-traffic kinds; kinds omitted here fall back to whatever
/// the caller merges in (or render nothing).
pub fn default_templates_toml() -> String {
    r#"# Commentary templates, one table of variants per event kind.

[variants]
goal = [
    "GOAL! {scorer} scores for {team}! The score is now {home} to {away}!",
    "What a strike from {scorer}! {team} find the net!",
]
pass = [
    "{from} finds {to}",
    "Nice ball from {from} to {to}",
]
long_pass = [
    "Long ball from {from} searching for {to}!",
    "{from} goes long to {to}",
]
shot_on_target = [
    "Strike from {player}! Testing the goalkeeper!",
]
shot_off_target = [
    "{player} shoots... but it's wide!",
]
save = [
    "Great save by {keeper}! Denying {player} there!",
]
build_up = [
    "Patient build-up play",
    "Keeping possession",
]
kickoff = [
    "And we're underway! {home} versus {away}!",
]
"#
    .to_string()
}
