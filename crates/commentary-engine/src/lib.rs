//! Live football commentary engine.
//!
//! The engine sits between a match simulation and a speech sink. Handlers
//! receive raw match events, decide which ones are worth a line (rolling
//! context, sampling, cooldowns), render a template, and queue the line for
//! a background worker that feeds the narrator. Producers never block and
//! never wait on speech.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  on_goal / on_pass / ...  ┌──────────────────┐
//! │ simulation │ ────────────────────────▶ │ CommentaryEngine │
//! └────────────┘                           └────────┬─────────┘
//!                          classify + sample + throttle + render
//!                                                   │
//!                                           ┌───────▼───────┐   ┌──────────┐
//!                                           │ DispatchQueue │──▶│ Narrator │
//!                                           └───────────────┘   └──────────┘
//!                                            (render worker)     (speech)
//! ```
//!
//! # Modules
//!
//! - [`event`]: Event kinds, priorities, and template slot names
//! - [`templates`]: Phrasing variants and placeholder substitution
//! - [`context`]: Rolling match context (streaks, possession, excitement)
//! - [`throttle`]: Per-kind cooldowns and the global spacing floor
//! - [`queue`]: Bounded priority queue between handlers and the worker
//! - [`narrator`]: The speech sink trait and its implementations
//! - [`worker`]: Background thread draining the queue into the narrator
//! - [`config`]: TOML configuration with serde defaults
//! - [`engine`]: The engine itself, tying the pieces together

pub mod config;
pub mod context;
pub mod engine;
pub mod event;
pub mod narrator;
pub mod queue;
pub mod templates;
pub mod throttle;
pub mod worker;

pub use config::{
    default_config_toml, ConfigError, DeliveryConfig, EngineConfig, SamplingConfig,
    ThrottleConfig,
};
pub use context::{MatchContext, PassObservation};
pub use engine::CommentaryEngine;
pub use event::{priority, EventKind};
pub use narrator::{ConsoleNarrator, Narrator, NullNarrator, RecordingNarrator, SayNarrator};
pub use queue::{CommentaryItem, DispatchQueue};
pub use templates::{default_templates, default_templates_toml, TemplateBank, TemplateError};
pub use throttle::{Clock, SystemClock, ThrottleRegistry};
pub use worker::RenderWorker;

use thiserror::Error;

/// Errors that can occur setting up the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}
