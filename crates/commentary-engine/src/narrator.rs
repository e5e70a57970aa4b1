//! The speech sink the engine talks to.
//!
//! Everything downstream of the queue is behind the [`Narrator`] trait:
//! production code can shell out to a system TTS voice, the demo prints to
//! the console, and tests record lines for inspection. Sinks are
//! fire-and-forget; a failing sink never propagates into the engine.

use std::process::{Command, Stdio};
use std::sync::Mutex;

/// An opaque speech output. `speak` must not panic and should return
/// quickly; slow sinks only delay narration, never the simulation.
pub trait Narrator: Send + Sync {
    fn speak(&self, text: &str);
}

/// Discards every line. Useful as a disabled-audio stand-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNarrator;

impl Narrator for NullNarrator {
    fn speak(&self, _text: &str) {}
}

/// Prints lines to stdout, for running the engine without audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNarrator;

impl Narrator for ConsoleNarrator {
    fn speak(&self, text: &str) {
        println!("[commentary] {}", text);
    }
}

/// Speaks through the system `say` command (macOS TTS).
///
/// `speak` returns as soon as the child is spawned; a detached thread reaps
/// it so finished utterances don't accumulate as zombies. Spawn failures are
/// logged and swallowed, since commentary is best-effort.
#[derive(Debug, Clone)]
pub struct SayNarrator {
    /// Words-per-minute speech rate, passed straight through to `say -r`.
    pub rate: u32,
}

impl SayNarrator {
    pub fn new(rate: u32) -> Self {
        Self { rate }
    }
}

impl Narrator for SayNarrator {
    fn speak(&self, text: &str) {
        let result = Command::new("say")
            .arg("-r")
            .arg(self.rate.to_string())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match result {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => tracing::warn!(error = %e, "speech sink unavailable"),
        }
    }
}

/// Records spoken lines for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    lines: Mutex<Vec<String>>,
}

impl RecordingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, in order.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

impl Narrator for RecordingNarrator {
    fn speak(&self, text: &str) {
        match self.lines.lock() {
            Ok(mut guard) => guard.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_narrator_keeps_order() {
        let narrator = RecordingNarrator::new();
        narrator.speak("one");
        narrator.speak("two");
        assert_eq!(narrator.lines(), vec!["one", "two"]);
    }

    #[test]
    fn test_null_narrator_is_silent() {
        // Nothing observable; this just exercises the impl.
        NullNarrator.speak("into the void");
    }

    #[test]
    fn test_say_narrator_never_panics_or_blocks() {
        // Whether the binary exists (spawn + detached reap) or not (logged
        // error), speak must return promptly.
        let narrator = SayNarrator::new(200);
        narrator.speak("quick line");
        narrator.speak("another");
    }
}
