//! # Move Announcer Module
//!
//! Speaks the name of the upcoming move, fast enough to land inside the
//! current phrase. The time budget scales with tempo (at 100 bpm an
//! announcement gets three seconds, at 200 bpm half that) and the speech
//! rate is raised just enough for the predicted utterance to fit. A
//! forced stop fires shortly before the budget runs out so speech can
//! never smear into the next phrase's cues.
//!
//! The speech engine lives on a worker thread that owns it outright.
//! Sending a new announcement preempts whatever is still being spoken
//! (at most one announcement is ever pending), and the forced stop is a
//! `recv_timeout` deadline on the same thread, so there is no separate
//! timer to race against.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tts::Tts;

/// Tempo floor; below this the rate math degenerates.
pub const MIN_BPM: f64 = 40.0;
/// Anchor: 100 bpm yields a 3-second announcement budget.
const BUDGET_ANCHOR_MS: f64 = 3000.0;
/// Estimated speaking time per character of the move name.
const PER_CHAR_MS: f64 = 60.0;
/// Floor on the estimate so one-word names still get a sane prediction.
const MIN_PREDICTED_MS: f64 = 250.0;
/// Multiplier bounds the engine is asked to honour.
pub const RATE_MIN: f32 = 0.8;
pub const RATE_MAX: f32 = 2.5;
/// Safety margin subtracted from the budget for the forced stop.
const STOP_MARGIN_MS: f64 = 40.0;
/// The forced stop never fires earlier than this after issuance.
const MIN_CUTOFF_MS: f64 = 100.0;

/// How one announcement will be delivered: the rate multiplier and the
/// deadline for the forced stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnouncePlan {
    /// Speech-rate multiplier, 1.0 = the engine's normal rate.
    pub rate: f32,
    /// Total time budget for the utterance at this tempo.
    pub budget: Duration,
    /// Forced stop fires this long after the utterance is issued.
    pub cutoff: Duration,
}

/// Compute rate and deadlines for announcing `name` at `bpm`.
///
/// Pure; see the module docs for the shape of the math.
#[must_use]
pub fn plan_announcement(name: &str, bpm: f64) -> AnnouncePlan {
    let bpm = bpm.max(MIN_BPM);
    let budget_ms = BUDGET_ANCHOR_MS * (100.0 / bpm);

    #[allow(clippy::cast_precision_loss)]
    let predicted_ms = (name.chars().count() as f64 * PER_CHAR_MS).max(MIN_PREDICTED_MS);

    #[allow(clippy::cast_possible_truncation)]
    let rate = ((predicted_ms / budget_ms).max(1.0) as f32).clamp(RATE_MIN, RATE_MAX);
    let cutoff_ms = (budget_ms - STOP_MARGIN_MS).max(MIN_CUTOFF_MS);

    AnnouncePlan {
        rate,
        budget: Duration::from_secs_f64(budget_ms / 1000.0),
        cutoff: Duration::from_secs_f64(cutoff_ms / 1000.0),
    }
}

/// The seam to the speech engine: rate mutation, flushing speak, and
/// hard stop. Engines are created on the worker thread and never leave
/// it, so `Send` is not required.
pub trait SpeechEngine {
    /// Apply a rate multiplier (1.0 = normal).
    fn set_rate(&mut self, multiplier: f32);
    /// Speak `text`, replacing any utterance queued or in progress.
    fn speak(&mut self, text: &str);
    /// Cut off the current utterance.
    fn stop(&mut self);
}

/// Engine that says nothing. Used for `--no-voice` and as the fallback
/// when no platform engine is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeech;

impl SpeechEngine for NullSpeech {
    fn set_rate(&mut self, _multiplier: f32) {}
    fn speak(&mut self, _text: &str) {}
    fn stop(&mut self) {}
}

/// Platform text-to-speech via the `tts` crate.
pub struct TtsSpeech {
    tts: Tts,
    min: f32,
    normal: f32,
    max: f32,
}

impl TtsSpeech {
    /// Bind to the platform speech engine.
    ///
    /// # Errors
    ///
    /// Returns an error if no engine can be initialized; callers degrade
    /// to [`NullSpeech`].
    pub fn new() -> Result<Self> {
        let tts = Tts::default().context("Failed to initialize the speech engine")?;
        let min = tts.min_rate();
        let normal = tts.normal_rate();
        let max = tts.max_rate();
        Ok(Self {
            tts,
            min,
            normal,
            max,
        })
    }
}

impl SpeechEngine for TtsSpeech {
    fn set_rate(&mut self, multiplier: f32) {
        let rate = engine_rate(multiplier, self.min, self.normal, self.max);
        if let Err(e) = self.tts.set_rate(rate) {
            debug!("Speech rate change failed: {e}");
        }
    }

    fn speak(&mut self, text: &str) {
        // interrupt = true: flush whatever is queued or speaking.
        if let Err(e) = self.tts.speak(text, true) {
            debug!("Speak failed: {e}");
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.tts.stop() {
            debug!("Speech stop failed: {e}");
        }
    }
}

/// Map the multiplier band onto the engine's reported rate range, with
/// 1.0 pinned to the engine's normal rate. The engine's own bounds are
/// the final word on what it supports.
fn engine_rate(multiplier: f32, min: f32, normal: f32, max: f32) -> f32 {
    if multiplier >= 1.0 {
        let frac = ((multiplier - 1.0) / (RATE_MAX - 1.0)).min(1.0);
        normal + (max - normal) * frac
    } else {
        let frac = ((1.0 - multiplier) / (1.0 - RATE_MIN)).min(1.0);
        normal - (normal - min) * frac
    }
}

enum Cue {
    Speak { text: String, plan: AnnouncePlan },
}

/// Handle to the speech worker. One announcement pending at most; a new
/// call preempts the old one.
#[derive(Debug)]
pub struct Announcer {
    cues: mpsc::Sender<Cue>,
    ready: bool,
}

impl Announcer {
    /// Spawn the worker with the platform speech engine. Never fails:
    /// if the engine is unavailable the announcer degrades to silence
    /// and [`is_ready()`](Self::is_ready) reports it.
    #[must_use]
    pub fn spawn() -> Self {
        Self::spawn_with(|| TtsSpeech::new().map(|engine| Box::new(engine) as Box<dyn SpeechEngine>))
    }

    /// An announcer that deliberately says nothing (`--no-voice`).
    #[must_use]
    pub fn disabled() -> Self {
        let mut announcer = Self::spawn_with(|| Ok(Box::new(NullSpeech) as Box<dyn SpeechEngine>));
        announcer.ready = false;
        announcer
    }

    /// Spawn the worker around an injected engine factory. The factory
    /// runs on the worker thread, so the engine itself does not need to
    /// be `Send`.
    pub fn spawn_with<F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn SpeechEngine>> + Send + 'static,
    {
        let (cues, orders) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::spawn(move || {
            let engine = match factory() {
                Ok(engine) => {
                    let _ = ready_tx.send(true);
                    engine
                }
                Err(e) => {
                    warn!("Speech engine unavailable ({e}); announcements disabled");
                    let _ = ready_tx.send(false);
                    Box::new(NullSpeech) as Box<dyn SpeechEngine>
                }
            };
            worker(engine, &orders);
        });

        let ready = ready_rx.recv().unwrap_or(false);
        Self { cues, ready }
    }

    /// Whether a real speech engine is behind this announcer.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Announce `move_name` at the current tempo. Returns the plan that
    /// was issued, mostly for logging and tests.
    pub fn announce(&self, move_name: &str, bpm: f64) -> AnnouncePlan {
        let plan = plan_announcement(move_name, bpm);
        debug!(
            "Announcing '{}' at rate {:.2} (budget {:?})",
            move_name, plan.rate, plan.budget
        );
        if self
            .cues
            .send(Cue::Speak {
                text: move_name.to_string(),
                plan,
            })
            .is_err()
        {
            debug!("Speech worker gone; announcement dropped");
        }
        plan
    }
}

fn worker(mut engine: Box<dyn SpeechEngine>, orders: &mpsc::Receiver<Cue>) {
    // While an utterance is live we wait with a deadline instead of
    // blocking, so the forced stop and preemption share one code path.
    let mut cutoff_at: Option<Instant> = None;

    loop {
        let cue = match cutoff_at {
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    engine.stop();
                    cutoff_at = None;
                    continue;
                }
                match orders.recv_timeout(deadline - now) {
                    Ok(cue) => Some(cue),
                    Err(RecvTimeoutError::Timeout) => {
                        debug!("Announcement hit its cutoff");
                        engine.stop();
                        cutoff_at = None;
                        None
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match orders.recv() {
                Ok(cue) => Some(cue),
                Err(_) => break,
            },
        };

        if let Some(Cue::Speak { text, plan }) = cue {
            engine.set_rate(plan.rate);
            engine.speak(&text);
            cutoff_at = Some(Instant::now() + plan.cutoff);
        }
    }

    // Handle dropped: silence anything still speaking before exiting.
    engine.stop();
}
