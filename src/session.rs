//! # Practice Session Module
//!
//! The driver that turns the pieces into a practice session: it starts
//! the beat loop, listens on the beat channel, and on the last beat of
//! each phrase asks the selector for the next move and hands the name to
//! the announcer. Everything the session decides (when to announce, when
//! to stop) happens here on the consumer side of the channel, keeping
//! the timing loop free of policy.

use crate::announcer::Announcer;
use crate::catalog::{Catalog, Move};
use crate::scheduler::{BeatScheduler, BeatSound, SchedulerConfig};
use crate::selector;
use anyhow::{bail, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// Immutable per-session options. Built once before `run`; changing the
/// tempo mid-session means stopping and starting a new session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub scheduler: SchedulerConfig,
    /// Weighted (smoothness-biased) selection when true, uniform otherwise.
    pub priority_mode: bool,
    /// Phrase length in beats; the next move is announced on the last
    /// beat of each phrase, after the count-in.
    pub announce_every: u32,
    /// Stop after this many beats, count-in included. `None` runs until
    /// stopped from outside.
    pub max_beats: Option<u64>,
    /// Seed for the selection generator; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            priority_mode: false,
            announce_every: 4,
            max_beats: None,
            seed: None,
        }
    }
}

/// What a finished session looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Beats that actually fired, count-in included.
    pub beats: u64,
    /// Move ids in danced order, starting move first.
    pub moves: Vec<String>,
    /// True when the walk hit a move with no usable outgoing connection.
    pub dead_end: bool,
}

/// Run a practice session from `start` until the beat limit, a dead end,
/// or `stop_requested` is raised from another thread.
///
/// # Errors
///
/// Returns an error if the options are invalid or the beat loop cannot
/// be started. A dead end is not an error; it is reported in the summary.
pub fn run(
    catalog: &Catalog,
    start: &Move,
    opts: &SessionOptions,
    sound: Box<dyn BeatSound>,
    announcer: &Announcer,
    stop_requested: &AtomicBool,
) -> Result<SessionSummary> {
    if opts.announce_every == 0 {
        bail!("Phrase length must be at least one beat");
    }
    opts.scheduler.validate()?;

    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (beats_tx, beats_rx) = mpsc::channel();
    let mut scheduler = BeatScheduler::new();
    scheduler.start(opts.scheduler, sound, beats_tx)?;
    info!("Session started from '{}'", start.name);

    let mut current = start.clone();
    let mut walked = vec![current.id.clone()];
    let mut beats_seen: u64 = 0;
    let mut dead_end = false;

    while let Ok(beat) = beats_rx.recv() {
        beats_seen = beat.index + 1;

        if stop_requested.load(Ordering::SeqCst) {
            debug!("Stop requested at beat {}", beat.index);
            break;
        }

        if beat.index == 0 {
            // Tell the dancer where the walk begins while the count-in
            // is still running.
            println!("♪ Starting with: {}", current.name);
            announcer.announce(&current.name, opts.scheduler.bpm);
        }

        if phrase_ends_at(beat.index, opts) {
            match selector::select_next(
                &catalog.moves,
                &catalog.connections,
                &current,
                opts.priority_mode,
                &mut rng,
            ) {
                Some(next) => {
                    match &next.note {
                        Some(note) => println!("→ {} ({note})", next.to.name),
                        None => println!("→ {}", next.to.name),
                    }
                    announcer.announce(&next.to.name, opts.scheduler.bpm);
                    walked.push(next.to.id.clone());
                    current = next.to;
                }
                None => {
                    warn!("Dead end after '{}'; ending session", current.name);
                    println!("✗ Dead end after {}, no usable connection", current.name);
                    dead_end = true;
                    break;
                }
            }
        }

        if let Some(max) = opts.max_beats {
            if beat.index + 1 >= max {
                debug!("Beat limit {max} reached");
                break;
            }
        }
    }

    // Stopping from the consumer side: the loop may finish one in-flight
    // beat, but nothing is delivered after stop() returns.
    scheduler.stop();
    info!(
        "Session ended after {} beats, {} moves",
        beats_seen,
        walked.len()
    );

    Ok(SessionSummary {
        beats: beats_seen,
        moves: walked,
        dead_end,
    })
}

/// True on the last beat of each phrase, once the count-in is over.
fn phrase_ends_at(index: u64, opts: &SessionOptions) -> bool {
    let count_in = u64::from(opts.scheduler.count_in_beats);
    if index < count_in {
        return false;
    }
    (index - count_in + 1) % u64::from(opts.announce_every) == 0
}
