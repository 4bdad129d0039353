//! Talking practice metronome for dance moves.
//!
//! Core modules:
//! - [`scheduler`] - Drift-free beat loop with count-in and accents
//! - [`selector`] - Weighted next-move selection over the connection graph
//! - [`announcer`] - Tempo-aware voice announcements
//! - [`session`] - The practice-session driver tying the three together
//!
//! ### Supporting Modules
//!
//! - [`catalog`] - Moves, connections and sequences with JSON persistence
//! - [`audio`] - Metronome click playback
//! - [`config`] - Data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation for enhanced UX
//!
//! ## Quick Start Example
//!
//! ```
//! use sway::catalog::Catalog;
//! use sway::selector;
//! use sway::announcer;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! // Build a small catalog
//! let mut catalog = Catalog::default();
//! catalog.add_move("Basic Step", "home base")?;
//! catalog.add_move("Cross Body Lead", "")?;
//! catalog.upsert_connection("basic-step", "cross-body-lead", 5, true, None)?;
//!
//! // Pick what to dance next, weighted by smoothness
//! let from = catalog.find_move("Basic Step").unwrap().clone();
//! let mut rng = StdRng::seed_from_u64(7);
//! let next = selector::select_next(&catalog.moves, &catalog.connections, &from, true, &mut rng)
//!     .expect("cross-body-lead is reachable");
//! assert_eq!(next.to.id, "cross-body-lead");
//!
//! // Plan how fast its name must be spoken at 120 bpm
//! let plan = announcer::plan_announcement(&next.to.name, 120.0);
//! assert!(plan.rate >= 1.0);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## How a session fits together
//!
//! The [`scheduler`] owns the only timing-critical loop: it anchors every
//! beat to `start + index * interval` on the wall clock (no cumulative
//! drift), waits out most of each interval with a coarse sleep and
//! spin-polls the last ~2 ms, then classifies the beat (count-in, accent,
//! regular), fires the click and delivers the beat over a channel.
//!
//! The [`session`] driver consumes that channel on its own thread. On the
//! last beat of each phrase it asks [`selector`] for the next move
//! (uniformly, or weighted by each connection's smoothness score) and
//! hands the winner's name to the [`announcer`], which raises the speech
//! rate just enough for the utterance to fit the tempo's time budget and
//! force-stops it if it would overrun.
//!
//! Stopping is cooperative: `stop()` flips an atomic flag the loop checks
//! at each iteration boundary and then joins it, so no beat is delivered
//! after `stop()` returns. Tempo changes mid-session are deliberately
//! unsupported: stop, reconfigure, start again.
//!
//! ## Error Handling
//!
//! Fallible operations return `Result<T, anyhow::Error>`. The degraded
//! paths are deliberately non-fatal: a missing audio device means a
//! silent session, a missing speech engine means no voice, and a move
//! with no usable outgoing connection ends the session as a dead end
//! rather than an error.
//!
//! ## Testing
//!
//! Run tests with:
//! ```bash
//! cargo test
//! cargo bench  # criterion benchmarks for selection and planning
//! ```

pub mod announcer;
pub mod audio;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod scheduler;
pub mod selector;
pub mod session;
