//! # Beat Scheduler Module
//!
//! The timing heart of a practice session: a background loop that fires
//! one beat at a time at intervals derived from the tempo, distinguishing
//! count-in, accent and regular beats.
//!
//! ## Timing
//!
//! Each beat's target time is computed from a fixed baseline
//! (`start time + lead`) plus `index * interval`, never by sleeping the
//! interval repeatedly, so wake-up latency cannot accumulate into drift.
//! The wait itself is two-phase: suspend for the bulk of it, then let
//! [`spin_sleep`] spin-poll the final ~2 ms down to the target. That
//! bounds jitter to the spin window without burning a core for the whole
//! interval.
//!
//! ## Control
//!
//! `start()` while running is a no-op; there is never a second concurrent
//! loop. `stop()` flips a shared flag and joins the loop, so once it
//! returns no further beat can arrive. Reconfiguring a live scheduler is
//! unsupported: stop it and start again with a new snapshot.

use anyhow::{bail, Result};
use log::{debug, error, info};
use spin_sleep::SpinSleeper;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

/// Lead added to "now" when the loop starts, absorbing thread spawn and
/// scheduling latency before beat 0.
pub const START_LEAD: Duration = Duration::from_millis(50);

/// Remaining-wait threshold below which the sleeper spin-polls the clock.
const SPIN_THRESHOLD_NS: u32 = 2_000_000;

/// What kind of sound and emphasis a beat carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatKind {
    /// Preparation beat before the piece starts; always the soft sound.
    CountIn,
    /// Emphasised beat closing an accent group.
    Accent,
    /// Any other beat.
    Regular,
}

/// One delivered beat. Ephemeral: indices restart at 0 on every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beat {
    pub index: u64,
    pub kind: BeatKind,
}

/// Where the scheduler sends its per-beat click. Implementations must not
/// block; playback is fire-and-forget and failures must not stop the loop.
pub trait BeatSound: Send {
    fn play(&mut self, kind: BeatKind);
}

/// Sound sink that plays nothing. Used when clicks are disabled and when
/// no output device is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSound;

impl BeatSound for NullSound {
    fn play(&mut self, _kind: BeatKind) {}
}

/// Immutable timing snapshot, read once at `start()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Beats per minute. Must be positive and finite.
    pub bpm: f64,
    /// Accent every n-th beat; 0 disables accents.
    pub accent_every: u32,
    /// Leading beats treated as preparation, always soft.
    pub count_in_beats: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            bpm: 100.0,
            accent_every: 4,
            count_in_beats: 4,
        }
    }
}

impl SchedulerConfig {
    /// Reject configurations that would produce nonsensical intervals.
    ///
    /// # Errors
    ///
    /// Returns an error if `bpm` is zero, negative, NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        if !(self.bpm > 0.0) || !self.bpm.is_finite() {
            bail!("bpm must be a positive number, got {}", self.bpm);
        }
        Ok(())
    }

    /// Fixed inter-beat interval for this tempo.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.bpm)
    }

    /// Classify beat `index` (0-based since start).
    ///
    /// Count-in wins over accenting: the first `count_in_beats` beats are
    /// always soft. After that, with `accent_every == n > 0`, beats
    /// n-1, 2n-1, … close their group and are accented.
    #[must_use]
    pub fn classify(&self, index: u64) -> BeatKind {
        if index < u64::from(self.count_in_beats) {
            BeatKind::CountIn
        } else if self.accent_every > 0 && (index + 1) % u64::from(self.accent_every) == 0 {
            BeatKind::Accent
        } else {
            BeatKind::Regular
        }
    }
}

/// Cancellable periodic beat source.
///
/// States: idle (no loop) and running. Beats are delivered over the
/// `mpsc` channel handed to [`start()`](Self::start) in strictly
/// increasing index order with no gaps; the single consumer receives
/// them one at a time.
#[derive(Debug)]
pub struct BeatScheduler {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Default for BeatScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Whether the periodic loop is live.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Launch the periodic loop.
    ///
    /// Establishes the baseline (`now + START_LEAD`) and the interval
    /// (`60 / bpm` seconds), then fires beats until [`stop()`](Self::stop)
    /// is called or the receiving end of `beats` is dropped. The scheduler
    /// never self-terminates on a beat count; a "stop after n beats"
    /// policy belongs to whoever consumes the channel.
    ///
    /// Calling `start` while already running does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn start(
        &mut self,
        config: SchedulerConfig,
        sound: Box<dyn BeatSound>,
        beats: mpsc::Sender<Beat>,
    ) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            debug!("start() while running is a no-op");
            return Ok(());
        }
        config.validate()?;

        // Reap a loop that ended on its own (receiver dropped).
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        info!(
            "Starting beat loop: {} bpm, accent every {}, count-in {}",
            config.bpm, config.accent_every, config.count_in_beats
        );
        self.handle = Some(thread::spawn(move || {
            run_loop(config, sound, &beats, &running);
        }));
        Ok(())
    }

    /// Cancel the loop and wait for it to finish.
    ///
    /// Blocks until the loop has observed the cancellation, which can take
    /// up to one inter-beat interval plus the start lead (a beat already
    /// in flight completes; no new beat begins). After `stop` returns, no
    /// further beat is delivered. Safe to call when idle.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Beat loop panicked");
            }
            info!("Beat loop stopped");
        }
    }
}

impl Drop for BeatScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    config: SchedulerConfig,
    mut sound: Box<dyn BeatSound>,
    beats: &mpsc::Sender<Beat>,
    running: &AtomicBool,
) {
    let sleeper = SpinSleeper::new(SPIN_THRESHOLD_NS);
    let secs_per_beat = 60.0 / config.bpm;
    let baseline = Instant::now() + START_LEAD;
    let mut index: u64 = 0;

    while running.load(Ordering::SeqCst) {
        // Absolute target per beat: baseline + index * interval. Recomputed
        // from the index each round so one late wake-up cannot shift every
        // later beat.
        #[allow(clippy::cast_precision_loss)]
        let target = baseline + Duration::from_secs_f64(index as f64 * secs_per_beat);
        let now = Instant::now();
        if target > now {
            sleeper.sleep(target - now);
        }

        // Cancellation is observed at the iteration boundary: a stop that
        // lands mid-wait cancels this beat before it fires.
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let kind = config.classify(index);
        sound.play(kind);
        if beats.send(Beat { index, kind }).is_err() {
            debug!("Beat receiver dropped, ending loop at beat {index}");
            break;
        }
        index += 1;
    }

    running.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sound sink that records what it was asked to play.
    #[derive(Clone, Default)]
    struct RecordingSound(Arc<Mutex<Vec<BeatKind>>>);

    impl BeatSound for RecordingSound {
        fn play(&mut self, kind: BeatKind) {
            self.0.lock().unwrap().push(kind);
        }
    }

    fn cfg(bpm: f64, accent_every: u32, count_in_beats: u32) -> SchedulerConfig {
        SchedulerConfig {
            bpm,
            accent_every,
            count_in_beats,
        }
    }

    #[test]
    fn test_classify_accents_without_count_in() {
        let config = cfg(120.0, 4, 0);
        for index in 0..16u64 {
            let expected = if (index + 1) % 4 == 0 {
                BeatKind::Accent
            } else {
                BeatKind::Regular
            };
            assert_eq!(
                config.classify(index),
                expected,
                "Beat {index} misclassified"
            );
        }
    }

    #[test]
    fn test_classify_count_in_overrides_accent() {
        let config = cfg(120.0, 2, 2);
        // Beat 1 would be an accent ((1+1) % 2 == 0) but is still count-in.
        assert_eq!(config.classify(0), BeatKind::CountIn);
        assert_eq!(config.classify(1), BeatKind::CountIn);
        assert_eq!(config.classify(3), BeatKind::Accent);
        assert_eq!(config.classify(2), BeatKind::Regular);
    }

    #[test]
    fn test_classify_accent_disabled() {
        let config = cfg(120.0, 0, 0);
        for index in 0..32u64 {
            assert_eq!(config.classify(index), BeatKind::Regular);
        }
    }

    #[test]
    fn test_interval_from_bpm() {
        assert_eq!(cfg(120.0, 0, 0).interval(), Duration::from_millis(500));
        assert_eq!(cfg(60.0, 0, 0).interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_bad_bpm() {
        assert!(cfg(0.0, 4, 0).validate().is_err());
        assert!(cfg(-30.0, 4, 0).validate().is_err());
        assert!(cfg(f64::NAN, 4, 0).validate().is_err());
        assert!(cfg(f64::INFINITY, 4, 0).validate().is_err());
        assert!(cfg(96.5, 4, 0).validate().is_ok());
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let mut scheduler = BeatScheduler::new();
        let (tx, _rx) = mpsc::channel();
        assert!(scheduler
            .start(cfg(0.0, 4, 0), Box::new(NullSound), tx)
            .is_err());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_beats_are_sequential_and_classified() {
        let mut scheduler = BeatScheduler::new();
        let sound = RecordingSound::default();
        let played = Arc::clone(&sound.0);
        let (tx, rx) = mpsc::channel();
        let config = cfg(600.0, 4, 2); // 100 ms per beat

        scheduler.start(config, Box::new(sound), tx).unwrap();
        thread::sleep(Duration::from_millis(560));
        scheduler.stop();

        let received: Vec<Beat> = rx.try_iter().collect();
        assert!(
            received.len() >= 3,
            "Expected a handful of beats, got {}",
            received.len()
        );
        for (position, beat) in received.iter().enumerate() {
            assert_eq!(
                beat.index, position as u64,
                "Indices must be contiguous from zero"
            );
            assert_eq!(beat.kind, config.classify(beat.index));
        }
        // Every delivered beat also produced exactly one click.
        assert_eq!(played.lock().unwrap().len(), received.len());
    }

    #[test]
    fn test_stop_immediately_after_start() {
        let mut scheduler = BeatScheduler::new();
        let (tx, rx) = mpsc::channel();

        scheduler
            .start(cfg(60.0, 0, 0), Box::new(NullSound), tx)
            .unwrap();
        scheduler.stop();

        // stop() joined the loop: whatever was delivered is already in the
        // channel, and the sender is gone.
        let count = rx.try_iter().count();
        assert!(count <= 1, "Expected zero or one beats, got {count}");
        assert!(matches!(rx.try_recv(), Err(mpsc::TryRecvError::Disconnected)));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        let mut scheduler = BeatScheduler::new();
        let (tx, rx) = mpsc::channel();
        let config = cfg(1200.0, 0, 0); // 50 ms per beat

        scheduler.start(config, Box::new(NullSound), tx).unwrap();
        // Second start with a different channel must not spawn a second loop.
        let (tx2, rx2) = mpsc::channel();
        scheduler.start(cfg(1200.0, 0, 0), Box::new(NullSound), tx2).unwrap();

        thread::sleep(Duration::from_millis(300));
        scheduler.stop();

        let received: Vec<Beat> = rx.try_iter().collect();
        for (position, beat) in received.iter().enumerate() {
            assert_eq!(beat.index, position as u64, "A second loop would duplicate indices");
        }
        assert_eq!(rx2.try_iter().count(), 0, "The ignored start must deliver nothing");
    }

    #[test]
    fn test_loop_ends_when_receiver_dropped() {
        let mut scheduler = BeatScheduler::new();
        let (tx, rx) = mpsc::channel();
        scheduler
            .start(cfg(1200.0, 0, 0), Box::new(NullSound), tx)
            .unwrap();
        drop(rx);

        // The loop notices the dead channel on the next beat and exits.
        thread::sleep(Duration::from_millis(300));
        assert!(!scheduler.is_running());
        scheduler.stop();
    }

    #[test]
    fn test_restart_after_stop_resets_indices() {
        let mut scheduler = BeatScheduler::new();
        let config = cfg(600.0, 0, 0);

        let (tx, rx) = mpsc::channel();
        scheduler.start(config, Box::new(NullSound), tx).unwrap();
        thread::sleep(Duration::from_millis(260));
        scheduler.stop();
        let first_run = rx.try_iter().count();
        assert!(first_run >= 1);

        let (tx, rx) = mpsc::channel();
        scheduler.start(config, Box::new(NullSound), tx).unwrap();
        thread::sleep(Duration::from_millis(160));
        scheduler.stop();

        let second: Vec<Beat> = rx.try_iter().collect();
        assert!(!second.is_empty());
        assert_eq!(second[0].index, 0, "A fresh start must re-anchor at beat 0");
    }

    #[test]
    fn test_beat_pacing_tracks_the_interval() {
        let mut scheduler = BeatScheduler::new();
        let (tx, rx) = mpsc::channel();
        let config = cfg(300.0, 0, 0); // 200 ms per beat

        scheduler.start(config, Box::new(NullSound), tx).unwrap();
        let mut stamps = Vec::new();
        while stamps.len() < 4 {
            rx.recv().unwrap();
            stamps.push(Instant::now());
        }
        scheduler.stop();

        let elapsed = stamps[3] - stamps[0];
        // Three intervals between four beats. Generous slack for CI load;
        // the point is that beats neither bunch up nor drift wildly.
        assert!(
            elapsed >= Duration::from_millis(540) && elapsed <= Duration::from_millis(1200),
            "Four beats at 300 bpm spanned {elapsed:?}"
        );
    }
}
