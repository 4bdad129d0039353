//! Click playback for the beat loop.
//!
//! rodio's output stream is not `Send`, so a dedicated audio thread owns
//! it and takes orders over a channel; the [`ClickPlayer`] handle that the
//! scheduler holds is just the sending half. If no output device exists
//! the thread logs one warning and swallows every click; the session
//! goes silent instead of failing.

use crate::scheduler::{BeatKind, BeatSound};
use log::{debug, warn};
use rodio::source::{SineWave, Source};
use rodio::OutputStream;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Handle to the audio thread. Dropping it shuts the thread down.
#[derive(Debug)]
pub struct ClickPlayer {
    clicks: mpsc::Sender<BeatKind>,
}

impl ClickPlayer {
    /// Start the audio thread and return the handle the scheduler plays
    /// through.
    #[must_use]
    pub fn spawn() -> Self {
        let (clicks, orders) = mpsc::channel();
        thread::spawn(move || audio_thread(&orders));
        Self { clicks }
    }
}

impl BeatSound for ClickPlayer {
    fn play(&mut self, kind: BeatKind) {
        // Fire-and-forget: a dead audio thread only costs the click.
        if self.clicks.send(kind).is_err() {
            debug!("Audio thread gone, click dropped");
        }
    }
}

fn audio_thread(orders: &mpsc::Receiver<BeatKind>) {
    let stream = OutputStream::try_default();
    let handle = match &stream {
        Ok((_stream, handle)) => Some(handle),
        Err(e) => {
            warn!("No audio output device ({e}); clicks disabled");
            None
        }
    };

    for kind in orders.iter() {
        let Some(handle) = handle else { continue };
        let (frequency, gain) = click_voicing(kind);
        let click = SineWave::new(frequency)
            .take_duration(CLICK_LENGTH)
            .amplify(gain);
        if let Err(e) = handle.play_raw(click) {
            debug!("Click playback failed: {e}");
        }
    }
}

const CLICK_LENGTH: Duration = Duration::from_millis(30);

/// Pitch and gain per beat kind. Count-in and regular beats share the
/// soft voicing; the accent is brighter and louder.
fn click_voicing(kind: BeatKind) -> (f32, f32) {
    match kind {
        BeatKind::Accent => (1760.0, 0.6),
        BeatKind::CountIn | BeatKind::Regular => (880.0, 0.35),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_beats_share_a_voicing() {
        assert_eq!(
            click_voicing(BeatKind::CountIn),
            click_voicing(BeatKind::Regular),
            "Count-in must use the same soft sound as a regular beat"
        );
        assert_ne!(click_voicing(BeatKind::Accent), click_voicing(BeatKind::Regular));
    }

    #[test]
    fn test_player_survives_missing_device() {
        // On machines without an output device the thread logs and drains;
        // playing must never panic or block.
        let mut player = ClickPlayer::spawn();
        for kind in [BeatKind::CountIn, BeatKind::Regular, BeatKind::Accent] {
            player.play(kind);
        }
        drop(player);
    }
}
