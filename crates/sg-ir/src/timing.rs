//! Audio-clock timing records.
//!
//! All times are seconds on the audio sink's precise clock.

/// Beats are sixteenth notes: four steps per quarter-note beat.
pub const STEPS_PER_BEAT: f64 = 4.0;

/// Fixed length of every triggered tone, in seconds.
pub const NOTE_DURATION: f64 = 0.1;

/// Seconds between consecutive steps at `bpm`.
pub fn step_interval(bpm: f64) -> f64 {
    60.0 / (bpm * STEPS_PER_BEAT)
}

/// Scheduler position: the next beat to schedule and when it sounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackCursor {
    pub beat: usize,
    pub next_due: f64,
}

impl PlaybackCursor {
    /// Cursor at beat 0, sounding at `now`.
    pub const fn start(now: f64) -> Self {
        Self { beat: 0, next_due: now }
    }

    /// Step to the next beat, wrapping at `total_beats`.
    pub fn advance(&mut self, total_beats: usize, bpm: f64) {
        self.beat = (self.beat + 1) % total_beats;
        self.next_due += step_interval(bpm);
    }
}

/// A beat handed to the audio sink, waiting for the display to catch up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledBeat {
    pub beat: usize,
    /// When the beat's notes start sounding
    pub time: f64,
}

/// One fixed-timbre (sawtooth) tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    /// Frequency in Hz
    pub frequency: f32,
    /// Start time in seconds
    pub start: f64,
    /// Length in seconds
    pub duration: f64,
}

impl Tone {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_interval_at_120_bpm() {
        assert_eq!(step_interval(120.0), 0.125);
        assert_eq!(step_interval(60.0), 0.25);
    }

    #[test]
    fn cursor_wraps() {
        let mut cursor = PlaybackCursor::start(1.0);
        for _ in 0..4 {
            cursor.advance(4, 120.0);
        }
        assert_eq!(cursor.beat, 0);
        assert_eq!(cursor.next_due, 1.5);
    }

    #[test]
    fn cursor_never_reaches_total() {
        let mut cursor = PlaybackCursor::start(0.0);
        for _ in 0..100 {
            cursor.advance(32, 120.0);
            assert!(cursor.beat < 32);
        }
    }

    #[test]
    fn tone_end() {
        let tone = Tone { frequency: 440.0, start: 2.0, duration: 0.5 };
        assert_eq!(tone.end(), 2.5);
    }
}
