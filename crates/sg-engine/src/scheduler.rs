//! Look-ahead beat scheduling.
//!
//! Two loops share one precise clock (the audio sink's):
//!
//! - The **beat loop** runs on a coarse timer every `lookahead`. Each pass
//!   hands every beat due before `now + schedule_ahead` to the audio sink
//!   with its exact start time, so timer jitter never reaches the audio.
//! - The **draw loop** runs once per display refresh and highlights the
//!   most recent beat whose start time has passed, reading from the
//!   [`DrawQueue`] the beat loop fills.
//!
//! The beat loop only appends to the queue and the draw loop only pops
//! from it, so neither waits on the other.

use alloc::rc::Rc;
use core::cell::Cell;
use core::time::Duration;
use sg_ir::{NoteId, Pattern, PitchTable, PlaybackCursor, ScheduledBeat, Tone, DEFAULT_BPM, NOTE_DURATION};

use crate::draw_queue::DrawQueue;
use crate::sinks::{AudioSink, AudioState, DisplaySink, LoopHost};

/// Timing parameters of the two loops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Beat-loop timer period
    pub lookahead: Duration,
    /// How far past `now` beats are handed to the sink, in seconds
    pub schedule_ahead: f64,
    /// Length of every tone, in seconds
    pub note_duration: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead: Duration::from_millis(25),
            schedule_ahead: 0.1,
            note_duration: NOTE_DURATION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Shared tempo cell. Written by the transport's `BpmChanged` subscriber,
/// read by the beat loop each time it advances.
#[derive(Clone, Debug)]
pub struct TempoHandle(Rc<Cell<f64>>);

impl TempoHandle {
    pub fn new(bpm: f64) -> Self {
        Self(Rc::new(Cell::new(bpm)))
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, bpm: f64) {
        self.0.set(bpm);
    }
}

impl Default for TempoHandle {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

/// Playback state machine driving the beat and draw loops.
#[derive(Debug)]
pub struct BeatScheduler {
    config: SchedulerConfig,
    state: PlayState,
    cursor: PlaybackCursor,
    tempo: TempoHandle,
    draw_queue: DrawQueue,
    last_beat_drawn: Option<usize>,
}

impl BeatScheduler {
    pub fn new(config: SchedulerConfig, tempo: TempoHandle) -> Self {
        Self {
            config,
            state: PlayState::Stopped,
            cursor: PlaybackCursor::start(0.0),
            tempo,
            draw_queue: DrawQueue::new(),
            last_beat_drawn: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn tempo(&self) -> &TempoHandle {
        &self.tempo
    }

    pub fn draw_queue(&self) -> &DrawQueue {
        &self.draw_queue
    }

    pub fn last_beat_drawn(&self) -> Option<usize> {
        self.last_beat_drawn
    }

    /// Start or stop playback.
    ///
    /// Starting resumes a suspended sink, rewinds to beat 0 at the current
    /// clock time, runs one beat-loop pass and requests the first frame.
    /// Stopping only cancels the beat timer: tones already handed to the
    /// sink ring out, and the draw loop notices on its next tick.
    pub fn toggle_playback<A, H>(
        &mut self,
        pattern: &Pattern,
        pitches: &PitchTable,
        audio: &mut A,
        host: &mut H,
    ) -> PlayState
    where
        A: AudioSink + ?Sized,
        H: LoopHost + ?Sized,
    {
        match self.state {
            PlayState::Stopped => {
                if audio.state() == AudioState::Suspended {
                    audio.resume();
                }
                self.state = PlayState::Playing;
                self.cursor = PlaybackCursor::start(audio.now());
                log::debug!(target: "scheduler", "playing from {:.3}s", self.cursor.next_due);

                self.run_beat_loop(pattern, pitches, audio, host);
                host.request_frame();
            }
            PlayState::Playing => {
                self.state = PlayState::Stopped;
                host.cancel_beat_timer();
                log::debug!(target: "scheduler", "stopped at beat {}", self.cursor.beat);
            }
        }
        self.state
    }

    /// One beat-loop pass: fill the look-ahead horizon, then re-arm.
    pub fn run_beat_loop<A, H>(
        &mut self,
        pattern: &Pattern,
        pitches: &PitchTable,
        audio: &mut A,
        host: &mut H,
    ) where
        A: AudioSink + ?Sized,
        H: LoopHost + ?Sized,
    {
        if self.state != PlayState::Playing {
            return;
        }

        let total_beats = pattern.total_beats();
        while self.cursor.next_due < audio.now() + self.config.schedule_ahead {
            // A shorter pattern may have been swapped in mid-playback.
            self.cursor.beat %= total_beats;

            self.schedule_beat(self.cursor.beat, self.cursor.next_due, pattern, pitches, audio);
            self.cursor.advance(total_beats, self.tempo.get());
        }

        host.arm_beat_timer(self.config.lookahead);
    }

    fn schedule_beat<A>(&mut self, beat: usize, time: f64, pattern: &Pattern, pitches: &PitchTable, audio: &mut A)
    where
        A: AudioSink + ?Sized,
    {
        self.draw_queue.push(ScheduledBeat { beat, time });
        for note in pattern.notes(beat) {
            self.play_note(time, note, pitches, audio);
        }
    }

    fn play_note<A>(&self, time: f64, note: NoteId, pitches: &PitchTable, audio: &mut A)
    where
        A: AudioSink + ?Sized,
    {
        audio.schedule_tone(Tone {
            frequency: pitches.frequency(note),
            start: time,
            duration: self.config.note_duration,
        });
    }

    /// One draw-loop tick at clock time `now`.
    ///
    /// Does nothing, and does not request another frame, once stopped.
    pub fn draw<D, H>(&mut self, now: f64, display: &mut D, host: &mut H)
    where
        D: DisplaySink + ?Sized,
        H: LoopHost + ?Sized,
    {
        if self.state != PlayState::Playing {
            return;
        }

        let due = self.draw_queue.drain_due(now);
        if let Some(beat) = due {
            if self.last_beat_drawn != Some(beat) {
                display.highlight_beat(beat);
                self.last_beat_drawn = Some(beat);
            }
        }

        host.request_frame();
    }
}
