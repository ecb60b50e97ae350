//! The assembled step sequencer.
//!
//! Wiring, all through the bus:
//!
//! - `bpmChanged` → scheduler tempo
//! - `volumeChanged` → audio gain stage
//! - `noteAdded` / `noteRemoved` → display cell redraw

use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};
use sg_ir::{Action, Event, EventKind, NoteId, Pattern, PitchTable, TransportState, TOTAL_BEATS};

use crate::bus::EventBus;
use crate::pattern_store::PatternStore;
use crate::scheduler::{BeatScheduler, PlayState, SchedulerConfig, TempoHandle};
use crate::sinks::{AudioSink, DisplaySink, LoopHost};
use crate::transport::Transport;

/// Construction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequencerConfig {
    pub scheduler: SchedulerConfig,
    pub total_beats: usize,
    /// Values written by the `init` action
    pub transport: TransportState,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            total_beats: TOTAL_BEATS,
            transport: TransportState::default(),
        }
    }
}

/// Pattern, transport and scheduler bound to an audio and a display sink.
pub struct Sequencer<A, D> {
    bus: EventBus,
    transport: Transport,
    pattern: PatternStore,
    pitches: PitchTable,
    scheduler: BeatScheduler,
    audio: Rc<RefCell<A>>,
    display: Rc<RefCell<D>>,
}

impl<A, D> Sequencer<A, D>
where
    A: AudioSink + 'static,
    D: DisplaySink + 'static,
{
    /// Wire everything up and dispatch `init`.
    pub fn new(config: SequencerConfig, pitches: PitchTable, audio: A, display: D) -> Self {
        let bus = EventBus::new();
        let tempo = TempoHandle::new(config.transport.bpm);
        let audio = Rc::new(RefCell::new(audio));
        let display = Rc::new(RefCell::new(display));

        let t = tempo.clone();
        bus.subscribe(EventKind::BpmChanged, move |e| {
            if let Event::BpmChanged(bpm) = *e {
                t.set(bpm);
            }
        });
        let a = audio.clone();
        bus.subscribe(EventKind::VolumeChanged, move |e| {
            if let Event::VolumeChanged(volume) = *e {
                a.borrow_mut().set_gain(volume);
            }
        });
        let d = display.clone();
        bus.subscribe(EventKind::NoteAdded, move |e| {
            if let Event::NoteAdded(cell) = *e {
                d.borrow_mut().draw_note_cell(cell);
            }
        });
        let d = display.clone();
        bus.subscribe(EventKind::NoteRemoved, move |e| {
            if let Event::NoteRemoved(cell) = *e {
                d.borrow_mut().clear_note_cell(cell);
            }
        });

        let mut sequencer = Self {
            transport: Transport::new(config.transport, bus.clone()),
            pattern: PatternStore::new(config.total_beats, bus.clone()),
            scheduler: BeatScheduler::new(config.scheduler, tempo),
            bus,
            pitches,
            audio,
            display,
        };
        sequencer.dispatch(Action::Init);
        sequencer
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn transport(&self) -> &TransportState {
        self.transport.state()
    }

    pub fn pattern(&self) -> &Pattern {
        self.pattern.pattern()
    }

    pub fn pitches(&self) -> &PitchTable {
        &self.pitches
    }

    pub fn scheduler(&self) -> &BeatScheduler {
        &self.scheduler
    }

    pub fn audio(&self) -> Ref<'_, A> {
        self.audio.borrow()
    }

    pub fn audio_mut(&self) -> RefMut<'_, A> {
        self.audio.borrow_mut()
    }

    /// Must not be held across calls that publish note events.
    pub fn display(&self) -> Ref<'_, D> {
        self.display.borrow()
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    // --- Transport ---

    pub fn dispatch(&mut self, action: Action) {
        self.transport.dispatch(action);
    }

    pub fn dispatch_named(&mut self, name: &str, payload: Option<f64>) {
        self.transport.dispatch_named(name, payload);
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.dispatch(Action::SetBpm(bpm));
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.dispatch(Action::SetVolume(volume));
    }

    // --- Pattern ---

    pub fn is_active(&self, beat: usize, note: NoteId) -> bool {
        self.pattern.is_active(beat, note)
    }

    pub fn toggle_note(&mut self, beat: usize, note: NoteId) -> bool {
        self.pattern.toggle(beat, note)
    }

    /// Toggle by note name. `None` if the name is not in the pitch table.
    pub fn toggle_named(&mut self, beat: usize, name: &str) -> Option<bool> {
        let note = self.pitches.lookup(name)?;
        Some(self.toggle_note(beat, note))
    }

    pub fn clear_pattern(&mut self) {
        self.pattern.clear();
    }

    pub fn load_pattern(&mut self, pattern: Pattern) {
        self.pattern.replace(pattern);
    }

    // --- Playback loops ---

    pub fn toggle_playback<H: LoopHost + ?Sized>(&mut self, host: &mut H) -> PlayState {
        let mut audio = self.audio.borrow_mut();
        let state = self
            .scheduler
            .toggle_playback(self.pattern.pattern(), &self.pitches, &mut *audio, host);
        log::info!(target: "sequencer", "{:?} at {:.3}s", state, audio.now());
        state
    }

    /// Beat-timer callback.
    pub fn run_beat_loop<H: LoopHost + ?Sized>(&mut self, host: &mut H) {
        let mut audio = self.audio.borrow_mut();
        self.scheduler
            .run_beat_loop(self.pattern.pattern(), &self.pitches, &mut *audio, host);
    }

    /// Display-refresh callback.
    pub fn draw<H: LoopHost + ?Sized>(&mut self, host: &mut H) {
        let now = self.audio.borrow().now();
        let mut display = self.display.borrow_mut();
        self.scheduler.draw(now, &mut *display, host);
    }
}
