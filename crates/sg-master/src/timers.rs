//! Wall-clock timers for the beat and draw loops.

use std::time::{Duration, Instant};

use sg_engine::LoopHost;

/// One-shot beat timer plus a frame-request flag, polled by the host's
/// event loop.
#[derive(Debug, Clone)]
pub struct LoopTimers {
    now: Instant,
    beat_deadline: Option<Instant>,
    frame_requested: bool,
}

impl LoopTimers {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            beat_deadline: None,
            frame_requested: false,
        }
    }

    /// Advance the reference time used when arming the beat timer.
    pub fn set_now(&mut self, now: Instant) {
        self.now = self.now.max(now);
    }

    pub fn beat_deadline(&self) -> Option<Instant> {
        self.beat_deadline
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_requested
    }

    /// Disarm and report the beat timer if it is due at `now`.
    pub fn take_due_beat(&mut self, now: Instant) -> bool {
        match self.beat_deadline {
            Some(deadline) if deadline <= now => {
                self.beat_deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }
}

impl LoopHost for LoopTimers {
    fn arm_beat_timer(&mut self, delay: Duration) {
        self.beat_deadline = Some(self.now + delay);
    }

    fn cancel_beat_timer(&mut self) {
        self.beat_deadline = None;
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_timer_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut timers = LoopTimers::new(t0);
        timers.arm_beat_timer(Duration::from_millis(25));

        assert!(!timers.take_due_beat(t0 + Duration::from_millis(10)));
        assert!(timers.take_due_beat(t0 + Duration::from_millis(25)));
        assert!(!timers.take_due_beat(t0 + Duration::from_millis(50)));
    }

    #[test]
    fn rearming_replaces_pending_timer() {
        let t0 = Instant::now();
        let mut timers = LoopTimers::new(t0);
        timers.arm_beat_timer(Duration::from_millis(25));
        timers.set_now(t0 + Duration::from_millis(5));
        timers.arm_beat_timer(Duration::from_millis(25));
        assert_eq!(timers.beat_deadline(), Some(t0 + Duration::from_millis(30)));

        timers.cancel_beat_timer();
        assert_eq!(timers.beat_deadline(), None);
    }

    #[test]
    fn frame_request_is_consumed() {
        let mut timers = LoopTimers::new(Instant::now());
        assert!(!timers.take_frame_request());
        timers.request_frame();
        timers.request_frame();
        assert!(timers.frame_pending());
        assert!(timers.take_frame_request());
        assert!(!timers.take_frame_request());
    }
}
