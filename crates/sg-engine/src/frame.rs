//! Audio frame type.

/// A stereo audio frame, nominally in `-1.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    pub const fn silence() -> Self {
        Self { left: 0.0, right: 0.0 }
    }

    /// Same value on both channels.
    pub const fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    pub fn is_silent(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }

    /// Clamp and convert to 16-bit PCM `(left, right)`.
    pub fn to_i16(self) -> (i16, i16) {
        let convert = |v: f32| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        (convert(self.left), convert(self.right))
    }
}
