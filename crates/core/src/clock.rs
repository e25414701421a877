//! Frame clock - turns animation-frame timestamps into tick deltas

/// Tracks the previous frame timestamp.
///
/// The first frame after construction or [`FrameClock::reanchor`] yields a
/// zero delta, so time spent paused never reaches the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    last_ms: Option<u64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous frame (0 on the first frame, and for
    /// timestamps that go backwards)
    pub fn delta(&mut self, now_ms: u64) -> u32 {
        let delta = match self.last_ms {
            Some(last) => now_ms.saturating_sub(last).min(u32::MAX as u64) as u32,
            None => 0,
        };
        self.last_ms = Some(now_ms);
        delta
    }

    /// Forget the previous timestamp
    pub fn reanchor(&mut self) {
        self.last_ms = None;
    }
}
