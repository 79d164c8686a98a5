use std::thread;
use std::time::Duration;
use verdure::canvas::Delay;

/// Sleeps the calling thread for a scaled version of each requested pause.
///
/// A scale of 1 is real time, 0.1 runs ten times faster, and 0 never sleeps.
/// The total requested time is tracked unscaled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScaledDelay {
    scale: f32,
    requested_us: u64,
}

impl ScaledDelay {
    /// Constructor.  Negative scales are treated as zero.
    pub fn new(scale: f32) -> Self {
        Self {
            scale: scale.max(0.0),
            requested_us: 0,
        }
    }
    /// Total pause time requested so far, in microseconds
    pub fn requested_us(&self) -> u64 {
        self.requested_us
    }
    fn sleep_us(&mut self, us: u64) {
        self.requested_us += us;
        if self.scale > 0.0 && us > 0 {
            thread::sleep(Duration::from_secs_f64(us as f64 * self.scale as f64 / 1e6));
        }
    }
}

impl Delay for ScaledDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.sleep_us(ms as u64 * 1000);
    }
    fn delay_us(&mut self, us: u32) {
        self.sleep_us(us as u64);
    }
}
