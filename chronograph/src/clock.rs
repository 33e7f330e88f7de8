use chronograph_lib::clock::{TickSource, Ticks};
use rp2040_hal::Timer;

/// Milliseconds since boot off the rp2040 timer, wrapping like an arduino `millis()`.
#[derive(Copy, Clone)]
pub struct MillisClock {
    timer: Timer,
}

impl MillisClock {
    pub const fn new(timer: Timer) -> Self {
        Self { timer }
    }
}

impl TickSource for MillisClock {
    #[inline]
    #[expect(clippy::cast_possible_truncation)]
    fn now(&mut self) -> Ticks {
        self.timer
            .get_counter()
            .duration_since_epoch()
            .to_millis() as Ticks
    }
}
