/// Millisecond ticks, wrapping at `u32::MAX`.
pub type Ticks = u32;

/// Something that can be asked for the current tick count.
///
/// The counter must increase monotonically and is allowed to wrap around,
/// elapsed time is always computed with modular subtraction.
pub trait TickSource {
    fn now(&mut self) -> Ticks;
}

impl<F> TickSource for F
where
    F: FnMut() -> Ticks,
{
    #[inline]
    fn now(&mut self) -> Ticks {
        self()
    }
}

/// Ticks passed from `earlier` to `later`, correct across a single wrap of the counter.
#[inline]
#[must_use]
pub const fn elapsed(earlier: Ticks, later: Ticks) -> Ticks {
    later.wrapping_sub(earlier)
}
