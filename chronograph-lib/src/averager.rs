use crate::clock::{elapsed, TickSource, Ticks};

/// Report type for an averager that never reports, names the callback type of
/// an instance configured without one.
pub type Unreported = fn(f32);

/// Effective averaging thresholds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AveragerConfig {
    measurements_to_average: u32,
    events_to_result: u32,
}

impl AveragerConfig {
    /// `measurements_to_average` is clamped down to `events_to_result`.
    #[must_use]
    pub const fn new(measurements_to_average: u32, events_to_result: u32) -> Self {
        let measurements_to_average = if measurements_to_average > events_to_result {
            events_to_result
        } else {
            measurements_to_average
        };
        Self {
            measurements_to_average,
            events_to_result,
        }
    }

    #[inline]
    #[must_use]
    pub const fn measurements_to_average(&self) -> u32 {
        self.measurements_to_average
    }

    #[inline]
    #[must_use]
    pub const fn events_to_result(&self) -> u32 {
        self.events_to_result
    }
}

/// Keeps a running average of the ticks elapsed between events.
///
/// Samples are folded into a cumulative average until `measurements_to_average`
/// of them have been seen, after that the sample count is held and each new
/// sample decays the weight of the older ones. The published [`Self::average`]
/// stays at zero until the first update that pushes the count past the
/// threshold.
///
/// Every `events_to_result + 1` updates the registered report is called with
/// the published average.
pub struct IntervalAverager<C, R> {
    clock: C,
    report: Option<R>,
    config: AveragerConfig,
    last_event: Ticks,
    moving_average: f32,
    current_average: f32,
    measurement_counter: u32,
    event_counter: u32,
    valid: bool,
}

impl<C, R> IntervalAverager<C, R> {
    /// Unconfigured averager, call [`Self::begin`] before use to set thresholds.
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            report: None,
            config: AveragerConfig::new(0, 0),
            last_event: 0,
            moving_average: 0.0,
            current_average: 0.0,
            measurement_counter: 0,
            event_counter: 0,
            valid: false,
        }
    }

    #[must_use]
    pub fn with_config(
        clock: C,
        measurements_to_average: u32,
        events_to_result: u32,
        report: Option<R>,
    ) -> Self {
        let mut averager = Self::new(clock);
        averager.begin(measurements_to_average, events_to_result, report);
        averager
    }

    /// Set thresholds and report, and reset all measurement state.
    pub fn begin(&mut self, measurements_to_average: u32, events_to_result: u32, report: Option<R>) {
        self.rearm(measurements_to_average, events_to_result);
        self.report = report;
    }

    /// Like [`Self::begin`] but keeps the currently registered report.
    pub fn rearm(&mut self, measurements_to_average: u32, events_to_result: u32) {
        self.config = AveragerConfig::new(measurements_to_average, events_to_result);
        self.last_event = 0;
        self.moving_average = 0.0;
        self.current_average = 0.0;
        self.measurement_counter = 0;
        self.event_counter = 0;
        self.valid = false;
    }

    #[inline]
    #[must_use]
    pub const fn has_valid_result(&self) -> bool {
        self.valid
    }

    /// Last published average in ticks, zero until [`Self::has_valid_result`].
    #[inline]
    #[must_use]
    pub const fn average(&self) -> f32 {
        self.current_average
    }

    /// Average including the warm-up samples, regardless of validity.
    #[inline]
    #[must_use]
    pub const fn raw_average(&self) -> f32 {
        self.moving_average
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> AveragerConfig {
        self.config
    }

    #[inline]
    #[must_use]
    pub const fn measurement_count(&self) -> u32 {
        self.measurement_counter
    }

    #[inline]
    #[must_use]
    pub const fn last_event(&self) -> Ticks {
        self.last_event
    }
}

impl<C, R> IntervalAverager<C, R>
where
    C: TickSource,
    R: FnMut(f32),
{
    /// Measure the time since the previous event (or [`Self::mark_start`]).
    #[inline]
    pub fn mark_event(&mut self) {
        self.update();
    }

    /// Start timing a process, finished by [`Self::mark_end`].
    #[inline]
    pub fn mark_start(&mut self) {
        self.last_event = self.clock.now();
    }

    /// Finish timing the process begun with [`Self::mark_start`].
    #[inline]
    pub fn mark_end(&mut self) {
        self.update();
    }

    #[expect(clippy::cast_precision_loss)]
    fn update(&mut self) {
        let now = self.clock.now();
        let sample = elapsed(self.last_event, now) as f32;
        if !self.valid {
            self.measurement_counter = self.measurement_counter.wrapping_add(1);
            if self.measurement_counter > self.config.measurements_to_average {
                self.measurement_counter = self.config.measurements_to_average;
                self.valid = true;
            }
        }
        let weight = self.measurement_counter as f32;
        self.moving_average = (sample + weight * self.moving_average) / (weight + 1.0);
        if self.valid {
            self.current_average = self.moving_average;
        }
        self.last_event = now;

        self.event_counter = self.event_counter.wrapping_add(1);
        if self.event_counter > self.config.events_to_result {
            self.event_counter = 0;
            if let Some(report) = self.report.as_mut() {
                report(self.current_average);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};

    fn at(now: &Cell<u32>, ticks: u32) {
        now.set(ticks);
    }

    #[test]
    fn config_clamps_measurements() {
        let cfg = AveragerConfig::new(10, 4);
        assert_eq!(4, cfg.measurements_to_average());
        assert_eq!(4, cfg.events_to_result());
        let cfg = AveragerConfig::new(3, 5);
        assert_eq!(3, cfg.measurements_to_average());
        assert_eq!(5, cfg.events_to_result());
    }

    #[test]
    fn clamped_threshold_drives_validity() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 10, 2, None);
        assert_eq!(2, avg.config().measurements_to_average());
        for t in [5, 10] {
            at(&now, t);
            avg.mark_event();
            assert!(!avg.has_valid_result());
        }
        at(&now, 15);
        avg.mark_event();
        assert!(avg.has_valid_result());
        assert_eq!(2, avg.measurement_count());
    }

    #[test]
    fn cumulative_average_sequence() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 3, 5, None);
        let mut raw = Vec::new();
        // Elapsed 10, 20, 30, 40
        for t in [10, 30, 60, 100] {
            at(&now, t);
            avg.mark_event();
            raw.push(avg.raw_average());
        }
        assert_eq!(vec![5.0, 10.0, 15.0, 21.25], raw);
        assert!(avg.has_valid_result());
        assert_eq!(21.25, avg.average());
        assert_eq!(3, avg.measurement_count());
    }

    #[test]
    fn saturated_window_keeps_weighting() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 1, 1, None);
        at(&now, 10);
        avg.mark_event();
        // (10 + 1 * 0) / 2
        assert_eq!(5.0, avg.raw_average());
        assert!(!avg.has_valid_result());
        at(&now, 40);
        avg.mark_event();
        // (30 + 1 * 5) / 2
        assert_eq!(17.5, avg.average());
        at(&now, 100);
        avg.mark_event();
        // (60 + 1 * 17.5) / 2
        assert_eq!(38.75, avg.average());
        assert_eq!(1, avg.measurement_count());
    }

    #[test]
    #[expect(clippy::cast_precision_loss)]
    fn warm_up_follows_incremented_counter() {
        let now = Cell::new(0);
        let m = 4;
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), m, 8, None);
        let mut t = 0;
        let mut expected = 0.0f32;
        for (updates, sample) in (1u32..).zip([50u32, 30, 7, 13, 22, 5, 18, 40]) {
            t += sample;
            at(&now, t);
            avg.mark_event();
            let weight = updates.min(m) as f32;
            expected = (sample as f32 + weight * expected) / (weight + 1.0);
            assert_eq!(expected, avg.raw_average(), "update {updates}");
            assert_eq!(updates > m, avg.has_valid_result(), "update {updates}");
            assert_eq!(updates.min(m), avg.measurement_count());
        }
        assert_eq!(expected, avg.average());
    }

    #[test]
    fn validity_latches_once() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 3, 3, None);
        let mut flags = Vec::new();
        for t in 1..=10 {
            at(&now, t * 7);
            avg.mark_event();
            flags.push(avg.has_valid_result());
        }
        assert_eq!(
            vec![false, false, false, true, true, true, true, true, true, true],
            flags
        );
    }

    #[test]
    fn published_average_frozen_before_valid() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 2, 4, None);
        at(&now, 50);
        avg.mark_event();
        at(&now, 90);
        avg.mark_event();
        assert!(!avg.has_valid_result());
        assert_eq!(0.0, avg.average());
        // (50 + 0) / 2, then (40 + 2 * 25) / 3
        assert_eq!(30.0, avg.raw_average());
        at(&now, 110);
        avg.mark_event();
        assert!(avg.has_valid_result());
        assert_eq!(avg.raw_average(), avg.average());
    }

    #[test]
    fn reports_every_k_plus_one_updates() {
        let now = Cell::new(0);
        let reports = RefCell::new(Vec::new());
        let mut avg = IntervalAverager::with_config(
            || now.get(),
            0,
            2,
            Some(|v: f32| reports.borrow_mut().push(v)),
        );
        for i in 1..=9 {
            at(&now, i * 10);
            avg.mark_event();
            assert_eq!((i / 3) as usize, reports.borrow().len());
        }
        assert_eq!(vec![10.0, 10.0, 10.0], *reports.borrow());
    }

    #[test]
    fn report_carries_published_average() {
        let now = Cell::new(0);
        let reports = RefCell::new(Vec::new());
        let mut avg = IntervalAverager::with_config(
            || now.get(),
            1,
            1,
            Some(|v: f32| reports.borrow_mut().push(v)),
        );
        // Elapsed 10, 30, 60, 20
        for t in [10, 40, 100, 120] {
            at(&now, t);
            avg.mark_event();
            if reports.borrow().len() == 1 {
                assert!(avg.has_valid_result());
            }
        }
        // Raw 5, 17.5, 38.75, 29.375
        assert_eq!(vec![17.5, 29.375], *reports.borrow());
    }

    #[test]
    fn zero_events_reports_every_update() {
        let now = Cell::new(0);
        let count = Cell::new(0);
        let mut avg = IntervalAverager::with_config(
            || now.get(),
            0,
            0,
            Some(|_: f32| count.set(count.get() + 1)),
        );
        for t in 1..=5 {
            at(&now, t);
            avg.mark_event();
        }
        assert_eq!(5, count.get());
        assert!(avg.has_valid_result());
        assert_eq!(1.0, avg.average());
    }

    #[test]
    fn unconfigured_behaves_as_zero_thresholds() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> = IntervalAverager::new(|| now.get());
        assert!(!avg.has_valid_result());
        at(&now, 12);
        avg.mark_event();
        assert!(avg.has_valid_result());
        assert_eq!(12.0, avg.average());
    }

    #[test]
    fn elapsed_survives_clock_wrap() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 0, 5, None);
        at(&now, u32::MAX - 9);
        avg.mark_start();
        at(&now, 20);
        avg.mark_end();
        assert_eq!(30.0, avg.average());
        assert_eq!(20, avg.last_event());
    }

    #[test]
    fn start_end_matches_event() {
        let now = Cell::new(0);
        let mut paired: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 0, 5, None);
        let mut single: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 0, 5, None);
        at(&now, 100);
        paired.mark_start();
        single.mark_event();
        at(&now, 135);
        paired.mark_end();
        single.mark_event();
        assert_eq!(35.0, paired.raw_average());
        assert_eq!(single.raw_average(), paired.raw_average());
    }

    #[test]
    fn mark_start_does_not_update() {
        let now = Cell::new(0);
        let count = Cell::new(0);
        let mut avg = IntervalAverager::with_config(
            || now.get(),
            0,
            0,
            Some(|_: f32| count.set(count.get() + 1)),
        );
        at(&now, 40);
        avg.mark_start();
        assert_eq!(0, count.get());
        assert_eq!(0.0, avg.raw_average());
        assert_eq!(40, avg.last_event());
    }

    #[test]
    fn begin_resets_state() {
        let now = Cell::new(0);
        let mut avg: IntervalAverager<_, Unreported> =
            IntervalAverager::with_config(|| now.get(), 1, 1, None);
        for t in [10, 20, 30] {
            at(&now, t);
            avg.mark_event();
        }
        assert!(avg.has_valid_result());
        avg.begin(4, 8, None);
        assert!(!avg.has_valid_result());
        assert_eq!(0.0, avg.average());
        assert_eq!(0.0, avg.raw_average());
        assert_eq!(0, avg.measurement_count());
        assert_eq!(0, avg.last_event());
        assert_eq!(AveragerConfig::new(4, 8), avg.config());
        avg.begin(4, 8, None);
        assert!(!avg.has_valid_result());
        assert_eq!(0.0, avg.average());
    }

    #[test]
    fn begin_without_report_disables_reporting() {
        let now = Cell::new(0);
        let count = Cell::new(0);
        let mut avg = IntervalAverager::with_config(
            || now.get(),
            0,
            0,
            Some(|_: f32| count.set(count.get() + 1)),
        );
        at(&now, 1);
        avg.mark_event();
        assert_eq!(1, count.get());
        avg.begin(0, 0, None);
        at(&now, 2);
        avg.mark_event();
        assert_eq!(1, count.get());
    }

    #[test]
    fn rearm_keeps_report() {
        let now = Cell::new(0);
        let count = Cell::new(0);
        let mut avg = IntervalAverager::with_config(
            || now.get(),
            0,
            0,
            Some(|_: f32| count.set(count.get() + 1)),
        );
        at(&now, 1);
        avg.mark_event();
        avg.rearm(0, 1);
        assert!(!avg.has_valid_result());
        at(&now, 2);
        avg.mark_event();
        assert_eq!(1, count.get());
        at(&now, 3);
        avg.mark_event();
        assert_eq!(2, count.get());
    }
}
