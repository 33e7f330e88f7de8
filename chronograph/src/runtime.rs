use crate::clock::MillisClock;
use crate::oled::{OledHandle, LINE_HEIGHT};
use crate::power_led::PowerLed;
#[cfg(feature = "serial")]
use crate::usb_serial::UsbConsole;
use chronograph_lib::averager::{AveragerConfig, IntervalAverager};
#[cfg(feature = "serial")]
use chronograph_lib::command::Command;
use chronograph_lib::report::ReportLine;
use core::cell::Cell;
#[cfg(feature = "serial")]
use core::fmt::Write;
use rp2040_hal::Timer;

/// Time between main loop iterations.
const LOOP_AVERAGING: AveragerConfig = AveragerConfig::new(1_000, 100_000);

/// Time spent servicing usb and the display each iteration.
const WORK_AVERAGING: AveragerConfig = AveragerConfig::new(1_000, 100_000);

const LOOP_LABEL: &str = "loop";
const WORK_LABEL: &str = "work";

fn begin<R: FnMut(f32)>(
    averager: &mut IntervalAverager<MillisClock, R>,
    config: AveragerConfig,
    report: R,
) {
    averager.begin(
        config.measurements_to_average(),
        config.events_to_result(),
        Some(report),
    );
    averager.mark_start();
}

fn rearm<R: FnMut(f32)>(averager: &mut IntervalAverager<MillisClock, R>, config: AveragerConfig) {
    averager.rearm(config.measurements_to_average(), config.events_to_result());
    averager.mark_start();
}

#[inline(never)]
pub fn run(
    #[cfg(feature = "serial")] mut console: UsbConsole,
    mut oled: OledHandle,
    mut power_led: PowerLed,
    timer: Timer,
) -> ! {
    let loop_report: Cell<Option<f32>> = Cell::new(None);
    let work_report: Cell<Option<f32>> = Cell::new(None);
    let clock = MillisClock::new(timer);
    let mut loop_avg = IntervalAverager::new(clock);
    let mut work_avg = IntervalAverager::new(clock);
    begin(&mut loop_avg, LOOP_AVERAGING, |avg: f32| {
        loop_report.set(Some(avg));
    });
    begin(&mut work_avg, WORK_AVERAGING, |avg: f32| {
        work_report.set(Some(avg));
    });

    oled.clear();
    let _ = oled.write(0, "LOOP");
    let pending = ReportLine::new(LOOP_LABEL, 0.0, false).oled_text();
    let _ = oled.write(LINE_HEIGHT, pending.as_str());
    let _ = oled.write(LINE_HEIGHT * 2, "WORK");
    let pending = ReportLine::new(WORK_LABEL, 0.0, false).oled_text();
    let _ = oled.write(LINE_HEIGHT * 3, pending.as_str());
    loop {
        work_avg.mark_start();
        #[cfg(feature = "serial")]
        let command = console.poll();
        if let Some(avg) = loop_report.take() {
            let line = ReportLine::new(LOOP_LABEL, avg, loop_avg.has_valid_result());
            let _ = oled.rewrite(LINE_HEIGHT, line.oled_text().as_str());
            #[cfg(feature = "serial")]
            if let Some(s) = line.serial_line() {
                let _ = console.write_str(s.as_str());
            }
            power_led.toggle();
        }
        if let Some(avg) = work_report.take() {
            let line = ReportLine::new(WORK_LABEL, avg, work_avg.has_valid_result());
            let _ = oled.rewrite(LINE_HEIGHT * 3, line.oled_text().as_str());
            #[cfg(feature = "serial")]
            if let Some(s) = line.serial_line() {
                let _ = console.write_str(s.as_str());
            }
        }
        work_avg.mark_end();
        loop_avg.mark_event();

        #[cfg(feature = "serial")]
        match command {
            Some(Command::Boot) => {
                rp2040_hal::rom_data::reset_to_usb_boot(0, 0);
            }
            Some(Command::Output) => {
                console.enable_output();
                let _ = console.write_str("Chronograph running\r\n");
            }
            Some(Command::Led) => {
                power_led.toggle();
            }
            Some(Command::Reset) => {
                rearm(&mut loop_avg, LOOP_AVERAGING);
                rearm(&mut work_avg, WORK_AVERAGING);
                let _ = console.write_str("Averages reset\r\n");
            }
            None => {}
        }
    }
}
