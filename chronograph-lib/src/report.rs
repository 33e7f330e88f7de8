use core::fmt::Write;
use heapless::String;

/// Capacity of a serial report line.
pub const LINE_CAPACITY: usize = 64;

/// Capacity of a line on the 32 pixel wide oled, 5 glyphs of 6 pixels.
pub const OLED_CAPACITY: usize = 5;

/// A single average reading, ready to be written out.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReportLine {
    pub label: &'static str,
    pub average: f32,
    pub valid: bool,
}

impl ReportLine {
    #[must_use]
    pub const fn new(label: &'static str, average: f32, valid: bool) -> Self {
        Self {
            label,
            average,
            valid,
        }
    }

    /// Serial form, `None` if it doesn't fit in [`LINE_CAPACITY`].
    #[must_use]
    pub fn serial_line(&self) -> Option<String<LINE_CAPACITY>> {
        let mut s = String::new();
        s.write_fmt(format_args!(
            "{} avg={:.2} ms valid={}\r\n",
            self.label, self.average, self.valid
        ))
        .ok()?;
        Some(s)
    }

    /// Short oled form, tagged with the first char of the label.
    /// Shows dots until there's a valid average, or if the value doesn't fit.
    #[must_use]
    pub fn oled_text(&self) -> String<OLED_CAPACITY> {
        let tag = self.label.chars().next().unwrap_or('?');
        let mut s = String::new();
        if self.valid && s.write_fmt(format_args!("{tag} {:.1}", self.average)).is_ok() {
            return s;
        }
        s.clear();
        let _ = s.write_fmt(format_args!("{tag} ..."));
        s
    }
}
