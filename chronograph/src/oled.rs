use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::Point;
use embedded_graphics::mono_font::iso_8859_2::FONT_6X9;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use liatris::pac::I2C1;
use rp2040_hal::gpio::bank0::{Gpio2, Gpio3};
use rp2040_hal::gpio::{FunctionI2C, Pin, PullUp};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::{Brightness, DisplaySize128x32, I2CInterface};
use ssd1306::Ssd1306;

pub type OledI2c = rp2040_hal::I2C<
    I2C1,
    (
        Pin<Gpio2, FunctionI2C, PullUp>,
        Pin<Gpio3, FunctionI2C, PullUp>,
    ),
>;

pub type OledDisplay =
    Ssd1306<I2CInterface<OledI2c>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>;

/// Rows on the display, rotated so it's 32 pixels wide.
pub const LINE_HEIGHT: i32 = 18;

pub struct OledHandle {
    display: OledDisplay,
}

impl OledHandle {
    pub fn new(mut display: OledDisplay) -> Self {
        let _ = display.set_brightness(Brightness::BRIGHTEST);
        Self { display }
    }

    pub fn clear(&mut self) {
        self.display.clear_buffer();
        let _ = self.display.flush();
    }

    pub fn write(&mut self, l: i32, s: &str) -> bool {
        let text_style = MonoTextStyleBuilder::new()
            .font(&FONT_6X9)
            .text_color(BinaryColor::On)
            .build();
        if Text::with_baseline(s, Point::new(0, l), text_style, Baseline::Top)
            .draw(&mut self.display)
            .is_ok()
        {
            return self.display.flush().is_ok();
        }
        false
    }

    pub fn clear_line(&mut self, l: i32) -> bool {
        self.display
            .fill_solid(
                &Rectangle {
                    top_left: Point::new(0, l),
                    size: Size::new(32, 9),
                },
                BinaryColor::Off,
            )
            .is_ok()
    }

    /// Replace the text on line `l` and flush.
    pub fn rewrite(&mut self, l: i32, s: &str) -> bool {
        self.clear_line(l) && self.write(l, s)
    }
}
