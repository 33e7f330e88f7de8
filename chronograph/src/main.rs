#![cfg_attr(not(test), no_std)]
#![no_main]

mod clock;
mod oled;
mod power_led;
mod runtime;
#[cfg(feature = "serial")]
mod usb_serial;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::BinaryColor;
// The macro for our start-up function
use liatris::{entry, Pins};

// A shorter alias for the Peripheral Access Crate, which provides low-level
// register access
use liatris::hal::pac;

// A shorter alias for the Hardware Abstraction Layer, which provides
// higher-level drivers.
use liatris::hal;

use crate::oled::OledHandle;
use crate::power_led::PowerLed;
use liatris::pac::I2C1;
use rp2040_hal::clocks::{ClocksManager, PeripheralClock};
use rp2040_hal::fugit::RateExtU32;
use rp2040_hal::gpio::bank0::{Gpio2, Gpio3};
use rp2040_hal::gpio::{FunctionI2C, Pin, PullDown};
use rp2040_hal::pll::common_configs::{PLL_SYS_125MHZ, PLL_USB_48MHZ};
use rp2040_hal::pll::setup_pll_blocking;
use rp2040_hal::xosc::setup_xosc_blocking;
use rp2040_hal::Clock;
use ssd1306::mode::DisplayConfig;
use ssd1306::prelude::DisplayRotation;
use ssd1306::size::DisplaySize128x32;
use ssd1306::Ssd1306;

/// Entry point to our bare-metal application.
///
/// The `#[entry]` macro ensures the Cortex-M start-up code calls this function
/// as soon as all global variables are initialised.
///
/// The function configures the RP2040 peripherals, then times its own main loop,
/// showing the averages on the oled and, with `serial`, over USB Serial.
#[entry]
fn main() -> ! {
    setup_chronograph()
}

#[expect(clippy::cast_possible_truncation)]
fn setup_chronograph() -> ! {
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    let xosc = setup_xosc_blocking(pac.XOSC, liatris::XOSC_CRYSTAL_FREQ.Hz()).unwrap();
    watchdog.enable_tick_generation((liatris::XOSC_CRYSTAL_FREQ / 1_000_000) as u8);

    let mut clocks = ClocksManager::new(pac.CLOCKS);
    let pll_sys = setup_pll_blocking(
        pac.PLL_SYS,
        xosc.operating_frequency(),
        PLL_SYS_125MHZ,
        &mut clocks,
        &mut pac.RESETS,
    )
    .unwrap();
    let pll_usb = setup_pll_blocking(
        pac.PLL_USB,
        xosc.operating_frequency(),
        PLL_USB_48MHZ,
        &mut clocks,
        &mut pac.RESETS,
    )
    .unwrap();
    clocks.init_default(&xosc, &pll_sys, &pll_usb).unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let sio = hal::Sio::new(pac.SIO);
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let sda_pin = pins.gpio2.into_function::<hal::gpio::FunctionI2C>();
    let scl_pin = pins.gpio3.into_function::<hal::gpio::FunctionI2C>();
    let oled = setup_oled(
        pac.I2C1,
        &mut pac.RESETS,
        sda_pin,
        scl_pin,
        &clocks.peripheral_clock,
    );

    // Set up the USB driver
    #[cfg(feature = "serial")]
    let usb_bus = usb_device::bus::UsbBusAllocator::new(hal::usb::UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));

    let power_led_pin = pins.power_led.into_push_pull_output();
    let pl = PowerLed::new(power_led_pin);

    runtime::run(
        #[cfg(feature = "serial")]
        usb_serial::UsbConsole::new(&usb_bus),
        oled,
        pl,
        timer,
    )
}

fn setup_oled(
    i2c: I2C1,
    r: &mut pac::RESETS,
    sda: Pin<Gpio2, FunctionI2C, PullDown>,
    scl: Pin<Gpio3, FunctionI2C, PullDown>,
    clock: &PeripheralClock,
) -> OledHandle {
    let i2c = hal::I2C::i2c1(
        i2c,
        sda.reconfigure(),
        scl.reconfigure(),
        400.kHz(),
        r,
        clock,
    );

    let interface = ssd1306::I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate90)
        .into_buffered_graphics_mode();
    display.init().unwrap();
    let _ = display.clear(BinaryColor::Off);
    let _ = display.flush();
    OledHandle::new(display)
}

#[panic_handler]
#[inline(never)]
fn halt(_info: &core::panic::PanicInfo) -> ! {
    loop {
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}
