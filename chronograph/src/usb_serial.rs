use chronograph_lib::command::{Command, CommandWindow};
use core::borrow::BorrowMut;
use core::fmt::Write;
use rp2040_hal::usb::UsbBus;
use usb_device::bus::UsbBusAllocator;
use usb_device::device::{UsbDevice, UsbDeviceBuilder, UsbVidPid};
use usb_device::UsbError;
use usbd_serial::SerialPort;

pub struct UsbSerial<'a> {
    pub(crate) inner: SerialPort<'a, UsbBus>,
}

impl<'a> UsbSerial<'a> {
    pub fn new(usb_bus: &'a UsbBusAllocator<UsbBus>) -> Self {
        // Set up the USB Communications Class Device driver
        let inner = SerialPort::new(usb_bus);
        Self { inner }
    }
}

impl Write for UsbSerial<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        serial_write_all(&mut self.inner, s.as_bytes());
        Ok(())
    }
}

fn serial_write_all<W: usb_device::bus::UsbBus, B1: BorrowMut<[u8]>, B2: BorrowMut<[u8]>>(
    serial: &mut SerialPort<W, B1, B2>,
    buf: &[u8],
) {
    for chunk in buf.chunks(16) {
        let mut rem = chunk;
        while !rem.is_empty() {
            match serial.write(rem) {
                Ok(wrote) => {
                    rem = &rem[wrote..];
                }
                Err(UsbError::WouldBlock) => {}
                Err(_e) => {
                    return;
                }
            }
        }
    }
}

pub struct UsbSerialDevice<'a> {
    pub(crate) inner: UsbDevice<'a, UsbBus>,
}

impl<'a> UsbSerialDevice<'a> {
    pub fn new(usb_bus: &'a UsbBusAllocator<UsbBus>) -> Self {
        let inner = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("Fake company")
            .product("Chronograph")
            .serial_number("TEST")
            .device_class(2) // from: https://www.usb.org/defined-class-codes
            .build();
        Self { inner }
    }
}

/// Serial port plus the command window fed from it.
/// Writes are dropped until the host asks for output.
pub struct UsbConsole<'a> {
    serial: UsbSerial<'a>,
    dev: UsbSerialDevice<'a>,
    window: CommandWindow<16>,
    output: bool,
}

impl<'a> UsbConsole<'a> {
    pub fn new(usb_bus: &'a UsbBusAllocator<UsbBus>) -> Self {
        // Ordering here is extremely important, serial before device.
        let serial = UsbSerial::new(usb_bus);
        let dev = UsbSerialDevice::new(usb_bus);
        Self {
            serial,
            dev,
            window: CommandWindow::new(),
            output: false,
        }
    }

    /// Service the device, returns the last command completed by the bytes read.
    pub fn poll(&mut self) -> Option<Command> {
        if !self.dev.inner.poll(&mut [&mut self.serial.inner]) {
            return None;
        }
        let mut buf = [0u8; 64];
        let count = match self.serial.inner.read(&mut buf) {
            Ok(count) => count,
            Err(_e) => return None,
        };
        let mut found = None;
        for byte in &buf[..count] {
            if let Some(cmd) = self.window.push(*byte) {
                found = Some(cmd);
            }
        }
        found
    }

    #[inline]
    pub fn enable_output(&mut self) {
        self.output = true;
    }
}

impl Write for UsbConsole<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if self.output {
            self.serial.write_str(s)
        } else {
            Ok(())
        }
    }
}
