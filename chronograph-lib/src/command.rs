/// Commands a host can type into the serial console.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// Reset into the usb bootloader
    Boot,
    /// Start writing reports to serial
    Output,
    /// Toggle the power led
    Led,
    /// Re-arm the averagers, discarding collected measurements
    Reset,
}

impl Command {
    const ALL: [Self; 4] = [Self::Boot, Self::Output, Self::Led, Self::Reset];

    #[must_use]
    pub const fn keyword(self) -> &'static [u8] {
        match self {
            Self::Boot => b"boot",
            Self::Output => b"output",
            Self::Led => b"led",
            Self::Reset => b"reset",
        }
    }
}

/// The last `N` bytes received, commands are recognized at the tail.
pub struct CommandWindow<const N: usize> {
    last_chars: [u8; N],
}

impl<const N: usize> CommandWindow<N> {
    /// # Panics
    /// Window too small to hold the longest keyword
    #[must_use]
    pub const fn new() -> Self {
        assert!(N >= 6, "Window can't fit all commands");
        Self { last_chars: [0u8; N] }
    }

    /// Shift in one byte, returns the command it completes, if any.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        self.last_chars.copy_within(1..N, 0);
        self.last_chars[N - 1] = byte;
        let found = Command::ALL
            .into_iter()
            .find(|cmd| self.last_chars.ends_with(cmd.keyword()));
        if found.is_some() {
            // Don't let the same bytes match again
            self.last_chars = [0u8; N];
        }
        found
    }
}
