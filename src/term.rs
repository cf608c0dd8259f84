//! The terminal handle.
//!
//! [`Terminal`] binds the wrapper to one descriptor: either a device file
//! it opened itself (closed on drop) or one of the three standard
//! descriptors (borrowed, never closed). Every accessor is a synchronous
//! getattr or getattr/mutate/setattr cycle against that descriptor; nothing
//! is cached.

use std::fs::OpenOptions;
use std::io::{self, Stderr, Stdin, Stdout};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use nix::libc::O_NONBLOCK;
use nix::sys::termios::{self, FlushArg, SetArg};
use tracing::debug;

use crate::attrs::{CharSize, Parity, StopBits, TermAttrs};
use crate::error::{Result, TtyError};
use crate::mode::Mode;
use crate::modem::{self, ModemLines};

/// When a [`Terminal::set_attrs_when`] write takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum When {
    /// Immediately.
    #[default]
    Now,
    /// After pending output has drained.
    Drain,
    /// After draining output and discarding pending input.
    Flush,
}

impl From<When> for SetArg {
    fn from(when: When) -> SetArg {
        match when {
            When::Now => SetArg::TCSANOW,
            When::Drain => SetArg::TCSADRAIN,
            When::Flush => SetArg::TCSAFLUSH,
        }
    }
}

enum Handle {
    File(std::fs::File),
    Stdin(Stdin),
    Stdout(Stdout),
    Stderr(Stderr),
}

impl AsFd for Handle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            Handle::File(file) => file.as_fd(),
            Handle::Stdin(stdin) => stdin.as_fd(),
            Handle::Stdout(stdout) => stdout.as_fd(),
            Handle::Stderr(stderr) => stderr.as_fd(),
        }
    }
}

impl AsRawFd for Handle {
    fn as_raw_fd(&self) -> RawFd {
        self.as_fd().as_raw_fd()
    }
}

/// A descriptor with terminal line settings behind it.
pub struct Terminal {
    handle: Handle,
    name: String,
}

impl Terminal {
    /// Open a terminal device.
    ///
    /// The descriptor is opened read-only with O_NONBLOCK and probed with a
    /// `tcgetattr` round trip; a path the probe rejects is reported as not
    /// a terminal. The descriptor closes when the handle drops.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(O_NONBLOCK)
            .open(path)
            .map_err(|source| TtyError::Open {
                path: name.clone(),
                source,
            })?;
        if termios::tcgetattr(file.as_fd()).is_err() {
            return Err(TtyError::NotATerminal(name));
        }
        debug!("Opened terminal {}", name);
        Ok(Self {
            handle: Handle::File(file),
            name,
        })
    }

    /// Bind to the controlling terminal.
    ///
    /// Probes stdin, stdout, and stderr in order and takes the first that
    /// answers `tcgetattr`. The descriptor is borrowed and never closed.
    pub fn from_stdio() -> Result<Self> {
        let candidates = [
            (Handle::Stdin(io::stdin()), "stdin"),
            (Handle::Stdout(io::stdout()), "stdout"),
            (Handle::Stderr(io::stderr()), "stderr"),
        ];
        for (handle, name) in candidates {
            if termios::tcgetattr(handle.as_fd()).is_ok() {
                debug!("Using {} as the terminal", name);
                return Ok(Self {
                    handle,
                    name: name.to_string(),
                });
            }
        }
        Err(TtyError::NoTerminal)
    }

    /// The opened path, or the stdio label the probe selected.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the line settings fresh from the kernel.
    pub fn attrs(&self) -> Result<TermAttrs> {
        Ok(termios::tcgetattr(self.handle.as_fd())?.into())
    }

    /// Write line settings back wholesale, taking effect immediately.
    pub fn set_attrs(&self, attrs: &TermAttrs) -> Result<()> {
        self.set_attrs_when(When::Now, attrs)
    }

    /// Write line settings back wholesale at the given time.
    pub fn set_attrs_when(&self, when: When, attrs: &TermAttrs) -> Result<()> {
        termios::tcsetattr(self.handle.as_fd(), when.into(), attrs.as_termios())?;
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut TermAttrs) -> Result<()>,
    {
        let mut attrs = self.attrs()?;
        apply(&mut attrs)?;
        self.set_attrs(&attrs)
    }

    /// Output baud rate.
    pub fn speed(&self) -> Result<u32> {
        Ok(self.attrs()?.output_speed())
    }

    /// Input baud rate.
    pub fn input_speed(&self) -> Result<u32> {
        Ok(self.attrs()?.input_speed())
    }

    /// Set both baud-rate selectors.
    pub fn set_speed(&self, speed: u32) -> Result<()> {
        self.update(|attrs| attrs.set_speed(speed))
    }

    /// Set the input baud-rate selector only.
    pub fn set_input_speed(&self, speed: u32) -> Result<()> {
        self.update(|attrs| attrs.set_input_speed(speed))
    }

    /// Set the output baud-rate selector only.
    pub fn set_output_speed(&self, speed: u32) -> Result<()> {
        self.update(|attrs| attrs.set_output_speed(speed))
    }

    /// Current line settings as a [`Mode`].
    pub fn mode(&self) -> Result<Mode> {
        Ok(self.attrs()?.mode())
    }

    /// Apply a [`Mode`] to the line.
    pub fn set_mode(&self, mode: &Mode) -> Result<()> {
        self.update(|attrs| attrs.apply_mode(mode))
    }

    pub fn char_size(&self) -> Result<CharSize> {
        Ok(self.attrs()?.char_size())
    }

    pub fn set_char_size(&self, size: CharSize) -> Result<()> {
        self.update(|attrs| {
            attrs.set_char_size(size);
            Ok(())
        })
    }

    pub fn parity(&self) -> Result<Parity> {
        Ok(self.attrs()?.parity())
    }

    pub fn set_parity(&self, parity: Parity) -> Result<()> {
        self.update(|attrs| {
            attrs.set_parity(parity);
            Ok(())
        })
    }

    pub fn stop_bits(&self) -> Result<StopBits> {
        Ok(self.attrs()?.stop_bits())
    }

    pub fn set_stop_bits(&self, stop_bits: StopBits) -> Result<()> {
        self.update(|attrs| {
            attrs.set_stop_bits(stop_bits);
            Ok(())
        })
    }

    pub fn canonical(&self) -> Result<bool> {
        Ok(self.attrs()?.canonical())
    }

    pub fn set_canonical(&self, on: bool) -> Result<()> {
        self.update(|attrs| {
            attrs.set_canonical(on);
            Ok(())
        })
    }

    pub fn echo(&self) -> Result<bool> {
        Ok(self.attrs()?.echo())
    }

    pub fn set_echo(&self, on: bool) -> Result<()> {
        self.update(|attrs| {
            attrs.set_echo(on);
            Ok(())
        })
    }

    pub fn receiver_enabled(&self) -> Result<bool> {
        Ok(self.attrs()?.receiver_enabled())
    }

    pub fn set_receiver_enabled(&self, on: bool) -> Result<()> {
        self.update(|attrs| {
            attrs.set_receiver_enabled(on);
            Ok(())
        })
    }

    pub fn hangup_on_close(&self) -> Result<bool> {
        Ok(self.attrs()?.hangup_on_close())
    }

    pub fn set_hangup_on_close(&self, on: bool) -> Result<()> {
        self.update(|attrs| {
            attrs.set_hangup_on_close(on);
            Ok(())
        })
    }

    pub fn local_mode(&self) -> Result<bool> {
        Ok(self.attrs()?.local_mode())
    }

    pub fn set_local_mode(&self, on: bool) -> Result<()> {
        self.update(|attrs| {
            attrs.set_local_mode(on);
            Ok(())
        })
    }

    /// Current modem line states (TIOCMGET).
    pub fn modem_lines(&self) -> Result<ModemLines> {
        modem::lines(self.handle.as_raw_fd())
    }

    /// Replace the modem line word wholesale (TIOCMSET).
    pub fn set_modem_lines(&self, lines: ModemLines) -> Result<()> {
        modem::set_lines(self.handle.as_raw_fd(), lines)
    }

    /// Raise the named lines (TIOCMBIS).
    pub fn raise_modem_lines(&self, lines: ModemLines) -> Result<()> {
        modem::raise(self.handle.as_raw_fd(), lines)
    }

    /// Drop the named lines (TIOCMBIC).
    pub fn lower_modem_lines(&self, lines: ModemLines) -> Result<()> {
        modem::lower(self.handle.as_raw_fd(), lines)
    }

    pub fn dtr(&self) -> Result<bool> {
        Ok(self.modem_lines()?.contains(ModemLines::DTR))
    }

    pub fn set_dtr(&self, on: bool) -> Result<()> {
        if on {
            self.raise_modem_lines(ModemLines::DTR)
        } else {
            self.lower_modem_lines(ModemLines::DTR)
        }
    }

    pub fn rts(&self) -> Result<bool> {
        Ok(self.modem_lines()?.contains(ModemLines::RTS))
    }

    pub fn set_rts(&self, on: bool) -> Result<()> {
        if on {
            self.raise_modem_lines(ModemLines::RTS)
        } else {
            self.lower_modem_lines(ModemLines::RTS)
        }
    }

    pub fn cts(&self) -> Result<bool> {
        Ok(self.modem_lines()?.contains(ModemLines::CTS))
    }

    pub fn dsr(&self) -> Result<bool> {
        Ok(self.modem_lines()?.contains(ModemLines::DSR))
    }

    pub fn carrier_detect(&self) -> Result<bool> {
        Ok(self.modem_lines()?.contains(ModemLines::CAR))
    }

    pub fn ring_indicator(&self) -> Result<bool> {
        Ok(self.modem_lines()?.contains(ModemLines::RNG))
    }

    /// Block until pending output has drained (tcdrain).
    pub fn drain(&self) -> Result<()> {
        termios::tcdrain(self.handle.as_fd())?;
        Ok(())
    }

    /// Discard pending input and output (tcflush, both queues).
    pub fn flush(&self) -> Result<()> {
        termios::tcflush(self.handle.as_fd(), FlushArg::TCIOFLUSH)?;
        Ok(())
    }

    /// Transmit a break for the default duration (tcsendbreak).
    pub fn send_break(&self) -> Result<()> {
        termios::tcsendbreak(self.handle.as_fd(), 0)?;
        Ok(())
    }
}

impl AsFd for Terminal {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.handle.as_fd()
    }
}

impl AsRawFd for Terminal {
    fn as_raw_fd(&self) -> RawFd {
        self.handle.as_raw_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_non_terminal() {
        match Terminal::open("/dev/null") {
            Err(TtyError::NotATerminal(name)) => assert_eq!(name, "/dev/null"),
            Err(other) => panic!("expected NotATerminal, got {other:?}"),
            Ok(_) => panic!("expected NotATerminal, got a terminal"),
        }
    }

    #[test]
    fn test_open_reports_missing_path() {
        assert!(matches!(
            Terminal::open("/definitely/not/a/device"),
            Err(TtyError::Open { .. })
        ));
    }

    #[test]
    fn test_when_maps_to_setarg() {
        assert_eq!(SetArg::from(When::Now), SetArg::TCSANOW);
        assert_eq!(SetArg::from(When::Drain), SetArg::TCSADRAIN);
        assert_eq!(SetArg::from(When::Flush), SetArg::TCSAFLUSH);
        assert_eq!(When::default(), When::Now);
    }
}
