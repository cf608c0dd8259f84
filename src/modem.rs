//! Modem control lines.
//!
//! The kernel reports and accepts the line states as a `TIOCM_*` bit word;
//! [`ModemLines`] names the bits and the free functions wrap the four
//! ioctls that move the word.

use std::fmt;
use std::os::fd::RawFd;

use bitflags::bitflags;
use nix::libc::{self, c_int};
use nix::{ioctl_read_bad, ioctl_write_ptr_bad};

use crate::error::Result;

bitflags! {
    /// Modem control and status lines.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModemLines: c_int {
        /// Line enable.
        const LE = libc::TIOCM_LE;
        /// Data terminal ready.
        const DTR = libc::TIOCM_DTR;
        /// Request to send.
        const RTS = libc::TIOCM_RTS;
        /// Secondary transmit.
        const ST = libc::TIOCM_ST;
        /// Secondary receive.
        const SR = libc::TIOCM_SR;
        /// Clear to send.
        const CTS = libc::TIOCM_CTS;
        /// Carrier detect.
        const CAR = libc::TIOCM_CAR;
        /// Ring indicator.
        const RNG = libc::TIOCM_RNG;
        /// Data set ready.
        const DSR = libc::TIOCM_DSR;
    }
}

impl fmt::Display for ModemLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

ioctl_read_bad!(
    /// Get the modem line word
    tiocmget,
    libc::TIOCMGET,
    c_int
);

ioctl_write_ptr_bad!(
    /// Set the modem line word wholesale
    tiocmset,
    libc::TIOCMSET,
    c_int
);

ioctl_write_ptr_bad!(
    /// Raise the named lines
    tiocmbis,
    libc::TIOCMBIS,
    c_int
);

ioctl_write_ptr_bad!(
    /// Drop the named lines
    tiocmbic,
    libc::TIOCMBIC,
    c_int
);

pub(crate) fn lines(fd: RawFd) -> Result<ModemLines> {
    let mut bits: c_int = 0;
    unsafe { tiocmget(fd, &mut bits) }?;
    Ok(ModemLines::from_bits_retain(bits))
}

pub(crate) fn set_lines(fd: RawFd, lines: ModemLines) -> Result<()> {
    let bits = lines.bits();
    unsafe { tiocmset(fd, &bits) }?;
    Ok(())
}

pub(crate) fn raise(fd: RawFd, lines: ModemLines) -> Result<()> {
    let bits = lines.bits();
    unsafe { tiocmbis(fd, &bits) }?;
    Ok(())
}

pub(crate) fn lower(fd: RawFd, lines: ModemLines) -> Result<()> {
    let bits = lines.bits();
    unsafe { tiocmbic(fd, &bits) }?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_match_libc() {
        assert_eq!(ModemLines::DTR.bits(), libc::TIOCM_DTR);
        assert_eq!(ModemLines::RTS.bits(), libc::TIOCM_RTS);
        assert_eq!(ModemLines::CTS.bits(), libc::TIOCM_CTS);
        assert_eq!(ModemLines::DSR.bits(), libc::TIOCM_DSR);
        assert_eq!(ModemLines::CAR.bits(), libc::TIOCM_CAR);
        assert_eq!(ModemLines::RNG.bits(), libc::TIOCM_RNG);
    }

    #[test]
    fn test_display_names() {
        let lines = ModemLines::DTR | ModemLines::RTS;
        assert_eq!(lines.to_string(), "DTR RTS");
        assert_eq!(ModemLines::empty().to_string(), "");
    }

    #[test]
    fn test_unknown_bits_survive() {
        let word = libc::TIOCM_DTR | 0x8000;
        let lines = ModemLines::from_bits_retain(word);
        assert!(lines.contains(ModemLines::DTR));
        assert_eq!(lines.bits(), word);
    }
}
