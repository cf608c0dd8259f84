//! Terminal attributes.
//!
//! [`TermAttrs`] mirrors the kernel's termios control block by wrapping the
//! `nix` binding's [`Termios`] value. All accessors here operate on the
//! in-memory copy only; [`crate::Terminal`] is responsible for moving the
//! copy to and from the kernel.
//!
//! Baud rates are exposed as human integers (9600, 115200, ...) and related
//! to the kernel's opaque speed tokens by a fixed lookup table.

use nix::sys::termios::{self, BaudRate, ControlFlags, LocalFlags, Termios};

use crate::error::{Result, TtyError};
use crate::mode::Mode;

/// Parity mode of the line, stored in PARENB/PARODD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    /// The mode-string letter for this parity.
    pub fn letter(self) -> char {
        match self {
            Parity::None => 'n',
            Parity::Even => 'e',
            Parity::Odd => 'o',
        }
    }

    /// Parse a mode-string parity letter (case-insensitive).
    pub fn from_letter(letter: char) -> Result<Self> {
        match letter.to_ascii_lowercase() {
            'n' => Ok(Parity::None),
            'e' => Ok(Parity::Even),
            'o' => Ok(Parity::Odd),
            _ => Err(TtyError::InvalidParity(letter.to_string())),
        }
    }
}

/// Character size of the line, stored in the CSIZE field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSize {
    Five,
    Six,
    Seven,
    Eight,
}

impl CharSize {
    /// Bits per character.
    pub fn bits(self) -> u8 {
        match self {
            CharSize::Five => 5,
            CharSize::Six => 6,
            CharSize::Seven => 7,
            CharSize::Eight => 8,
        }
    }

    /// Parse a bit count in 5..=8.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            5 => Ok(CharSize::Five),
            6 => Ok(CharSize::Six),
            7 => Ok(CharSize::Seven),
            8 => Ok(CharSize::Eight),
            _ => Err(TtyError::InvalidCharSize(bits.to_string())),
        }
    }

    fn flag(self) -> ControlFlags {
        match self {
            CharSize::Five => ControlFlags::CS5,
            CharSize::Six => ControlFlags::CS6,
            CharSize::Seven => ControlFlags::CS7,
            CharSize::Eight => ControlFlags::CS8,
        }
    }
}

/// Stop-bit count of the line, stored in CSTOPB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub fn count(self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }

    /// Parse a stop-bit count, 1 or 2.
    pub fn from_count(count: u8) -> Result<Self> {
        match count {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            _ => Err(TtyError::InvalidStopBits(count.to_string())),
        }
    }
}

/// Human baud integers and the kernel speed tokens they stand for.
///
/// The two are related by this table only; there is no formula.
const BAUD_TABLE: &[(u32, BaudRate)] = &[
    (0, BaudRate::B0),
    (50, BaudRate::B50),
    (75, BaudRate::B75),
    (110, BaudRate::B110),
    (134, BaudRate::B134),
    (150, BaudRate::B150),
    (200, BaudRate::B200),
    (300, BaudRate::B300),
    (600, BaudRate::B600),
    (1200, BaudRate::B1200),
    (1800, BaudRate::B1800),
    (2400, BaudRate::B2400),
    (4800, BaudRate::B4800),
    (9600, BaudRate::B9600),
    (19200, BaudRate::B19200),
    (38400, BaudRate::B38400),
    (57600, BaudRate::B57600),
    (115200, BaudRate::B115200),
    (230400, BaudRate::B230400),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (460800, BaudRate::B460800),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (500000, BaudRate::B500000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (576000, BaudRate::B576000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (921600, BaudRate::B921600),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (1000000, BaudRate::B1000000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (1152000, BaudRate::B1152000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (1500000, BaudRate::B1500000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (2000000, BaudRate::B2000000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (2500000, BaudRate::B2500000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (3000000, BaudRate::B3000000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (3500000, BaudRate::B3500000),
    #[cfg(any(target_os = "android", target_os = "linux"))]
    (4000000, BaudRate::B4000000),
];

pub(crate) fn speed_to_baud(speed: u32) -> Result<BaudRate> {
    BAUD_TABLE
        .iter()
        .find(|(human, _)| *human == speed)
        .map(|(_, baud)| *baud)
        .ok_or(TtyError::UnsupportedBaud(speed))
}

/// Tokens outside the table read back as 0.
pub(crate) fn baud_to_speed(baud: BaudRate) -> u32 {
    BAUD_TABLE
        .iter()
        .find(|(_, token)| *token == baud)
        .map(|(human, _)| *human)
        .unwrap_or(0)
}

macro_rules! flag_accessors {
    ($($get:ident / $set:ident => $field:ident, $flags:ident :: $flag:ident, $what:literal;)+) => {
        $(
            #[doc = concat!("Whether ", $what, " is enabled.")]
            pub fn $get(&self) -> bool {
                self.inner.$field.contains($flags::$flag)
            }

            #[doc = concat!("Enable or disable ", $what, ".")]
            pub fn $set(&mut self, on: bool) {
                self.inner.$field.set($flags::$flag, on);
            }
        )+
    };
}

/// A snapshot of a terminal's line settings.
///
/// Obtained from [`crate::Terminal::attrs`], mutated in memory, and written
/// back wholesale with [`crate::Terminal::set_attrs`].
#[derive(Debug, Clone)]
pub struct TermAttrs {
    inner: Termios,
}

impl From<Termios> for TermAttrs {
    fn from(inner: Termios) -> Self {
        Self { inner }
    }
}

impl From<TermAttrs> for Termios {
    fn from(attrs: TermAttrs) -> Termios {
        attrs.inner
    }
}

impl TermAttrs {
    /// Input baud rate as a human integer.
    pub fn input_speed(&self) -> u32 {
        baud_to_speed(termios::cfgetispeed(&self.inner))
    }

    /// Output baud rate as a human integer.
    pub fn output_speed(&self) -> u32 {
        baud_to_speed(termios::cfgetospeed(&self.inner))
    }

    /// Set both baud-rate selectors.
    pub fn set_speed(&mut self, speed: u32) -> Result<()> {
        let baud = speed_to_baud(speed)?;
        termios::cfsetspeed(&mut self.inner, baud)?;
        Ok(())
    }

    /// Set the input baud-rate selector only.
    pub fn set_input_speed(&mut self, speed: u32) -> Result<()> {
        let baud = speed_to_baud(speed)?;
        termios::cfsetispeed(&mut self.inner, baud)?;
        Ok(())
    }

    /// Set the output baud-rate selector only.
    pub fn set_output_speed(&mut self, speed: u32) -> Result<()> {
        let baud = speed_to_baud(speed)?;
        termios::cfsetospeed(&mut self.inner, baud)?;
        Ok(())
    }

    /// Character size from the CSIZE field.
    pub fn char_size(&self) -> CharSize {
        let masked = self.inner.control_flags & ControlFlags::CSIZE;
        match masked {
            f if f == ControlFlags::CS8 => CharSize::Eight,
            f if f == ControlFlags::CS7 => CharSize::Seven,
            f if f == ControlFlags::CS6 => CharSize::Six,
            _ => CharSize::Five,
        }
    }

    /// Replace the CSIZE field.
    pub fn set_char_size(&mut self, size: CharSize) {
        self.inner.control_flags.remove(ControlFlags::CSIZE);
        self.inner.control_flags.insert(size.flag());
    }

    /// Parity from PARENB/PARODD.
    pub fn parity(&self) -> Parity {
        let flags = self.inner.control_flags;
        if !flags.contains(ControlFlags::PARENB) {
            Parity::None
        } else if flags.contains(ControlFlags::PARODD) {
            Parity::Odd
        } else {
            Parity::Even
        }
    }

    /// Set PARENB/PARODD. `Parity::None` clears both bits.
    pub fn set_parity(&mut self, parity: Parity) {
        let flags = &mut self.inner.control_flags;
        match parity {
            Parity::None => {
                flags.remove(ControlFlags::PARENB);
                flags.remove(ControlFlags::PARODD);
            }
            Parity::Even => {
                flags.insert(ControlFlags::PARENB);
                flags.remove(ControlFlags::PARODD);
            }
            Parity::Odd => {
                flags.insert(ControlFlags::PARENB);
                flags.insert(ControlFlags::PARODD);
            }
        }
    }

    /// Stop-bit count from CSTOPB.
    pub fn stop_bits(&self) -> StopBits {
        if self.inner.control_flags.contains(ControlFlags::CSTOPB) {
            StopBits::Two
        } else {
            StopBits::One
        }
    }

    /// Set CSTOPB.
    pub fn set_stop_bits(&mut self, stop_bits: StopBits) {
        self.inner
            .control_flags
            .set(ControlFlags::CSTOPB, stop_bits == StopBits::Two);
    }

    flag_accessors! {
        receiver_enabled / set_receiver_enabled => control_flags, ControlFlags::CREAD, "the receiver (CREAD)";
        hangup_on_close / set_hangup_on_close => control_flags, ControlFlags::HUPCL, "hang-up on last close (HUPCL)";
        local_mode / set_local_mode => control_flags, ControlFlags::CLOCAL, "local mode (CLOCAL)";
        canonical / set_canonical => local_flags, LocalFlags::ICANON, "canonical line-editing input (ICANON)";
        echo / set_echo => local_flags, LocalFlags::ECHO, "input echo (ECHO)";
    }

    /// The output-side line settings as a [`Mode`].
    pub fn mode(&self) -> Mode {
        Mode {
            speed: self.output_speed(),
            char_size: self.char_size(),
            parity: self.parity(),
            stop_bits: self.stop_bits(),
        }
    }

    /// Apply a [`Mode`] to the speed, size, parity, and stop-bit fields.
    pub fn apply_mode(&mut self, mode: &Mode) -> Result<()> {
        self.set_speed(mode.speed)?;
        self.set_char_size(mode.char_size);
        self.set_parity(mode.parity);
        self.set_stop_bits(mode.stop_bits);
        Ok(())
    }

    /// The wrapped termios value, for flags this wrapper does not name.
    pub fn as_termios(&self) -> &Termios {
        &self.inner
    }

    /// Mutable access to the wrapped termios value.
    pub fn as_termios_mut(&mut self) -> &mut Termios {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> TermAttrs {
        let raw: nix::libc::termios = unsafe { std::mem::zeroed() };
        TermAttrs::from(Termios::from(raw))
    }

    #[test]
    fn test_speed_round_trip() {
        let mut attrs = blank();
        attrs.set_speed(19200).unwrap();
        assert_eq!(attrs.input_speed(), 19200);
        assert_eq!(attrs.output_speed(), 19200);

        // On Linux the two selectors share storage, so only the output side
        // is asserted after a one-sided change.
        attrs.set_output_speed(9600).unwrap();
        assert_eq!(attrs.output_speed(), 9600);
    }

    #[test]
    fn test_speed_rejects_off_table_rates() {
        let mut attrs = blank();
        assert!(matches!(
            attrs.set_speed(12345),
            Err(TtyError::UnsupportedBaud(12345))
        ));
    }

    #[test]
    fn test_char_size_masking() {
        let mut attrs = blank();
        assert_eq!(attrs.char_size(), CharSize::Five);

        attrs.set_char_size(CharSize::Eight);
        assert_eq!(attrs.char_size(), CharSize::Eight);

        // Replacing the field must not leave stale CSIZE bits behind.
        attrs.set_char_size(CharSize::Seven);
        assert_eq!(attrs.char_size(), CharSize::Seven);
    }

    #[test]
    fn test_parity_transitions() {
        let mut attrs = blank();
        assert_eq!(attrs.parity(), Parity::None);

        attrs.set_parity(Parity::Odd);
        assert_eq!(attrs.parity(), Parity::Odd);

        attrs.set_parity(Parity::Even);
        assert_eq!(attrs.parity(), Parity::Even);

        attrs.set_parity(Parity::None);
        assert_eq!(attrs.parity(), Parity::None);
        assert!(!attrs.as_termios().control_flags.contains(ControlFlags::PARODD));
    }

    #[test]
    fn test_stop_bits() {
        let mut attrs = blank();
        assert_eq!(attrs.stop_bits(), StopBits::One);
        attrs.set_stop_bits(StopBits::Two);
        assert_eq!(attrs.stop_bits(), StopBits::Two);
        attrs.set_stop_bits(StopBits::One);
        assert_eq!(attrs.stop_bits(), StopBits::One);
    }

    #[test]
    fn test_flag_accessors() {
        let mut attrs = blank();
        assert!(!attrs.echo());
        attrs.set_echo(true);
        assert!(attrs.echo());

        assert!(!attrs.canonical());
        attrs.set_canonical(true);
        assert!(attrs.canonical());
        attrs.set_canonical(false);
        assert!(!attrs.canonical());

        attrs.set_receiver_enabled(true);
        attrs.set_hangup_on_close(true);
        attrs.set_local_mode(true);
        assert!(attrs.receiver_enabled());
        assert!(attrs.hangup_on_close());
        assert!(attrs.local_mode());
    }

    #[test]
    fn test_mode_round_trip_through_attrs() {
        let mut attrs = blank();
        let mode: Mode = "19200,8,n,1".parse().unwrap();
        attrs.apply_mode(&mode).unwrap();
        assert_eq!(attrs.mode().to_string(), "19200,8,n,1");
    }

    #[test]
    fn test_token_conversions() {
        assert_eq!(Parity::from_letter('N').unwrap(), Parity::None);
        assert_eq!(Parity::from_letter('e').unwrap(), Parity::Even);
        assert!(matches!(
            Parity::from_letter('x'),
            Err(TtyError::InvalidParity(_))
        ));

        assert_eq!(CharSize::from_bits(7).unwrap().bits(), 7);
        assert!(matches!(
            CharSize::from_bits(9),
            Err(TtyError::InvalidCharSize(_))
        ));

        assert_eq!(StopBits::from_count(2).unwrap().count(), 2);
        assert!(matches!(
            StopBits::from_count(3),
            Err(TtyError::InvalidStopBits(_))
        ));
    }
}
