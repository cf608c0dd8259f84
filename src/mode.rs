//! Mode strings.
//!
//! A [`Mode`] is the classic four-field serial line description:
//!
//! ```text
//! baud , character size , parity , stop bits
//! 9600 , 8              , n      , 1
//! ```
//!
//! Parsing validates every field: the baud integer must be in the speed
//! table, the size in 5..=8, the parity letter one of `n`/`e`/`o`
//! (case-insensitive), and the stop count 1 or 2. Formatting joins the four
//! fields back with lowercase parity, so a canonical string survives a
//! parse/format round trip unchanged.

use std::fmt;
use std::str::FromStr;

use crate::attrs::{speed_to_baud, CharSize, Parity, StopBits};
use crate::error::TtyError;

/// Parsed form of a `"baud,size,parity,stop"` mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub speed: u32,
    pub char_size: CharSize,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl FromStr for Mode {
    type Err = TtyError;

    fn from_str(s: &str) -> Result<Self, TtyError> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [speed, size, parity, stop] = fields.as_slice() else {
            return Err(TtyError::InvalidMode(s.to_string()));
        };

        let speed: u32 = speed
            .parse()
            .map_err(|_| TtyError::InvalidMode(s.to_string()))?;
        speed_to_baud(speed)?;

        let bits: u8 = size
            .parse()
            .map_err(|_| TtyError::InvalidCharSize(size.to_string()))?;
        let char_size = CharSize::from_bits(bits)?;

        let mut letters = parity.chars();
        let parity = match (letters.next(), letters.next()) {
            (Some(letter), None) => Parity::from_letter(letter)?,
            _ => return Err(TtyError::InvalidParity(parity.to_string())),
        };

        let count: u8 = stop
            .parse()
            .map_err(|_| TtyError::InvalidStopBits(stop.to_string()))?;
        let stop_bits = StopBits::from_count(count)?;

        Ok(Mode {
            speed,
            char_size,
            parity,
            stop_bits,
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.speed,
            self.char_size.bits(),
            self.parity.letter(),
            self.stop_bits.count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let mode: Mode = "19200,8,n,1".parse().unwrap();
        assert_eq!(mode.speed, 19200);
        assert_eq!(mode.char_size, CharSize::Eight);
        assert_eq!(mode.parity, Parity::None);
        assert_eq!(mode.stop_bits, StopBits::One);
    }

    #[test]
    fn test_round_trip() {
        for s in ["19200,8,n,1", "9600,7,e,2", "115200,8,o,1", "0,5,n,1"] {
            assert_eq!(s.parse::<Mode>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_parse_tolerates_spacing_and_case() {
        let mode: Mode = " 9600, 7, E, 2 ".parse().unwrap();
        assert_eq!(mode.to_string(), "9600,7,e,2");
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert!(matches!(
            "9600,8,n".parse::<Mode>(),
            Err(TtyError::InvalidMode(_))
        ));
        assert!(matches!(
            "9600,8,n,1,x".parse::<Mode>(),
            Err(TtyError::InvalidMode(_))
        ));
        assert!(matches!("".parse::<Mode>(), Err(TtyError::InvalidMode(_))));
    }

    #[test]
    fn test_rejects_bad_tokens() {
        assert!(matches!(
            "fast,8,n,1".parse::<Mode>(),
            Err(TtyError::InvalidMode(_))
        ));
        assert!(matches!(
            "12345,8,n,1".parse::<Mode>(),
            Err(TtyError::UnsupportedBaud(12345))
        ));
        assert!(matches!(
            "9600,9,n,1".parse::<Mode>(),
            Err(TtyError::InvalidCharSize(_))
        ));
        assert!(matches!(
            "9600,8,x,1".parse::<Mode>(),
            Err(TtyError::InvalidParity(_))
        ));
        assert!(matches!(
            "9600,8,no,1".parse::<Mode>(),
            Err(TtyError::InvalidParity(_))
        ));
        assert!(matches!(
            "9600,8,n,3".parse::<Mode>(),
            Err(TtyError::InvalidStopBits(_))
        ));
    }
}
