//! ttyctl - Terminal line-settings control for Unix
//!
//! ttyctl is a thin wrapper around the POSIX `termios(3)` interface. It puts
//! a small handle type, [`Terminal`], in front of a descriptor and exposes
//! the line settings the kernel keeps for it as ordinary getters and
//! setters.
//!
//! # Features
//!
//! - **Attributes**: baud rate, character size, parity, stop bits, receiver
//!   enable, hang-up on close, local mode, canonical input, echo
//! - **Mode strings**: the classic `"9600,8,n,1"` form, parsed and formatted
//!   by [`Mode`]
//! - **Modem lines**: DTR/RTS/CTS/DSR and friends as a [`ModemLines`] set
//! - **Profiles**: named snapshots saved to `~/.ttyctl/profiles.toml`
//!
//! The actual system calls are delegated to the `nix` termios binding; this
//! crate only does the bitfield bookkeeping around them. Every read of the
//! attributes goes to the kernel, and every write goes back wholesale.
//!
//! # Quick Start
//!
//! ```no_run
//! use ttyctl::{Mode, Terminal};
//!
//! fn main() -> ttyctl::Result<()> {
//!     let term = Terminal::open("/dev/ttyS0")?;
//!     term.set_mode(&"115200,8,n,1".parse::<Mode>()?)?;
//!     println!("line is {}", term.mode()?);
//!     Ok(())
//! }
//! ```

#![cfg(unix)]

pub mod attrs;
pub mod error;
pub mod mode;
pub mod modem;
pub mod profile;
pub mod term;

pub use crate::attrs::{CharSize, Parity, StopBits, TermAttrs};
pub use crate::error::{Result, TtyError};
pub use crate::mode::Mode;
pub use crate::modem::ModemLines;
pub use crate::profile::{Profile, ProfileStore};
pub use crate::term::{Terminal, When};
