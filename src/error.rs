//! Crate error type.
//!
//! Every call that reaches the kernel can fail; the wrapper surfaces this as
//! one error enum with no retry policy. Callers should treat any variant as
//! fatal to the attempted operation.

use std::io;

use nix::errno::Errno;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtyError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not a terminal")]
    NotATerminal(String),

    #[error("No terminal on stdin, stdout, or stderr")]
    NoTerminal,

    #[error("Terminal control call failed: {0}")]
    Sys(#[from] Errno),

    #[error("Unsupported baud rate {0}")]
    UnsupportedBaud(u32),

    #[error("Invalid character size {0:?}, expected 5-8")]
    InvalidCharSize(String),

    #[error("Invalid parity {0:?}, expected n, e, or o")]
    InvalidParity(String),

    #[error("Invalid stop bits {0:?}, expected 1 or 2")]
    InvalidStopBits(String),

    #[error("Malformed mode string {0:?}, expected \"baud,size,parity,stop\"")]
    InvalidMode(String),

    #[error("Failed to read profile store: {0}")]
    ProfileRead(#[source] io::Error),

    #[error("Failed to parse profile store: {0}")]
    ProfileParse(#[source] toml::de::Error),

    #[error("Failed to encode profile store: {0}")]
    ProfileEncode(#[source] toml::ser::Error),

    #[error("Failed to write profile store: {0}")]
    ProfileWrite(#[source] io::Error),

    #[error("No profile named {0:?}")]
    UnknownProfile(String),
}

pub type Result<T> = std::result::Result<T, TtyError>;
