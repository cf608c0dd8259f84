//! Saved line-settings profiles.
//!
//! Profiles are named snapshots of line settings kept in
//! `~/.ttyctl/profiles.toml`:
//!
//! ```toml
//! [profiles.console]
//! mode = "115200,8,n,1"
//! canonical = true
//! echo = true
//!
//! [profiles.modem-line]
//! mode = "9600,7,e,1"
//! local_mode = false
//! hangup_on_close = true
//! ```
//!
//! Every field is optional; applying a profile only touches the settings it
//! names. Modem control lines are transient and are not part of profiles.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attrs::TermAttrs;
use crate::error::{Result, TtyError};
use crate::mode::Mode;
use crate::term::Terminal;

/// A snapshot of the settings this wrapper names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Mode string, `"baud,size,parity,stop"`.
    pub mode: Option<String>,
    pub canonical: Option<bool>,
    pub echo: Option<bool>,
    pub receiver: Option<bool>,
    pub hangup_on_close: Option<bool>,
    pub local_mode: Option<bool>,
}

impl Profile {
    /// Snapshot a terminal's current settings.
    pub fn capture(term: &Terminal) -> Result<Self> {
        let attrs = term.attrs()?;
        Ok(Self {
            mode: Some(attrs.mode().to_string()),
            canonical: Some(attrs.canonical()),
            echo: Some(attrs.echo()),
            receiver: Some(attrs.receiver_enabled()),
            hangup_on_close: Some(attrs.hangup_on_close()),
            local_mode: Some(attrs.local_mode()),
        })
    }

    /// Apply the populated fields to an attributes value.
    pub fn apply_to_attrs(&self, attrs: &mut TermAttrs) -> Result<()> {
        if let Some(mode) = &self.mode {
            attrs.apply_mode(&mode.parse::<Mode>()?)?;
        }
        if let Some(on) = self.canonical {
            attrs.set_canonical(on);
        }
        if let Some(on) = self.echo {
            attrs.set_echo(on);
        }
        if let Some(on) = self.receiver {
            attrs.set_receiver_enabled(on);
        }
        if let Some(on) = self.hangup_on_close {
            attrs.set_hangup_on_close(on);
        }
        if let Some(on) = self.local_mode {
            attrs.set_local_mode(on);
        }
        Ok(())
    }
}

/// The on-disk collection of named profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileStore {
    /// Load the store. A missing file yields an empty store.
    pub fn load() -> Result<Self> {
        let Some(path) = store_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(TtyError::ProfileRead)?;
        toml::from_str(&content).map_err(TtyError::ProfileParse)
    }

    /// Write the store back to disk.
    pub fn save(&self) -> Result<()> {
        let Some(path) = store_path() else {
            return Err(TtyError::ProfileWrite(io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine home directory",
            )));
        };
        let content = toml::to_string_pretty(self).map_err(TtyError::ProfileEncode)?;
        fs::write(&path, content).map_err(TtyError::ProfileWrite)?;
        debug!("Saved profile store to {}", path.display());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| TtyError::UnknownProfile(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: Profile) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn remove(&mut self, name: &str) -> Result<Profile> {
        self.profiles
            .remove(name)
            .ok_or_else(|| TtyError::UnknownProfile(name.to_string()))
    }

    /// Profile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn store_path() -> Option<PathBuf> {
    let home = home_dir()?;
    let dir = home.join(".ttyctl");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Some(dir.join("profiles.toml"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::termios::Termios;

    fn blank_attrs() -> TermAttrs {
        let raw: nix::libc::termios = unsafe { std::mem::zeroed() };
        TermAttrs::from(Termios::from(raw))
    }

    #[test]
    fn test_store_toml_round_trip() {
        let mut store = ProfileStore::default();
        store.insert(
            "console",
            Profile {
                mode: Some("115200,8,n,1".to_string()),
                echo: Some(true),
                ..Default::default()
            },
        );

        let text = toml::to_string_pretty(&store).unwrap();
        let back: ProfileStore = toml::from_str(&text).unwrap();
        let profile = back.get("console").unwrap();
        assert_eq!(profile.mode.as_deref(), Some("115200,8,n,1"));
        assert_eq!(profile.echo, Some(true));
        assert_eq!(profile.canonical, None);
    }

    #[test]
    fn test_apply_touches_only_named_fields() {
        let mut attrs = blank_attrs();
        attrs.set_echo(true);

        let profile = Profile {
            mode: Some("9600,7,e,2".to_string()),
            canonical: Some(false),
            ..Default::default()
        };
        profile.apply_to_attrs(&mut attrs).unwrap();

        assert_eq!(attrs.mode().to_string(), "9600,7,e,2");
        assert!(!attrs.canonical());
        // echo was not named by the profile
        assert!(attrs.echo());
    }

    #[test]
    fn test_bad_mode_in_profile_is_rejected() {
        let mut attrs = blank_attrs();
        let profile = Profile {
            mode: Some("9600,8,x,1".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            profile.apply_to_attrs(&mut attrs),
            Err(TtyError::InvalidParity(_))
        ));
    }

    #[test]
    fn test_unknown_profile_name() {
        let store = ProfileStore::default();
        assert!(matches!(
            store.get("nope"),
            Err(TtyError::UnknownProfile(_))
        ));

        let mut store = ProfileStore::default();
        assert!(matches!(
            store.remove("nope"),
            Err(TtyError::UnknownProfile(_))
        ));
    }
}
