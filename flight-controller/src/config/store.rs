use std::fs;
use std::io;
use std::path::PathBuf;

use shared_definitions::preferences::Preferences;

use crate::util::error::AppError;

pub type StoreError = AppError<io::Error>;

/// File-backed preferences store. The record travels as a raw checksummed
/// blob; a save is only reported good after the blob reads back verbatim.
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PreferencesStore { path: path.into() }
    }

    /// Loads the stored record, falling back to defaults when the blob is
    /// missing, the wrong size, or fails its checksum.
    pub fn load(&self) -> Preferences {
        match self.read() {
            Ok(prefs) if prefs.checksum_valid() => prefs,
            Ok(_) => {
                log::warn!("stored preferences failed checksum, using defaults");
                Preferences::default()
            }
            Err(error) => {
                log::warn!("{}, using defaults", error);
                Preferences::default()
            }
        }
    }

    /// Stamps the checksum, persists the blob, and verifies by reloading.
    pub fn save(&self, prefs: &mut Preferences) -> Result<(), StoreError> {
        prefs.update_checksum();
        fs::write(&self.path, prefs.as_bytes()).map_err(|error| AppError {
            message: "failed to write the preferences blob",
            error,
        })?;

        let reloaded = self.read()?;
        if reloaded.as_bytes() != prefs.as_bytes() {
            return Err(AppError {
                message: "preferences readback mismatch",
                error: io::Error::from(io::ErrorKind::InvalidData),
            });
        }
        Ok(())
    }

    fn read(&self) -> Result<Preferences, StoreError> {
        let bytes = fs::read(&self.path).map_err(|error| AppError {
            message: "failed to read the preferences blob",
            error,
        })?;
        Preferences::from_bytes(&bytes).ok_or(AppError {
            message: "preferences blob has the wrong size",
            error: io::Error::from(io::ErrorKind::InvalidData),
        })
    }
}
