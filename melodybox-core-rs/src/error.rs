//! Error types for the settings store and the audio output.

/// Errors reported by a [`SettingsStore`](crate::store::SettingsStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No value has ever been saved under the requested key.
    NotFound,
    /// The backing storage failed to read, write or erase.
    Storage,
    /// The storage region is not aligned to the flash erase/write geometry.
    Misaligned,
}

/// Errors reported by an [`AudioOutput`](crate::playback::AudioOutput).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// The output cannot produce the requested frequency.
    FrequencyRejected,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "setting not found"),
            StoreError::Storage => write!(f, "storage access failed"),
            StoreError::Misaligned => write!(f, "storage region misaligned"),
        }
    }
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            OutputError::FrequencyRejected => write!(f, "frequency rejected by output"),
        }
    }
}
