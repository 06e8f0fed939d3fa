//! Persisted settings.
//!
//! [`SettingsStore`] is the key/value interface the core uses; [`FlashStore`]
//! implements it over any [`NorFlash`] as an append-only record log.
//!
//! # Record format
//!
//! Each record is 8 bytes:
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 1    | magic (`0xA5`)                          |
//! | 1      | 1    | key                                     |
//! | 2      | 1    | checksum: key ^ value bytes ^ `0x5A`    |
//! | 3      | 1    | reserved (`0x00`)                       |
//! | 4      | 4    | value, `i32` little-endian              |
//!
//! Records are appended after the last written one; the newest valid record
//! for a key wins. A slot whose first byte is `0xFF` is erased and ends the
//! log. When the region is full it is erased and the latest value of every
//! key is written back before the new record.

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};
use heapless::Vec;

use crate::error::StoreError;
use crate::volume::Volume;

/// Keys understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SettingKey {
    Volume = 1,
}

/// Integer key/value storage that survives power cycles.
pub trait SettingsStore {
    /// Read the value saved under `key`, or [`StoreError::NotFound`].
    fn load_int(&mut self, key: SettingKey) -> Result<i32, StoreError>;
    /// Save and commit `value` under `key`.
    fn save_int(&mut self, key: SettingKey, value: i32) -> Result<(), StoreError>;
}

/// Load the persisted volume, falling back to [`Volume::DEFAULT`] on a miss,
/// a storage fault or an out-of-range value.
pub fn load_volume<S: SettingsStore>(store: &mut S) -> Volume {
    match store.load_int(SettingKey::Volume) {
        Ok(raw) => match Volume::from_stored(raw) {
            Some(volume) => {
                #[cfg(feature = "defmt")]
                defmt::info!("restored volume {}", volume.level());
                volume
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("stored volume {} out of range, using default", raw);
                Volume::DEFAULT
            }
        },
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("no stored volume ({}), using default", _e);
            Volume::DEFAULT
        }
    }
}

/// Persist `volume`.
pub fn save_volume<S: SettingsStore>(store: &mut S, volume: Volume) -> Result<(), StoreError> {
    store.save_int(SettingKey::Volume, i32::from(volume.level()))
}

// ── Flash log ────────────────────────────────────────────────────────────

/// Size of one record in bytes.
pub const RECORD_LEN: usize = 8;

const MAGIC: u8 = 0xA5;
const CHECKSUM_SEED: u8 = 0x5A;
const ERASED: u8 = 0xFF;

/// Distinct keys carried across a compaction.
const MAX_KEYS: usize = 8;

fn checksum(key: u8, value: [u8; 4]) -> u8 {
    value.iter().fold(key ^ CHECKSUM_SEED, |acc, b| acc ^ b)
}

fn encode(key: u8, value: i32) -> [u8; RECORD_LEN] {
    let v = value.to_le_bytes();
    [MAGIC, key, checksum(key, v), 0x00, v[0], v[1], v[2], v[3]]
}

/// `Some((key, value))` for a valid record, `None` for a corrupt one.
fn decode(record: &[u8; RECORD_LEN]) -> Option<(u8, i32)> {
    let value = [record[4], record[5], record[6], record[7]];
    if record[0] != MAGIC || record[2] != checksum(record[1], value) {
        return None;
    }
    Some((record[1], i32::from_le_bytes(value)))
}

/// Append-only settings log in a dedicated flash region.
pub struct FlashStore<F> {
    flash: F,
    base: u32,
    size: u32,
}

impl<F: NorFlash> FlashStore<F> {
    /// Use `size` bytes of `flash` starting at `base`.
    ///
    /// The region must be whole erase sectors and the record size must be a
    /// multiple of the flash read and write granularity.
    pub fn new(flash: F, base: u32, size: u32) -> Result<Self, StoreError> {
        let erase = F::ERASE_SIZE as u32;
        let aligned = size > 0
            && base % erase == 0
            && size % erase == 0
            && RECORD_LEN % F::WRITE_SIZE == 0
            && RECORD_LEN % F::READ_SIZE == 0
            && base as usize + size as usize <= flash.capacity();
        if !aligned {
            return Err(StoreError::Misaligned);
        }
        Ok(Self { flash, base, size })
    }

    /// Release the flash device.
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn slots(&self) -> u32 {
        self.size / RECORD_LEN as u32
    }

    fn read_slot(&mut self, slot: u32) -> Result<[u8; RECORD_LEN], StoreError> {
        let mut record = [0u8; RECORD_LEN];
        self.flash
            .read(self.base + slot * RECORD_LEN as u32, &mut record)
            .map_err(|_| StoreError::Storage)?;
        Ok(record)
    }

    fn write_slot(&mut self, slot: u32, key: u8, value: i32) -> Result<(), StoreError> {
        self.flash
            .write(self.base + slot * RECORD_LEN as u32, &encode(key, value))
            .map_err(|_| StoreError::Storage)
    }

    /// Walk the log, returning the first free slot and the latest value of
    /// every key seen.
    fn scan(&mut self) -> Result<(u32, Vec<(u8, i32), MAX_KEYS>), StoreError> {
        let mut latest: Vec<(u8, i32), MAX_KEYS> = Vec::new();
        for slot in 0..self.slots() {
            let record = self.read_slot(slot)?;
            if record[0] == ERASED {
                return Ok((slot, latest));
            }
            let Some((key, value)) = decode(&record) else {
                #[cfg(feature = "defmt")]
                defmt::warn!("store: corrupt record at slot {}", slot);
                continue;
            };
            if let Some(entry) = latest.iter_mut().find(|(k, _)| *k == key) {
                entry.1 = value;
            } else if latest.push((key, value)).is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("store: too many keys, dropping key {}", key);
            }
        }
        Ok((self.slots(), latest))
    }

    fn compact(&mut self, keep: &[(u8, i32)]) -> Result<u32, StoreError> {
        #[cfg(feature = "defmt")]
        defmt::info!("store: compacting {} keys", keep.len());

        self.flash
            .erase(self.base, self.base + self.size)
            .map_err(|_| StoreError::Storage)?;
        for (slot, &(key, value)) in keep.iter().enumerate() {
            self.write_slot(slot as u32, key, value)?;
        }
        Ok(keep.len() as u32)
    }
}

impl<F: NorFlash> SettingsStore for FlashStore<F> {
    fn load_int(&mut self, key: SettingKey) -> Result<i32, StoreError> {
        let (_, latest) = self.scan()?;
        latest
            .iter()
            .find(|(k, _)| *k == key as u8)
            .map(|&(_, value)| value)
            .ok_or(StoreError::NotFound)
    }

    fn save_int(&mut self, key: SettingKey, value: i32) -> Result<(), StoreError> {
        let (mut free, mut latest) = self.scan()?;
        let key = key as u8;

        match latest.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) if entry.1 == value => return Ok(()),
            Some(entry) => entry.1 = value,
            None => latest.push((key, value)).map_err(|_| StoreError::Storage)?,
        }

        if free >= self.slots() {
            let keep: Vec<(u8, i32), MAX_KEYS> =
                latest.iter().copied().filter(|&(k, _)| k != key).collect();
            free = self.compact(&keep)?;
        }
        self.write_slot(free, key, value)
    }
}
