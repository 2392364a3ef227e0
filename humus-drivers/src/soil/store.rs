//! Calibration persistence
//!
//! Loads and saves the two calibration endpoints through a [`BlobStore`].
//! A missing, unreadable or corrupt blob is never an error to the caller,
//! so the node always boots with a usable calibration. Missing and corrupt
//! blobs are replaced with the defaults; a read fault leaves storage alone.

use humus_core::config::{CalibrationRecord, PersistedCalibration};
use humus_hal::{BlobStore, FlashError};

/// Blob name the calibration lives under
pub const CALIBRATION_BLOB: &str = "SOIL";

/// Maximum serialized calibration size
const MAX_CALIBRATION_SIZE: usize = 32;

/// Calibration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The write or flush did not complete
    WriteFailed(FlashError),
    /// Serialization failed
    Serialize,
}

/// Why a stored record could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum LoadError {
    Missing,
    Flash(FlashError),
    Deserialize,
    /// Bad magic, version or CRC
    Invalid,
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

/// Durable home of the calibration endpoints
pub struct CalibrationStore<S> {
    storage: S,
    defaults: CalibrationRecord,
}

impl<S: BlobStore> CalibrationStore<S> {
    /// Create a store that bootstraps the stock endpoints (200 / 500)
    pub fn new(storage: S) -> Self {
        Self::with_defaults(storage, CalibrationRecord::default())
    }

    /// Create a store that bootstraps `defaults`
    pub fn with_defaults(storage: S, defaults: CalibrationRecord) -> Self {
        Self { storage, defaults }
    }

    /// Record written on first use
    pub fn defaults(&self) -> CalibrationRecord {
        self.defaults
    }

    /// Give the storage back
    pub fn release(self) -> S {
        self.storage
    }

    /// Load the calibration, bootstrapping defaults if there is none
    ///
    /// If writing the defaults fails they are still returned; the next
    /// load simply bootstraps again. A read fault returns the defaults
    /// without writing, so the stored record survives for the next load.
    pub fn load(&mut self) -> CalibrationRecord {
        match self.load_inner() {
            Ok(record) => {
                info!(
                    "loaded calibration: dry {} wet {}",
                    record.dry_endpoint,
                    record.wet_endpoint
                );
                return record;
            }
            Err(LoadError::Flash(e)) => {
                warn!("calibration read failed ({:?}), using defaults", e);
                return self.defaults;
            }
            Err(LoadError::Missing) => {
                info!("no calibration stored, writing defaults");
            }
            Err(e) => {
                warn!("stored calibration unusable ({:?}), writing defaults", e);
            }
        }

        let defaults = self.defaults;
        if let Err(e) = self.save(defaults) {
            warn!("could not persist default calibration: {:?}", e);
        }
        defaults
    }

    /// Overwrite the stored calibration
    pub fn save(&mut self, record: CalibrationRecord) -> Result<(), StoreError> {
        let data = PersistedCalibration::new(record);

        let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
        let bytes = postcard::to_slice(&data, &mut buffer).map_err(|_| StoreError::Serialize)?;

        debug!("saving {} bytes of calibration", bytes.len());

        self.storage
            .write(CALIBRATION_BLOB, bytes)
            .map_err(StoreError::WriteFailed)?;

        info!(
            "saved calibration: dry {} wet {}",
            record.dry_endpoint,
            record.wet_endpoint
        );
        Ok(())
    }

    /// Delete the stored calibration; the next load bootstraps defaults
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.storage
            .remove(CALIBRATION_BLOB)
            .map_err(StoreError::WriteFailed)?;
        info!("calibration cleared");
        Ok(())
    }

    fn load_inner(&mut self) -> Result<CalibrationRecord, LoadError> {
        let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
        let len = self
            .storage
            .read(CALIBRATION_BLOB, &mut buffer)?
            .ok_or(LoadError::Missing)?;

        let data: PersistedCalibration =
            postcard::from_bytes(&buffer[..len]).map_err(|_| LoadError::Deserialize)?;

        data.checked_record().ok_or(LoadError::Invalid)
    }
}
