//! Persistent blob storage abstractions
//!
//! Provides a trait for small named blobs that survive power cycles
//! (a LittleFS file, an NVS entry, a flash map slot), plus a RAM-backed
//! implementation for host builds and tests.

use heapless::{String, Vec};

/// Errors from blob storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Written data could not be flushed to the medium
    Flush,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Blob name is too long for the backend
    NameTooLong,
    /// Storage is full
    Full,
}

/// Named blob storage
///
/// Implementations must make `write` replace the whole blob; readers
/// never observe a mix of old and new bytes for the same name.
pub trait BlobStore {
    /// Read a blob into `buffer`
    ///
    /// # Returns
    /// `Ok(Some(len))` with the number of bytes read, `Ok(None)` if no blob
    /// with that name exists.
    fn read(&mut self, name: &str, buffer: &mut [u8]) -> Result<Option<usize>, FlashError>;

    /// Create or overwrite a blob
    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), FlashError>;

    /// Delete a blob; deleting a missing blob is not an error
    fn remove(&mut self, name: &str) -> Result<(), FlashError>;
}

impl<T: BlobStore + ?Sized> BlobStore for &mut T {
    fn read(&mut self, name: &str, buffer: &mut [u8]) -> Result<Option<usize>, FlashError> {
        T::read(self, name, buffer)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), FlashError> {
        T::write(self, name, data)
    }

    fn remove(&mut self, name: &str) -> Result<(), FlashError> {
        T::remove(self, name)
    }
}

/// Longest blob name a [`RamStore`] accepts
pub const RAM_STORE_NAME_LEN: usize = 16;

/// Largest blob a [`RamStore`] accepts
pub const RAM_STORE_BLOB_LEN: usize = 64;

type Entry = (String<RAM_STORE_NAME_LEN>, Vec<u8, RAM_STORE_BLOB_LEN>);

/// In-memory blob store with room for `N` blobs
///
/// Contents are lost with the value, so this only stands in for real
/// storage on the host or in tests.
#[derive(Debug, Default)]
pub struct RamStore<const N: usize> {
    entries: Vec<Entry, N>,
}

impl<const N: usize> RamStore<N> {
    /// Create an empty store
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of blobs currently stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no blobs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a blob exists
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n.as_str() == name)
    }
}

impl<const N: usize> BlobStore for RamStore<N> {
    fn read(&mut self, name: &str, buffer: &mut [u8]) -> Result<Option<usize>, FlashError> {
        let Some(index) = self.position(name) else {
            return Ok(None);
        };

        let data = &self.entries[index].1;
        if buffer.len() < data.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(Some(data.len()))
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), FlashError> {
        let blob = Vec::from_slice(data).map_err(|_| FlashError::Full)?;

        if let Some(index) = self.position(name) {
            self.entries[index].1 = blob;
            return Ok(());
        }

        let mut key = String::new();
        key.push_str(name).map_err(|_| FlashError::NameTooLong)?;
        self.entries
            .push((key, blob))
            .map_err(|_| FlashError::Full)
    }

    fn remove(&mut self, name: &str) -> Result<(), FlashError> {
        if let Some(index) = self.position(name) {
            self.entries.swap_remove(index);
        }
        Ok(())
    }
}
