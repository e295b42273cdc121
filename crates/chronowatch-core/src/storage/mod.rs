//! Key/value record store abstraction.

pub mod memory;

/// Identifies one record in the store.
pub type RecordKey = u32;

/// Largest record the store accepts, in bytes.
pub const MAX_RECORD_LEN: usize = 256;

/// Byte-oriented persistence backend with a fixed per-record size cap.
pub trait RecordStore {
    type Error;

    fn exists(&mut self, key: RecordKey) -> Result<bool, Self::Error>;

    /// Copies the record into `buf` and returns the number of bytes read.
    /// An absent record reads as zero bytes.
    fn read(&mut self, key: RecordKey, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Stores `bytes` under `key` and returns the number of bytes written.
    /// A short count means the store truncated the record.
    fn write(&mut self, key: RecordKey, bytes: &[u8]) -> Result<usize, Self::Error>;

    fn delete(&mut self, key: RecordKey) -> Result<(), Self::Error>;
}
