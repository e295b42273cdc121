//! In-RAM record store for hosts and tests, with fault injection.

use heapless::{LinearMap, Vec};

use super::{MAX_RECORD_LEN, RecordKey, RecordStore};

const MEMORY_RECORD_SLOTS: usize = 4;

type RecordBytes = Vec<u8, MAX_RECORD_LEN>;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MemoryStoreError {
    /// Record exceeds [`MAX_RECORD_LEN`].
    TooLarge,
    /// Every slot already holds a different key.
    Full,
    /// Rejected by an injected fault.
    Rejected,
}

/// Fault applied to the next write of one key.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteFault {
    Reject,
    /// Keep only this many bytes and report the short count.
    Truncate(usize),
}

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: LinearMap<RecordKey, RecordBytes, MEMORY_RECORD_SLOTS>,
    fault: Option<(RecordKey, WriteFault)>,
    fail_deletes: bool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-time fault for the next write of `key`.
    pub fn inject_write_fault(&mut self, key: RecordKey, fault: WriteFault) {
        self.fault = Some((key, fault));
    }

    pub fn set_fail_deletes(&mut self, fail: bool) {
        self.fail_deletes = fail;
    }

    pub fn record(&self, key: RecordKey) -> Option<&[u8]> {
        self.records.get(&key).map(|bytes| bytes.as_slice())
    }

    /// Overwrites a stored record byte-for-byte, bypassing faults.
    pub fn put_raw(&mut self, key: RecordKey, bytes: &[u8]) -> Result<(), MemoryStoreError> {
        let record = RecordBytes::from_slice(bytes).map_err(|_| MemoryStoreError::TooLarge)?;
        self.records
            .insert(key, record)
            .map(|_| ())
            .map_err(|_| MemoryStoreError::Full)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    fn take_fault(&mut self, key: RecordKey) -> Option<WriteFault> {
        match self.fault {
            Some((armed, fault)) if armed == key => {
                self.fault = None;
                Some(fault)
            }
            _ => None,
        }
    }
}

impl RecordStore for MemoryRecordStore {
    type Error = MemoryStoreError;

    fn exists(&mut self, key: RecordKey) -> Result<bool, Self::Error> {
        Ok(self.records.contains_key(&key))
    }

    fn read(&mut self, key: RecordKey, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(record) = self.records.get(&key) else {
            return Ok(0);
        };
        let len = record.len().min(buf.len());
        buf[..len].copy_from_slice(&record[..len]);
        Ok(len)
    }

    fn write(&mut self, key: RecordKey, bytes: &[u8]) -> Result<usize, Self::Error> {
        if bytes.len() > MAX_RECORD_LEN {
            return Err(MemoryStoreError::TooLarge);
        }

        let kept = match self.take_fault(key) {
            Some(WriteFault::Reject) => return Err(MemoryStoreError::Rejected),
            Some(WriteFault::Truncate(len)) => &bytes[..len.min(bytes.len())],
            None => bytes,
        };

        self.put_raw(key, kept)?;
        Ok(kept.len())
    }

    fn delete(&mut self, key: RecordKey) -> Result<(), Self::Error> {
        if self.fail_deletes {
            return Err(MemoryStoreError::Rejected);
        }
        self.records.remove(&key);
        Ok(())
    }
}
