//! Fixed-slot record storage in raw SPI flash.
//!
//! The store claims the last `RECORD_SLOTS` sectors of the first writable
//! `data/undefined` partition, falling back to `nvs`. Key `k` owns sector
//! `k - 1` of that tail. A slot is `magic u32 | len u16 | reserved u16 |
//! payload`, little-endian, written word by word into a freshly erased
//! sector and read back to verify. An erased sector or a foreign magic reads
//! as an absent record. Rewriting a key erases its whole sector first; a
//! power cut mid-write can leave a torn payload, which the caller's own
//! checksum has to reject.

use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};
use log::{debug, warn};

use chronowatch_core::storage::{MAX_RECORD_LEN, RecordKey, RecordStore};

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 16 * 1024 * 1024;

/// Keys `1..=RECORD_SLOTS` each own one sector at the tail of the partition.
const RECORD_SLOTS: u32 = 4;

const SLOT_MAGIC: u32 = 0x3152_5743; // "CWR1"
const SLOT_HEADER_LEN: usize = 8;
const SLOT_BUF_LEN: usize = SLOT_HEADER_LEN + MAX_RECORD_LEN;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FlashRecordError {
    PartitionTable,
    PartitionMissing,
    PartitionTooSmall,
    FlashOpFailed(i32),
    KeyOutOfRange(RecordKey),
    RecordTooLarge,
    /// Read-back after a write did not match what was written.
    Verify,
    Unsupported,
}

#[derive(Debug)]
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashRecordError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashRecordError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashRecordError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashRecordError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_erase_sector(sector_addr / FLASH_SECTOR_SIZE) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashRecordError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashRecordError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashRecordError::Unsupported);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashRecordError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashRecordError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashRecordError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashRecordError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashRecordError> {
        let mut done = 0usize;
        while done < out.len() {
            let at = addr + done as u32;
            let word_addr = at & !0b11;
            let skip = (at - word_addr) as usize;
            let word = self.read_word(word_addr)?.to_le_bytes();
            let take = (4 - skip).min(out.len() - done);
            out[done..done + take].copy_from_slice(&word[skip..skip + take]);
            done += take;
        }
        Ok(())
    }

    /// Programs bytes into an already erased, word-aligned region. The tail
    /// of the last word stays erased.
    fn write_erased_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashRecordError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashRecordError::Unsupported);
        }

        for (index, chunk) in data.chunks(4).enumerate() {
            let mut bytes = [0xFFu8; 4];
            bytes[..chunk.len()].copy_from_slice(chunk);
            self.write_word(addr + (index as u32) * 4, u32::from_le_bytes(bytes))?;
        }
        Ok(())
    }
}

impl ReadStorage for RawFlash {
    type Error = FlashRecordError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashRecordError::Unsupported)
    }
}

/// Record store backed by the tail sectors of a writable data partition.
///
/// Each slot is `magic u32 | len u16 | reserved u16 | payload`. Framing and
/// integrity of the payload itself belong to the caller.
#[derive(Debug)]
pub struct FlashRecordStore {
    flash: RawFlash,
    first_slot_addr: u32,
}

impl FlashRecordStore {
    pub fn new() -> Result<Self, FlashRecordError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashRecordError::PartitionTable)?;

        let mut best_data_undefined: Option<(u32, u32)> = None;
        let mut fallback_nvs: Option<(u32, u32)> = None;

        for entry in table.iter() {
            if entry.is_read_only() {
                continue;
            }

            match entry.partition_type() {
                PartitionType::Data(DataPartitionSubType::Undefined) => {
                    best_data_undefined = Some((entry.offset(), entry.len()));
                    break;
                }
                PartitionType::Data(DataPartitionSubType::Nvs) => {
                    if fallback_nvs.is_none() {
                        fallback_nvs = Some((entry.offset(), entry.len()));
                    }
                }
                _ => {}
            }
        }

        let (offset, len) = best_data_undefined
            .or(fallback_nvs)
            .ok_or(FlashRecordError::PartitionMissing)?;

        let reserved = RECORD_SLOTS * FLASH_SECTOR_SIZE;
        if len < reserved {
            return Err(FlashRecordError::PartitionTooSmall);
        }

        let first_slot_addr = offset + len - reserved;
        debug!(
            "flash-records: partition offset={:#x} len={:#x} slots_at={:#x}",
            offset, len, first_slot_addr
        );
        Ok(Self {
            flash,
            first_slot_addr,
        })
    }

    fn slot_addr(&self, key: RecordKey) -> Result<u32, FlashRecordError> {
        if key == 0 || key > RECORD_SLOTS {
            return Err(FlashRecordError::KeyOutOfRange(key));
        }
        Ok(self.first_slot_addr + (key - 1) * FLASH_SECTOR_SIZE)
    }

    /// Payload length of a valid slot, `None` for an erased or foreign one.
    fn slot_len(&mut self, addr: u32) -> Result<Option<usize>, FlashRecordError> {
        let mut header = [0u8; SLOT_HEADER_LEN];
        self.flash.read_bytes(addr, &mut header)?;

        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != SLOT_MAGIC {
            return Ok(None);
        }

        let len = u16::from_le_bytes([header[4], header[5]]) as usize;
        if len > MAX_RECORD_LEN {
            return Ok(None);
        }
        Ok(Some(len))
    }
}

impl RecordStore for FlashRecordStore {
    type Error = FlashRecordError;

    fn exists(&mut self, key: RecordKey) -> Result<bool, Self::Error> {
        let addr = self.slot_addr(key)?;
        Ok(self.slot_len(addr)?.is_some())
    }

    fn read(&mut self, key: RecordKey, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let addr = self.slot_addr(key)?;
        let Some(len) = self.slot_len(addr)? else {
            return Ok(0);
        };

        let len = len.min(buf.len());
        self.flash
            .read_bytes(addr + SLOT_HEADER_LEN as u32, &mut buf[..len])?;
        Ok(len)
    }

    fn write(&mut self, key: RecordKey, bytes: &[u8]) -> Result<usize, Self::Error> {
        let addr = self.slot_addr(key)?;
        if bytes.len() > MAX_RECORD_LEN {
            return Err(FlashRecordError::RecordTooLarge);
        }

        let total = SLOT_HEADER_LEN + bytes.len();
        let mut slot = [0xFFu8; SLOT_BUF_LEN];
        slot[0..4].copy_from_slice(&SLOT_MAGIC.to_le_bytes());
        slot[4..6].copy_from_slice(&(bytes.len() as u16).to_le_bytes());
        slot[6..8].copy_from_slice(&[0u8; 2]);
        slot[SLOT_HEADER_LEN..total].copy_from_slice(bytes);

        self.flash.erase_sector(addr)?;
        self.flash.write_erased_bytes(addr, &slot[..total])?;

        let mut readback = [0u8; SLOT_BUF_LEN];
        self.flash.read_bytes(addr, &mut readback[..total])?;
        if readback[..total] != slot[..total] {
            warn!("flash-records: verify failed key={} len={}", key, bytes.len());
            let _ = self.flash.erase_sector(addr);
            return Err(FlashRecordError::Verify);
        }

        Ok(bytes.len())
    }

    fn delete(&mut self, key: RecordKey) -> Result<(), Self::Error> {
        let addr = self.slot_addr(key)?;
        if self.slot_len(addr)?.is_none() {
            return Ok(());
        }
        self.flash.erase_sector(addr)
    }
}
