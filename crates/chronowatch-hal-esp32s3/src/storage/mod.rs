pub mod flash_records;
