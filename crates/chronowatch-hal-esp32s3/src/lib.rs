#![no_std]

//! ESP32-S3 board support for the chronowatch firmware.

pub mod input;
pub mod platform;
pub mod storage;
