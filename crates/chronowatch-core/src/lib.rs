#![cfg_attr(not(test), no_std)]

//! Chronometer and watch-face state machine with split recording and
//! persistence, independent of any board.

pub mod app;
pub mod input;
pub mod options;
pub mod persist;
pub mod render;
pub mod reset;
pub mod splits;
pub mod storage;
pub mod text;
pub mod timebase;
pub mod timer;
