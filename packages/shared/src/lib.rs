//! Utilities shared by the Nagare binaries and their tests.

pub mod logger;
pub mod time;
