//! Shared helpers: date arithmetic and per-key async locking.

pub mod keyed_mutex;
pub mod time_utils;

pub use keyed_mutex::KeyedMutex;
