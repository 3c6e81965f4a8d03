//! Storage abstraction and implementations for brewqa.
//!
//! The assessment engine only talks to the store traits defined here. Two
//! backends ship with the crate: JSON files on disk and an in-memory map.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{BatchStore, QualityCheckStore, Result, Storage, StorageError, UserStore};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
