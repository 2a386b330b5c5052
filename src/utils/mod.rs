//! Utility modules

pub mod memory_poster;
pub mod memory_store;
pub mod validation;

pub use memory_poster::{MemoryPoster, PosterAccounts};
pub use memory_store::MemoryStore;
pub use validation::*;
