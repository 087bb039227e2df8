pub mod store;

pub use store::{MemoryChangelog, MemoryStore};
