pub mod files;
pub mod metadata;
pub mod repository;
pub mod store;

pub use files::{atomic_write, ensure_data_dir, init_local_data_dir, log_file};
pub use metadata::BridgeInfo;
pub use repository::FocusRepository;
pub use store::{FileStore, KeyValueStore, StoreError, DEFAULT_QUOTA_BYTES};

#[cfg(test)]
pub use store::MemoryStore;
