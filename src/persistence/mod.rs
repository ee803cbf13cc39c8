pub mod files;
pub mod snapshot;
pub mod storage;
pub mod user;

pub use files::{atomic_write, ensure_data_dir, init_local_dir, log_file, read_file};
pub use snapshot::{ImportedSnapshot, Snapshot};
pub use storage::{FileStorage, Storage, StoredState};
#[cfg(test)]
pub use storage::MemoryStorage;
pub use user::get_or_create_user_uid;
