// Service exports
pub mod adoption;
pub mod session;
pub mod storage;

pub use adoption::{AdoptionClient, ServiceError};
pub use session::{SessionStore, SESSION_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
