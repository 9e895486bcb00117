pub mod config;
pub mod error;
pub mod kv;
pub mod models;
pub mod session;

mod file_store;
mod memory;
pub use file_store::FileStore;
pub use memory::MemoryStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod browser;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use browser::{BrowserStorage, StorageScope};

pub use config::{ApiConfig, AstegniConfig, NavigationConfig, StorageConfig};
pub use error::StoreError;
pub use kv::KeyValueStore;
pub use models::{RoleName, UnknownRole, UserRecord};
pub use session::{Session, SessionStore, STORAGE_SCHEMA_VERSION};
