//! Durable string-keyed storage for settings
//!
//! Keys are committed independently, there are no multi-key transactions.

mod file;
mod memory;

pub use self::{file::FileStore, memory::MemoryStore};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt store contents: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage is disabled")]
    Disabled,
}

pub trait Store: Send + 'static {
    /// `None` if the key was never written
    fn get(&self, key: &str) -> Option<String>;

    /// Durable by the time this returns `Ok`
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}
