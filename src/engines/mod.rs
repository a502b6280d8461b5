use crate::Result;

/// Trait for the storage behind the server.
///
/// Keys reaching an engine have already passed [`is_valid_key`], so an
/// implementation may use them directly as names.
///
/// [`is_valid_key`]: crate::is_valid_key
pub trait KvsEngine: Send + 'static {
    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns the value stored under `key`.
    ///
    /// Returns `None` if the key does not exist.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Removes `key`.
    ///
    /// Removing a key that does not exist is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

mod fs;
mod memory;

pub use self::fs::FsStore;
pub use self::memory::MemoryStore;
