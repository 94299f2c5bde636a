mod ephemeral;
mod filesystem;
mod storage;

pub use ephemeral::EphemeralStore;
pub use filesystem::FilesystemStore;
pub use storage::Store;
