//! Configuration loaders and decoders.

mod file;
mod format;
mod loader;

pub use file::FileLoader;
pub use format::Format;
pub use loader::Loader;
