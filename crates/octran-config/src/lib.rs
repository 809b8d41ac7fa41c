pub mod error;
pub mod loader;
pub mod model;

pub use error::ConfigError;
pub use loader::{load_files, LoadedConfig};
