//! Configuration, paths, and logging for tagsync.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_INVENTORY_URL, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_with_config, parse_level, LogConfig, LogFormat};
pub use paths::Paths;
