pub mod browser;
pub mod config;
pub mod error;

pub use browser::{BrowserError, BrowserResult};
pub use config::{load_env, RunConfig};
pub use error::{ConfigError, Result};
