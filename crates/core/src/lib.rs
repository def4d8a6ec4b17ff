pub mod config;
pub mod error;
pub mod metrics;

pub use config::Config;
pub use error::*;
pub use metrics::*;
