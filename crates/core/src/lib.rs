pub mod config;
pub mod exam;

pub use config::Config;
pub use exam::*;
