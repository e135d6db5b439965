pub mod config;
pub mod error;
pub mod keyword;

pub use config::SignerdConfig;
pub use error::{Result, SignerdError};
