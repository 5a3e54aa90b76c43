pub mod config;
pub mod error;
pub mod provider;
pub mod relay;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
