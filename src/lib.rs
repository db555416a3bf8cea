pub mod analysis;
pub mod canvas;
pub mod config;
pub mod error;
pub mod imaging;
pub mod llm;
pub mod server;

pub use error::{Error, Result};
