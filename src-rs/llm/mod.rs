pub mod models;
pub mod prompts;
pub mod service;
pub mod synthesis;
pub mod utils;

// Re-export config from crate root
pub use crate::config;
