pub mod ai_core;
pub mod ai_core_util;

pub use ai_core::*;
