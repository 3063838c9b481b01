// Neutral message model and the per-vendor adapters

pub mod provider_handle;
pub mod provider_base;
pub mod claude;
pub mod gemini;
pub mod glm;
pub mod openai;
