//! Image generation providers.

mod gemini;
mod pollinations;

pub use gemini::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use pollinations::{PollinationsProvider, PollinationsProviderBuilder, SEED_BOUND};
