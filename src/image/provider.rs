//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GeneratedImage, ImageProviderKind};
use async_trait::async_trait;

/// Trait for image generation providers.
///
/// Implementations resolve every failure into a [`crate::ChimeraError`];
/// nothing escapes the adapter as a panic or a raw transport error.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from a rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ImageProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            ImageProviderKind::Pollinations => "Pollinations AI",
            ImageProviderKind::Gemini => "Gemini (Google)",
        }
    }

    /// Checks if the provider is reachable and, where relevant, authenticated.
    async fn health_check(&self) -> Result<()>;
}
