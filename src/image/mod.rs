//! Image generation module.

mod provider;
pub mod providers;
mod types;

pub use provider::ImageProvider;
pub use types::{
    write_image, GeneratedImage, GenerationKind, GenerationMetadata, GenerationRequest, ImageFormat,
    ImageProviderKind, ImageResult, ImageResultKind, Readiness, SavedImage,
};
