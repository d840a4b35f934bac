#![warn(missing_docs)]
//! chimeragen - Hybrid animal creatures through interchangeable image providers.
//!
//! Pick two animals, get an image of the creature that combines them, then
//! pit two such chimeras against each other in a battle scene.
//!
//! # Quick Start
//!
//! ```no_run
//! use chimeragen::{ImageProviderKind, Orchestrator, PollinationsProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> chimeragen::Result<()> {
//!     let orchestrator = Orchestrator::fixed(ImageProviderKind::Pollinations)
//!         .with_provider(Arc::new(PollinationsProvider::builder().build()?));
//!     let image = orchestrator.generate_chimera_image("Lion", "Eagle").await?;
//!     println!("{}", image.result.to_src());
//!     Ok(())
//! }
//! ```
//!
//! # Providers
//!
//! - Pollinations AI: no key, returns an image URL that renders on first fetch.
//!   Pair it with [`CompletionTracker`] to bound the wait.
//! - Gemini (Google): needs an API key from a [`SecretStore`], returns the
//!   image inline as base64.
//!
//! Both implement [`ImageProvider`]; the [`Orchestrator`] picks one per request
//! from a `tokio::sync::watch` channel holding the active [`ImageProviderKind`].

pub mod animals;
pub mod completion;
mod error;
pub mod image;
pub mod orchestrator;
pub mod prompt;
pub mod secret;
pub mod session;

// Re-export error types at crate root
pub use error::{ChimeraError, ErrorKind, Result};

pub use completion::{Completion, CompletionTracker, RemoteImageLoader, DEFAULT_READY_CEILING};
pub use image::providers::{
    GeminiModel, GeminiProvider, GeminiProviderBuilder, PollinationsProvider,
    PollinationsProviderBuilder,
};
pub use image::{
    GeneratedImage, GenerationKind, GenerationMetadata, GenerationRequest, ImageFormat,
    ImageProvider, ImageProviderKind, ImageResult, ImageResultKind, Readiness, SavedImage,
};
pub use orchestrator::Orchestrator;
pub use secret::{Credential, FileSecretStore, MemorySecretStore, SecretStore};
pub use session::{Chimera, Session, Slot};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::completion::{Completion, CompletionTracker};
    pub use crate::error::{ChimeraError, ErrorKind, Result};
    pub use crate::image::providers::{GeminiProvider, PollinationsProvider};
    pub use crate::image::{GeneratedImage, ImageProvider, ImageProviderKind, ImageResult};
    pub use crate::orchestrator::Orchestrator;
    pub use crate::secret::SecretStore;
}
