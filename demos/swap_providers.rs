//! Demonstrates switching providers between requests.
//!
//! Run with: `cargo run --example swap_providers`
//!
//! Set `GEMINI_API_KEY` (or save a key with `chimeragen key set`) to see the
//! Gemini request succeed; without one the second request fails with a
//! missing-credential error.

use chimeragen::{ErrorKind, GeminiProvider, ImageProviderKind, Orchestrator, PollinationsProvider};
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> chimeragen::Result<()> {
    let (selection, rx) = watch::channel(ImageProviderKind::Pollinations);
    let orchestrator = Orchestrator::new(rx)
        .with_provider(Arc::new(PollinationsProvider::builder().build()?))
        .with_provider(Arc::new(GeminiProvider::builder().build()?));

    for kind in ImageProviderKind::ALL {
        selection.send_replace(kind);
        println!("Provider: {}", orchestrator.active_provider());

        match orchestrator.generate_chimera_image("Shark", "Wolf").await {
            Ok(image) => println!("  {:?}: {} chars", image.result.kind(), image.result.payload().len()),
            Err(e) if e.kind() == ErrorKind::MissingCredential => println!("  skipped: {}", e.message()),
            Err(e) => println!("  failed ({}): {}", e.kind(), e.message()),
        }
    }

    Ok(())
}
