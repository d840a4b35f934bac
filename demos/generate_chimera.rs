//! Basic chimera generation example.
//!
//! Run with: `cargo run --example generate_chimera`
//!
//! Uses Pollinations AI, so no API key is needed.

use chimeragen::image::write_image;
use chimeragen::{
    Completion, CompletionTracker, ImageProviderKind, Orchestrator, PollinationsProvider,
    RemoteImageLoader,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> chimeragen::Result<()> {
    let orchestrator = Orchestrator::fixed(ImageProviderKind::Pollinations)
        .with_provider(Arc::new(PollinationsProvider::builder().build()?));

    let image = orchestrator.generate_chimera_image("Lion", "Eagle").await?;
    println!("Dispatched: {}", image.result.to_src());

    let loader = RemoteImageLoader::new();
    match CompletionTracker::default()
        .await_ready(&image, loader.load(&image))
        .await
    {
        Completion::Loaded(bytes) => {
            let saved = write_image(Path::new("chimera"), &bytes, None)?;
            println!("Saved {} ({} bytes)", saved.path.display(), saved.size_bytes);
        }
        Completion::Ready => println!("Image was inline"),
        Completion::LoadFailed(e) => println!("Failed: {}", e.message()),
        Completion::TimedOut => println!("Still rendering, open the URL later"),
    }

    Ok(())
}
