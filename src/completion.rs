//! Readiness tracking for URL-based results.
//!
//! A remote URL is returned before the provider has rendered the image. The
//! caller keeps its loading state until a ready signal arrives, but never
//! longer than a fixed ceiling. Inline results are complete on arrival.

use crate::error::{ChimeraError, Result};
use crate::image::{GeneratedImage, ImageResult, Readiness};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Fallback ceiling after which a pending remote image stops blocking.
pub const DEFAULT_READY_CEILING: Duration = Duration::from_secs(15);

/// How the wait for an image ended.
#[derive(Debug)]
pub enum Completion<T> {
    /// Inline data; there was nothing to wait for.
    Ready,
    /// The ready signal fired.
    Loaded(T),
    /// The ready signal reported a failure.
    LoadFailed(ChimeraError),
    /// The ceiling elapsed first. The pending state is cleared anyway.
    TimedOut,
}

impl<T> Completion<T> {
    /// True when the image is known to be displayable.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready | Self::Loaded(_))
    }
}

/// Applies the bounded wait policy to generated images.
#[derive(Debug, Clone, Copy)]
pub struct CompletionTracker {
    ceiling: Duration,
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_READY_CEILING)
    }
}

impl CompletionTracker {
    /// Creates a tracker with the given ceiling.
    pub fn new(ceiling: Duration) -> Self {
        Self { ceiling }
    }

    /// Returns the configured ceiling.
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Waits until `image` is displayable.
    ///
    /// `ready` is only polled for deferred (remote) results.
    pub async fn await_ready<T, F>(&self, image: &GeneratedImage, ready: F) -> Completion<T>
    where
        F: Future<Output = Result<T>>,
    {
        if image.readiness() == Readiness::Ready {
            return Completion::Ready;
        }

        match tokio::time::timeout(self.ceiling, ready).await {
            Ok(Ok(value)) => Completion::Loaded(value),
            Ok(Err(e)) => {
                tracing::debug!(provider = %image.provider, "image failed to load: {e}");
                Completion::LoadFailed(e)
            }
            Err(_) => {
                tracing::warn!(
                    provider = %image.provider,
                    ceiling_ms = self.ceiling.as_millis() as u64,
                    "no ready signal before ceiling, clearing pending state"
                );
                Completion::TimedOut
            }
        }
    }
}

/// Fetches image bytes, acting as the ready signal for remote results.
#[derive(Debug, Clone, Default)]
pub struct RemoteImageLoader {
    client: reqwest::Client,
}

impl RemoteImageLoader {
    /// Creates a loader with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Downloads the image behind `url`.
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChimeraError::ProviderRejected {
                status: status.as_u16(),
                message: "Failed to load image. Please try again.".into(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Returns the raw bytes of any result, downloading remote ones.
    pub async fn load(&self, image: &GeneratedImage) -> Result<Vec<u8>> {
        match &image.result {
            ImageResult::RemoteUrl { url } => self.fetch(url).await,
            inline @ ImageResult::InlineData { .. } => inline.decode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::image::{GenerationMetadata, ImageProviderKind};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn remote() -> GeneratedImage {
        GeneratedImage::new(
            ImageResult::RemoteUrl {
                url: Url::parse("https://image.pollinations.ai/prompt/owl?seed=3").unwrap(),
            },
            ImageProviderKind::Pollinations,
            GenerationMetadata::default(),
        )
    }

    fn inline() -> GeneratedImage {
        GeneratedImage::new(
            ImageResult::InlineData {
                payload: "QUJD".into(),
                mime_type: "image/png".into(),
            },
            ImageProviderKind::Gemini,
            GenerationMetadata::default(),
        )
    }

    #[tokio::test]
    async fn test_inline_is_ready_without_signal() {
        let tracker = CompletionTracker::default();
        let polled = AtomicBool::new(false);
        let completion: Completion<()> = tracker
            .await_ready(&inline(), async {
                polled.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert!(matches!(completion, Completion::Ready));
        assert!(!polled.load(Ordering::SeqCst));
        assert!(completion.is_ready());
    }

    #[tokio::test]
    async fn test_remote_loaded_when_signal_fires() {
        let tracker = CompletionTracker::default();
        let completion = tracker.await_ready(&remote(), async { Ok(42u8) }).await;
        assert!(matches!(completion, Completion::Loaded(42)));
    }

    #[tokio::test]
    async fn test_remote_load_failure() {
        let tracker = CompletionTracker::default();
        let completion: Completion<()> = tracker
            .await_ready(&remote(), async {
                Err(ChimeraError::ProviderRejected {
                    status: 502,
                    message: "Failed to load image. Please try again.".into(),
                })
            })
            .await;
        match completion {
            Completion::LoadFailed(e) => assert_eq!(e.kind(), ErrorKind::ProviderRejected),
            other => panic!("unexpected completion: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_times_out_at_ceiling() {
        let tracker = CompletionTracker::new(Duration::from_secs(15));
        let started = tokio::time::Instant::now();

        let completion: Completion<()> = tracker
            .await_ready(&remote(), std::future::pending())
            .await;

        assert!(matches!(completion, Completion::TimedOut));
        assert!(!completion.is_ready());
        assert!(started.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_before_ceiling_wins() {
        let tracker = CompletionTracker::new(Duration::from_secs(15));
        let completion = tracker
            .await_ready(&remote(), async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Ok("loaded")
            })
            .await;
        assert!(matches!(completion, Completion::Loaded("loaded")));
    }

    #[tokio::test]
    async fn test_loader_decodes_inline() {
        let bytes = RemoteImageLoader::new().load(&inline()).await.unwrap();
        assert_eq!(bytes, b"ABC");
    }
}
