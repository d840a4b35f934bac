//! Pollinations AI image provider.
//!
//! Pollinations renders an image on first GET of a prompt URL, so this
//! provider never talks to the network while generating: it hands back the
//! URL and the caller waits for the content (see [`crate::completion`]).

use crate::error::{ChimeraError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GeneratedImage, GenerationMetadata, ImageProviderKind, ImageResult};
use async_trait::async_trait;
use rand::Rng;
use std::time::Instant;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://image.pollinations.ai";
const DEFAULT_SIZE: u32 = 768;

/// Exclusive upper bound of the random seed appended to every URL.
pub const SEED_BOUND: u64 = 100_000;

/// Builder for PollinationsProvider.
#[derive(Debug, Clone)]
pub struct PollinationsProviderBuilder {
    base_url: String,
    width: u32,
    height: u32,
    nologo: bool,
}

impl Default for PollinationsProviderBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            nologo: true,
        }
    }
}

impl PollinationsProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the endpoint root.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the output size in pixels.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Whether to ask Pollinations to leave its logo off the image.
    pub fn nologo(mut self, nologo: bool) -> Self {
        self.nologo = nologo;
        self
    }

    /// Builds the provider, validating the endpoint root.
    pub fn build(self) -> Result<PollinationsProvider> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ChimeraError::InvalidRequest(format!("invalid base URL: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ChimeraError::InvalidRequest(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ChimeraError::InvalidRequest(
                "image width and height must be positive".into(),
            ));
        }

        Ok(PollinationsProvider {
            client: reqwest::Client::new(),
            base_url,
            width: self.width,
            height: self.height,
            nologo: self.nologo,
        })
    }
}

/// Pollinations AI image provider (URL-based, no credential).
pub struct PollinationsProvider {
    client: reqwest::Client,
    base_url: String,
    width: u32,
    height: u32,
    nologo: bool,
}

impl PollinationsProvider {
    /// Creates a new `PollinationsProviderBuilder`.
    pub fn builder() -> PollinationsProviderBuilder {
        PollinationsProviderBuilder::new()
    }

    /// Renders the image URL for a prompt and seed.
    pub fn image_url(&self, prompt: &str, seed: u64) -> Result<Url> {
        let raw = format!(
            "{}/prompt/{}?width={}&height={}&seed={}&nologo={}",
            self.base_url,
            urlencoding::encode(prompt),
            self.width,
            self.height,
            seed,
            self.nologo,
        );
        Url::parse(&raw).map_err(|e| ChimeraError::InvalidRequest(format!("invalid image URL: {e}")))
    }
}

fn random_seed() -> u64 {
    rand::thread_rng().gen_range(0..SEED_BOUND)
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let start = Instant::now();
        let seed = random_seed();
        let url = self.image_url(prompt, seed)?;

        tracing::debug!(seed, url = %url, "pollinations image dispatched");

        Ok(GeneratedImage::new(
            ImageResult::RemoteUrl { url },
            ImageProviderKind::Pollinations,
            GenerationMetadata {
                model: None,
                seed: Some(seed),
                duration_ms: Some(start.elapsed().as_millis() as u64),
            },
        ))
    }

    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::Pollinations
    }

    async fn health_check(&self) -> Result<()> {
        let response = self.client.head(&self.base_url).send().await?;
        let status = response.status().as_u16();
        if status >= 500 {
            return Err(ChimeraError::ProviderRejected {
                status,
                message: "Pollinations is currently unavailable".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::image::types::ImageResultKind;
    use std::collections::HashMap;

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn provider() -> PollinationsProvider {
        PollinationsProvider::builder().build().unwrap()
    }

    #[test]
    fn test_image_url_layout() {
        let url = provider().image_url("a lion & an eagle", 42).unwrap();
        assert_eq!(url.host_str(), Some("image.pollinations.ai"));
        assert_eq!(url.path(), "/prompt/a%20lion%20%26%20an%20eagle");

        let query = query_map(&url);
        assert_eq!(query["width"], "768");
        assert_eq!(query["height"], "768");
        assert_eq!(query["seed"], "42");
        assert_eq!(query["nologo"], "true");
    }

    #[test]
    fn test_image_url_encodes_reserved_characters() {
        let url = provider().image_url("half Lion? \"Lioagle\"/#1", 7).unwrap();
        assert!(!url.path()["/prompt/".len()..].contains('/'));
        assert!(url.fragment().is_none());
        assert_eq!(query_map(&url)["seed"], "7");
    }

    #[test]
    fn test_builder_overrides() {
        let provider = PollinationsProvider::builder()
            .base_url("http://localhost:9000/")
            .size(512, 256)
            .nologo(false)
            .build()
            .unwrap();
        let url = provider.image_url("owl", 1).unwrap();
        assert!(url.as_str().starts_with("http://localhost:9000/prompt/owl?"));
        let query = query_map(&url);
        assert_eq!(query["width"], "512");
        assert_eq!(query["height"], "256");
        assert_eq!(query["nologo"], "false");
    }

    #[test]
    fn test_builder_rejects_bad_base_url() {
        let err = PollinationsProvider::builder()
            .base_url("not a url")
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_builder_rejects_zero_size() {
        assert!(PollinationsProvider::builder().size(0, 10).build().is_err());
    }

    #[tokio::test]
    async fn test_generate_returns_remote_url() {
        let image = provider().generate("a wolf").await.unwrap();
        assert_eq!(image.provider, ImageProviderKind::Pollinations);
        assert_eq!(image.result.kind(), ImageResultKind::RemoteUrl);
        assert!(image.result.mime_type().is_none());
        let seed = image.metadata.seed.unwrap();
        assert!(seed < SEED_BOUND);
    }

    #[tokio::test]
    async fn test_repeated_calls_differ_only_in_seed() {
        let provider = provider();
        let mut seeds = Vec::new();
        let mut first_url: Option<Url> = None;

        for _ in 0..5 {
            let image = provider.generate("Lion and Eagle").await.unwrap();
            let ImageResult::RemoteUrl { url } = image.result else {
                panic!("expected a remote URL");
            };
            let mut query = query_map(&url);
            let seed: u64 = query.remove("seed").unwrap().parse().unwrap();
            assert!(seed < SEED_BOUND);
            assert_eq!(Some(seed), image.metadata.seed);
            seeds.push(seed);

            if let Some(ref first) = first_url {
                assert_eq!(first.path(), url.path());
                let mut first_query = query_map(first);
                first_query.remove("seed");
                assert_eq!(first_query, query);
            } else {
                first_url = Some(url);
            }
        }

        assert!(seeds.iter().any(|s| *s != seeds[0]));
    }
}
