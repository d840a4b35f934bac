//! Dispatch of hybrid and battle requests to the selected provider.

use crate::error::{ChimeraError, Result};
use crate::image::{GeneratedImage, GenerationRequest, ImageProvider, ImageProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Routes generation requests to the adapter of the active provider.
///
/// The active provider comes from a `watch` channel owned by whoever
/// presents the provider setting; the orchestrator only reads it, once per
/// request, so a switch takes effect on the next request.
#[derive(Clone)]
pub struct Orchestrator {
    providers: HashMap<ImageProviderKind, Arc<dyn ImageProvider>>,
    selection: watch::Receiver<ImageProviderKind>,
}

impl Orchestrator {
    /// Creates an orchestrator that follows `selection`.
    pub fn new(selection: watch::Receiver<ImageProviderKind>) -> Self {
        Self {
            providers: HashMap::new(),
            selection,
        }
    }

    /// Creates an orchestrator pinned to one provider.
    pub fn fixed(kind: ImageProviderKind) -> Self {
        let (_tx, rx) = watch::channel(kind);
        Self::new(rx)
    }

    /// Registers an adapter under its own kind, replacing any previous one.
    pub fn with_provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Returns the provider the next request will use.
    pub fn active_provider(&self) -> ImageProviderKind {
        *self.selection.borrow()
    }

    /// Returns the registered adapter for `kind`.
    pub fn provider(&self, kind: ImageProviderKind) -> Option<&Arc<dyn ImageProvider>> {
        self.providers.get(&kind)
    }

    /// Generates one hybrid creature image.
    pub async fn generate_chimera_image(
        &self,
        animal_a: &str,
        animal_b: &str,
    ) -> Result<GeneratedImage> {
        let request = GenerationRequest::hybrid(animal_a, animal_b)?;
        self.dispatch(&request).await
    }

    /// Generates one battle image with both hybrids in a single prompt.
    pub async fn generate_battle_image(
        &self,
        hybrid_a: &str,
        hybrid_b: &str,
        pair_a: [&str; 2],
        pair_b: [&str; 2],
    ) -> Result<GeneratedImage> {
        let request = GenerationRequest::battle(hybrid_a, hybrid_b, pair_a, pair_b)?;
        self.dispatch(&request).await
    }

    /// Sends a prepared request to the active provider, exactly once.
    pub async fn dispatch(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let kind = self.active_provider();
        let provider = self.providers.get(&kind).ok_or_else(|| {
            ChimeraError::ProviderUnavailable(format!("no {kind} adapter is registered"))
        })?;

        tracing::debug!(
            provider = %kind,
            request_kind = ?request.kind,
            subjects = ?request.subjects,
            "dispatching generation request"
        );

        provider.generate(&request.prompt).await
    }
}
