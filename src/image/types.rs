//! Core types for image generation.

use crate::error::{ChimeraError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Image file formats a chimera can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG, the usual Gemini output.
    Png,
    /// JPEG, the usual Pollinations output.
    Jpeg,
    /// WebP.
    WebP,
}

impl ImageFormat {
    /// File extension used when an output path has none.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Maps an inline-data MIME type to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Sniffs the format from the leading bytes of an image.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        match data {
            d if d.starts_with(PNG) => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::WebP),
            _ => None,
        }
    }
}

/// An image written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// Where the bytes went, including any added extension.
    pub path: PathBuf,
    /// Detected format, if recognised.
    pub format: Option<ImageFormat>,
    /// Number of bytes written.
    pub size_bytes: usize,
}

/// Writes image bytes to `path`.
///
/// The format is sniffed from the bytes first, then taken from `hint`. When
/// `path` has no extension and the format is known, its extension is added.
pub fn write_image(path: &Path, data: &[u8], hint: Option<ImageFormat>) -> Result<SavedImage> {
    let format = ImageFormat::from_magic_bytes(data).or(hint);
    let path = match format {
        Some(f) if path.extension().is_none() => path.with_extension(f.extension()),
        _ => path.to_path_buf(),
    };
    std::fs::write(&path, data)?;
    tracing::debug!(path = %path.display(), size = data.len(), "image written");

    Ok(SavedImage {
        path,
        format,
        size_bytes: data.len(),
    })
}

/// Image provider identity.
///
/// Chosen by an external setting; the core only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    /// Pollinations AI. URL-based, no credential.
    #[default]
    Pollinations,
    /// Google Gemini. Key-based, returns inline image bytes.
    Gemini,
}

impl ImageProviderKind {
    /// All known provider kinds, in display order.
    pub const ALL: [ImageProviderKind; 2] = [Self::Pollinations, Self::Gemini];

    /// Returns true if the provider needs a stored credential.
    pub fn requires_credential(&self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// Returns the lowercase identifier used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pollinations => "pollinations",
            Self::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageProviderKind {
    type Err = ChimeraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pollinations" => Ok(Self::Pollinations),
            "gemini" => Ok(Self::Gemini),
            other => Err(ChimeraError::InvalidRequest(format!(
                "unknown provider '{other}' (expected 'pollinations' or 'gemini')"
            ))),
        }
    }
}

/// The two request shapes the orchestrator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// One creature made of two animals.
    Hybrid,
    /// Two hybrids fighting each other.
    Battle,
}

/// A validated, provider-agnostic generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Request shape.
    pub kind: GenerationKind,
    /// Subject names in order: `[a, b]` for a hybrid,
    /// `[pair_a.0, pair_a.1, pair_b.0, pair_b.1]` for a battle.
    pub subjects: Vec<String>,
    /// The rendered prompt sent to the provider.
    pub prompt: String,
}

impl GenerationRequest {
    /// Builds a hybrid request for two distinct animals.
    pub fn hybrid(animal_a: &str, animal_b: &str) -> Result<Self> {
        validate_pair(animal_a, animal_b)?;
        Ok(Self {
            kind: GenerationKind::Hybrid,
            subjects: vec![animal_a.to_string(), animal_b.to_string()],
            prompt: crate::prompt::build_hybrid_prompt(animal_a, animal_b),
        })
    }

    /// Builds a battle request between two named hybrids.
    pub fn battle(
        hybrid_a: &str,
        hybrid_b: &str,
        pair_a: [&str; 2],
        pair_b: [&str; 2],
    ) -> Result<Self> {
        validate_pair(pair_a[0], pair_a[1])?;
        validate_pair(pair_b[0], pair_b[1])?;
        if hybrid_a.is_empty() || hybrid_b.is_empty() {
            return Err(ChimeraError::InvalidRequest(
                "Both chimeras need a name before they can battle.".into(),
            ));
        }
        Ok(Self {
            kind: GenerationKind::Battle,
            subjects: pair_a.iter().chain(pair_b.iter()).map(|s| s.to_string()).collect(),
            prompt: crate::prompt::build_battle_prompt(hybrid_a, hybrid_b, pair_a, pair_b),
        })
    }
}

fn validate_pair(a: &str, b: &str) -> Result<()> {
    if a.trim().is_empty() || b.trim().is_empty() {
        return Err(ChimeraError::InvalidRequest(
            "Please select two animals!".into(),
        ));
    }
    if a == b {
        return Err(ChimeraError::InvalidRequest(
            "Please select two different animals!".into(),
        ));
    }
    Ok(())
}

/// Discriminant of an [`ImageResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResultKind {
    /// Dereferenceable remote reference.
    RemoteUrl,
    /// Base64 image bytes carried in the response.
    InlineData,
}

/// Normalized image produced by any provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageResult {
    /// The image lives at a remote URL that may not be ready yet.
    RemoteUrl {
        /// Absolute image URL.
        url: Url,
    },
    /// The image bytes, base64-encoded.
    InlineData {
        /// Base64 payload as returned by the provider.
        payload: String,
        /// MIME type of the decoded bytes.
        mime_type: String,
    },
}

impl ImageResult {
    /// Returns the result kind.
    pub fn kind(&self) -> ImageResultKind {
        match self {
            Self::RemoteUrl { .. } => ImageResultKind::RemoteUrl,
            Self::InlineData { .. } => ImageResultKind::InlineData,
        }
    }

    /// Returns the URL or the base64 payload.
    pub fn payload(&self) -> &str {
        match self {
            Self::RemoteUrl { url } => url.as_str(),
            Self::InlineData { payload, .. } => payload,
        }
    }

    /// Returns the MIME type for inline data.
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::RemoteUrl { .. } => None,
            Self::InlineData { mime_type, .. } => Some(mime_type),
        }
    }

    /// Returns what an image element would load: the URL or a `data:` URL.
    pub fn to_src(&self) -> String {
        match self {
            Self::RemoteUrl { url } => url.to_string(),
            Self::InlineData { payload, mime_type } => {
                format!("data:{mime_type};base64,{payload}")
            }
        }
    }

    /// Decodes inline data into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        match self {
            Self::RemoteUrl { .. } => Err(ChimeraError::InvalidRequest(
                "remote images must be fetched before decoding".into(),
            )),
            Self::InlineData { payload, .. } => base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| ChimeraError::Decode(e.to_string())),
        }
    }

    /// Best-effort format of the image.
    pub fn format(&self) -> Option<ImageFormat> {
        self.mime_type().and_then(ImageFormat::from_mime_type)
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Seed used, when the provider takes one.
    pub seed: Option<u64>,
    /// Time spent inside the adapter, in milliseconds.
    pub duration_ms: Option<u64>,
}

/// Whether a result can be shown right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The image content is in hand.
    Ready,
    /// The image was dispatched; its content may still be rendering remotely.
    Deferred,
}

/// A generated image with its provider and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated image should be rendered or saved"]
pub struct GeneratedImage {
    /// The normalized image.
    pub result: ImageResult,
    /// Provider that produced it.
    pub provider: ImageProviderKind,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(
        result: ImageResult,
        provider: ImageProviderKind,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            result,
            provider,
            metadata,
        }
    }

    /// Reports whether the caller still has to wait for the content.
    pub fn readiness(&self) -> Readiness {
        match self.result {
            ImageResult::RemoteUrl { .. } => Readiness::Deferred,
            ImageResult::InlineData { .. } => Readiness::Ready,
        }
    }

    /// Decodes inline image bytes and writes them with [`write_image`].
    ///
    /// Remote results have to be fetched first.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<SavedImage> {
        let data = self.result.decode()?;
        write_image(path.as_ref(), &data, self.result.format())
    }
}
