//! oblako-io: Filesystem orchestration for word-cloud renders.
//!
//! Wires the pure crates together per request: resolve the pattern
//! image, load a font through the fallback chain, run layout and
//! rendering, and write the output atomically (temp file + rename) so a
//! failed render never leaves a truncated image behind. The tokenizer
//! and transport collaborators stay outside; they hand over a
//! [`RenderRequest`] and receive a [`RenderedCloud`].

pub mod font;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use oblako_pipeline::{CloudConfig, CloudError, TextShaper, WordEntry};
use oblako_render::{EncodeError, EncodeLimits};

pub use font::load_font_chain;

/// Service-level configuration: directories plus the pure-stage configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding pattern images, resolved by base name.
    pub patterns_dir: PathBuf,
    /// Directory receiving rendered clouds.
    pub output_dir: PathBuf,
    /// Preferred font file; the platform fallback chain is used when
    /// absent or unreadable.
    pub font_path: Option<PathBuf>,
    /// Layout configuration.
    pub cloud: CloudConfig,
    /// Size-optimizer configuration.
    pub limits: EncodeLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            patterns_dir: PathBuf::from("patterns"),
            output_dir: PathBuf::from("outputs"),
            font_path: None,
            cloud: CloudConfig::default(),
            limits: EncodeLimits::default(),
        }
    }
}

/// One render request from the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Pattern base name, without extension.
    pub pattern: String,
    /// Requesting user, used in the output file name.
    pub user_id: i64,
    /// Ranked word-frequency table, most frequent first.
    pub words: Vec<WordEntry>,
    /// First message of the chat export, passed through as the caption.
    pub first_message: String,
}

/// A finished render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCloud {
    /// Path of the written PNG.
    pub path: PathBuf,
    /// Caption text, unchanged from the request.
    pub first_message: String,
}

/// Errors from the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The pattern image file does not exist or cannot be read.
    #[error("pattern image not found at {}", .path.display())]
    PatternNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every candidate in the font fallback chain failed.
    #[error("no usable font found in the fallback chain")]
    FontUnavailable,

    /// Layout failed.
    #[error(transparent)]
    Layout(#[from] CloudError),

    /// Encoding failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The output file could not be written.
    #[error("could not save image to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render a word cloud to disk using the font fallback chain.
///
/// # Errors
///
/// Returns [`ServiceError`] for a missing pattern, an exhausted font
/// chain, layout or encoding failures, or a failed write. On failure no
/// output file (not even a partial one) is left behind.
pub fn generate(
    request: &RenderRequest,
    config: &ServiceConfig,
) -> Result<RenderedCloud, ServiceError> {
    let shaper = font::load_font_chain(config.font_path.as_deref())?;
    generate_with_shaper(request, config, &shaper)
}

/// Render a word cloud to disk with a caller-supplied shaper.
///
/// Split out from [`generate`] so the pipeline can be driven without a
/// font file on disk.
///
/// # Errors
///
/// Same as [`generate`], minus the font chain.
pub fn generate_with_shaper<S: TextShaper + ?Sized>(
    request: &RenderRequest,
    config: &ServiceConfig,
    shaper: &S,
) -> Result<RenderedCloud, ServiceError> {
    let pattern_path = config.patterns_dir.join(format!("{}.png", request.pattern));
    let pattern_bytes = fs::read(&pattern_path).map_err(|source| ServiceError::PatternNotFound {
        path: pattern_path,
        source,
    })?;

    let layout = oblako_pipeline::layout_cloud(&request.words, &pattern_bytes, shaper, &config.cloud)?;
    let canvas = oblako_render::compose(&layout, shaper);
    let bytes = oblako_render::encode_png_bounded(&canvas, &config.limits)?;

    fs::create_dir_all(&config.output_dir).map_err(|source| ServiceError::Write {
        path: config.output_dir.clone(),
        source,
    })?;
    let file_name = format!("{}_user_id-{}.png", request.pattern, request.user_id);
    let path = config.output_dir.join(file_name);
    write_atomic(&path, &bytes)?;

    info!(
        path = %path.display(),
        placed = layout.placements.len(),
        dropped = layout.dropped,
        bytes = bytes.len(),
        "word cloud rendered",
    );
    Ok(RenderedCloud {
        path,
        first_message: request.first_message.clone(),
    })
}

/// Write via a temporary sibling and rename into place; the temp file is
/// removed if the rename fails.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    let tmp = path.with_extension("png.tmp");
    let write_error = |source| ServiceError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp, bytes).map_err(write_error)?;
    if let Err(source) = fs::rename(&tmp, path) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            debug!(path = %tmp.display(), error = %cleanup, "failed to remove temp output");
        }
        return Err(write_error(source));
    }
    Ok(())
}

/// RAII guard for a caller-supplied temporary input file (e.g. the
/// extracted chat export): the file is deleted when the guard drops, on
/// every exit path.
#[derive(Debug)]
pub struct TempInput {
    path: PathBuf,
}

impl TempInput {
    /// Take responsibility for deleting `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The guarded path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempInput {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_file(&self.path) {
            if error.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %self.path.display(), %error, "failed to remove temporary input");
            }
        }
    }
}
