use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use super::backend::{RenderBackend, TextureHandle};

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("failed to open texture {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decodes an image file to RGBA8 and uploads it. Failures are logged and
/// returned; the caller decides whether a missing texture is fatal.
pub fn load_texture(
    path: &Path,
    backend: &mut dyn RenderBackend,
) -> Result<TextureHandle, TextureLoadError> {
    let result = decode_rgba(path);
    let (width, height, rgba) = match result {
        Ok(decoded) => decoded,
        Err(error) => {
            warn!(path = %path.display(), error = %error, "texture_load_failed");
            return Err(error);
        }
    };
    let handle = backend.upload_texture(&rgba, width, height);
    debug!(
        path = %path.display(),
        width,
        height,
        handle = handle.0,
        "texture_loaded"
    );
    Ok(handle)
}

fn decode_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), TextureLoadError> {
    let reader = ImageReader::open(path).map_err(|source| TextureLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| TextureLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok((image.width(), image.height(), image.into_raw()))
}
