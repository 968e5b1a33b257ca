//! Source image identity and display previews

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use image::imageops::FilterType;
use sha2::{Digest, Sha256};

use crate::domain::ImageIdentity;
use crate::error::InputError;

/// Read size used while hashing
const HASH_CHUNK: usize = 1 << 20;

/// Dimensions and content hash of a source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub sha256: String,
}

impl ImageInfo {
    /// Read dimensions from the header and hash the file contents
    pub fn probe(path: &Path) -> Result<Self, InputError> {
        let (width, height) = image::image_dimensions(path).map_err(|source| InputError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let sha256 = sha256_file(path)?;
        log::debug!("Probed {}: {}x{}", path.display(), width, height);
        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            sha256,
        })
    }

    pub fn identity(&self) -> ImageIdentity {
        ImageIdentity {
            path: self.path.to_string_lossy().into_owned(),
            size: (self.width, self.height),
            sha256: self.sha256.clone(),
        }
    }
}

/// Lowercase hex SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String, InputError> {
    let io_err = |source: std::io::Error| InputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Decode an image and shrink it to fit `max_side`
///
/// Returns the preview, the source-to-preview ratio (source width / preview
/// width) and the source size as (height, width).
pub fn load_image_preview(
    path: &Path,
    max_side: u32,
) -> Result<(RgbaImage, f64, (u32, u32)), InputError> {
    let img = image::open(path).map_err(|source| InputError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = (img.width(), img.height());

    let img = if width.max(height) > max_side && max_side > 0 {
        img.resize(max_side, max_side, FilterType::Triangle)
    } else {
        img
    };
    let preview = img.to_rgba8();
    let scale = if preview.width() > 0 {
        width as f64 / preview.width() as f64
    } else {
        1.0
    };
    log::info!(
        "Loaded {} [{}x{}] preview {}x{}",
        path.display(),
        width,
        height,
        preview.width(),
        preview.height()
    );
    Ok((preview, scale, (height, width)))
}
