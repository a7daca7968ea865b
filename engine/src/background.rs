//! Face artwork and its surface-sized copies
//!
//! The source assets are decoded once. Whenever the surface size changes the
//! background is scaled to the surface width, a desaturated twin is derived
//! from it, and the hour-hand art is scaled to a square of the surface
//! width, always from the source assets. Nothing here runs per frame.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

pub const BACKGROUND_FILE: &str = "bg.png";
pub const HOUR_HAND_FILE: &str = "hour.png";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("missing asset {0}")]
    Missing(PathBuf),
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("asset {0} has no pixels")]
    Empty(PathBuf),
}

/// Decoded source artwork
#[derive(Debug, Clone)]
pub struct FaceAssets {
    pub background: RgbaImage,
    pub hour_hand: RgbaImage,
}

impl FaceAssets {
    pub fn new(background: RgbaImage, hour_hand: RgbaImage) -> Self {
        Self {
            background,
            hour_hand,
        }
    }

    /// Load `bg.png` and `hour.png` from a directory
    pub fn load(dir: &Path) -> Result<Self, AssetError> {
        Ok(Self {
            background: load_rgba(&dir.join(BACKGROUND_FILE))?,
            hour_hand: load_rgba(&dir.join(HOUR_HAND_FILE))?,
        })
    }
}

fn load_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    if !path.exists() {
        return Err(AssetError::Missing(path.to_path_buf()));
    }
    let image = image::open(path)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(AssetError::Empty(path.to_path_buf()));
    }
    Ok(image)
}

/// Which cached raster a draw command refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterId {
    Background,
    BackgroundDesaturated,
    HourHand,
}

/// Surface-sized rasters, rebuilt together on size changes
#[derive(Debug, Default)]
pub struct ScaledBackground {
    color: Option<RgbaImage>,
    desaturated: Option<RgbaImage>,
    hour_hand: Option<RgbaImage>,
    size: Option<(u32, u32)>,
    generation: u64,
}

impl ScaledBackground {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the rasters have been rebuilt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn raster(&self, id: RasterId) -> Option<&RgbaImage> {
        match id {
            RasterId::Background => self.color.as_ref(),
            RasterId::BackgroundDesaturated => self.desaturated.as_ref(),
            RasterId::HourHand => self.hour_hand.as_ref(),
        }
    }

    /// Rebuild for a new surface size
    ///
    /// Zero-sized surfaces and repeats of the current size leave the cache
    /// untouched. Returns true if the rasters were rebuilt.
    pub fn resize(&mut self, assets: &FaceAssets, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            debug!(width, height, "skipping background scale for empty surface");
            return false;
        }
        if self.size == Some((width, height)) {
            return false;
        }

        let color = scale_to_width(&assets.background, width);
        let desaturated = DynamicImage::ImageRgba8(color.clone())
            .grayscale()
            .to_rgba8();
        let hour_hand = imageops::resize(&assets.hour_hand, width, width, FilterType::Nearest);

        self.color = Some(color);
        self.desaturated = Some(desaturated);
        self.hour_hand = Some(hour_hand);
        self.size = Some((width, height));
        self.generation += 1;
        debug!(width, height, generation = self.generation, "background rescaled");
        true
    }
}

/// Scale preserving aspect ratio so the result is exactly `width` wide
fn scale_to_width(source: &RgbaImage, width: u32) -> RgbaImage {
    let scale = width as f64 / source.width() as f64;
    let height = ((source.height() as f64 * scale).round() as u32).max(1);
    imageops::resize(source, width, height, FilterType::Triangle)
}
