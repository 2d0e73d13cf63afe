//! Image CDN URL derivation
//!
//! Image assets are referenced as `image-<id>-<width>x<height>-<format>`. The
//! CDN serves them at `/images/<project>/<dataset>/<id>-<w>x<h>.<format>` and
//! accepts `rect`, `w` and `h` query parameters. When both a target width and
//! height are requested, the source crop is narrowed to the target aspect
//! ratio, centered on the hotspot.

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::{ImageCrop, ImageHotspot, ImageRef};

/// Default image CDN
pub const DEFAULT_CDN: &str = "https://cdn.sanity.io";

lazy_static! {
    static ref ASSET_REF: Regex =
        Regex::new(r"^image-(?P<id>[A-Za-z0-9]+)-(?P<w>\d+)x(?P<h>\d+)-(?P<fmt>[a-z0-9]+)$")
            .expect("asset ref pattern is valid");
}

/// Parsed image asset identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetId {
    pub fn parse(reference: &str) -> Option<Self> {
        let caps = ASSET_REF.captures(reference)?;
        Some(Self {
            id: caps["id"].to_string(),
            width: caps["w"].parse().ok()?,
            height: caps["h"].parse().ok()?,
            format: caps["fmt"].to_string(),
        })
    }

    fn filename(&self) -> String {
        format!("{}-{}x{}.{}", self.id, self.width, self.height, self.format)
    }
}

/// Pixel rectangle within the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// Builds CDN URLs for one project/dataset pair
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_CDN.to_string(),
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// Builder only exists when both identifiers are configured
    pub fn from_parts(project_id: Option<&str>, dataset: Option<&str>) -> Option<Self> {
        match (project_id, dataset) {
            (Some(p), Some(d)) if !p.is_empty() && !d.is_empty() => Some(Self::new(p, d)),
            _ => None,
        }
    }

    /// Derive a URL for `image`, or `None` if it has no parseable asset
    pub fn url(&self, image: &ImageRef, width: Option<u32>, height: Option<u32>) -> Option<String> {
        let asset = AssetId::parse(&image.asset.as_ref()?.reference)?;
        let crop = crop_rect(&asset, image.crop.as_ref());
        let rect = match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {
                let hotspot = image.hotspot.unwrap_or(ImageHotspot {
                    x: 0.5,
                    y: 0.5,
                    width: 1.0,
                    height: 1.0,
                });
                fit_rect(&asset, crop, &hotspot, w, h)
            }
            _ => crop,
        };

        let mut params = Vec::new();
        let is_effective_crop = rect.left != 0
            || rect.top != 0
            || rect.width != i64::from(asset.width)
            || rect.height != i64::from(asset.height);
        if is_effective_crop {
            params.push(format!(
                "rect={},{},{},{}",
                rect.left, rect.top, rect.width, rect.height
            ));
        }
        if let Some(w) = width {
            params.push(format!("w={}", w));
        }
        if let Some(h) = height {
            params.push(format!("h={}", h));
        }

        let url = format!(
            "{}/images/{}/{}/{}",
            self.base_url,
            self.project_id,
            self.dataset,
            asset.filename()
        );
        if params.is_empty() {
            Some(url)
        } else {
            Some(format!("{}?{}", url, params.join("&")))
        }
    }
}

fn round(v: f64) -> i64 {
    v.round() as i64
}

fn crop_rect(asset: &AssetId, crop: Option<&ImageCrop>) -> Rect {
    let w = f64::from(asset.width);
    let h = f64::from(asset.height);
    let crop = crop.copied().unwrap_or(ImageCrop {
        top: 0.0,
        bottom: 0.0,
        left: 0.0,
        right: 0.0,
    });
    let left = round(crop.left * w);
    let top = round(crop.top * h);
    Rect {
        left,
        top,
        width: round(w - crop.right * w - left as f64),
        height: round(h - crop.bottom * h - top as f64),
    }
}

fn fit_rect(asset: &AssetId, crop: Rect, hotspot: &ImageHotspot, width: u32, height: u32) -> Rect {
    let w = f64::from(asset.width);
    let h = f64::from(asset.height);
    let desired = f64::from(width) / f64::from(height);
    let crop_ratio = crop.width as f64 / crop.height as f64;

    if crop_ratio > desired {
        // Wider than wanted: trim the sides around the hotspot
        let height = crop.height;
        let width = round(height as f64 * desired);
        let top = crop.top.max(0);
        let center = round(hotspot.x * w);
        let mut left = round(center as f64 - width as f64 / 2.0).max(0);
        if left < crop.left {
            left = crop.left;
        } else if left + width > crop.left + crop.width {
            left = crop.left + crop.width - width;
        }
        Rect {
            left,
            top,
            width,
            height,
        }
    } else {
        // Taller than wanted: trim top and bottom around the hotspot
        let width = crop.width;
        let height = round(width as f64 / desired);
        let left = crop.left.max(0);
        let center = round(hotspot.y * h);
        let mut top = round(center as f64 - height as f64 / 2.0).max(0);
        if top < crop.top {
            top = crop.top;
        } else if top + height > crop.top + crop.height {
            top = crop.top + crop.height - height;
        }
        Rect {
            left,
            top,
            width,
            height,
        }
    }
}
