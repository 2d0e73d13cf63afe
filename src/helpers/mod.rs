//! Helper functions for page rendering
//!
//! URL generation, date formatting, HTML snippets and image CDN URLs.

mod date;
mod html;
mod image;
mod url;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub use date::*;
pub use html::*;
pub use image::*;
pub use url::*;

use crate::config::AppConfig;
use crate::content::ImageRef;

/// Collection of helpers bound to the current configuration
#[derive(Debug, Clone)]
pub struct Helpers {
    timezone: Tz,
    date_format: String,
    images: Option<ImageUrlBuilder>,
}

impl Helpers {
    /// Create a new helpers instance
    pub fn new(config: &AppConfig) -> Self {
        let timezone = config.render.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(
                "Unknown timezone {:?}, falling back to UTC",
                config.render.timezone
            );
            Tz::UTC
        });

        Self {
            timezone,
            date_format: config.render.date_format.clone(),
            images: ImageUrlBuilder::from_parts(
                config.cms.project_id.as_deref(),
                config.cms.dataset.as_deref(),
            ),
        }
    }

    /// Format a date with the configured format and timezone
    pub fn date(&self, date: &DateTime<Utc>) -> String {
        format_in_zone(date, self.timezone, &self.date_format)
    }

    /// Image builder, if the CMS project is configured
    pub fn images(&self) -> Option<&ImageUrlBuilder> {
        self.images.as_ref()
    }

    /// Derive an image URL; `None` when unconfigured or unparseable
    pub fn image_url(
        &self,
        image: &ImageRef,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Option<String> {
        self.images.as_ref()?.url(image, width, height)
    }
}
