//! CMS document models: sites, master posts and site posts

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::resolver::{EffectivePost, Field, OverridePolicy};

/// A URL segment as stored by the CMS (`{ "current": "..." }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
        }
    }
}

/// Reference to an uploaded image asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// Crop margins, as fractions of the source dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageCrop {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

/// Hotspot center and extent, as fractions of the source dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageHotspot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An image field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub crop: Option<ImageCrop>,
    #[serde(default)]
    pub hotspot: Option<ImageHotspot>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    pub fn from_asset(reference: impl Into<String>) -> Self {
        Self {
            asset: Some(AssetRef {
                reference: reference.into(),
            }),
            crop: None,
            hotspot: None,
            alt: None,
        }
    }
}

/// A text span inside a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// Annotation definition referenced from span marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// A paragraph, heading, quote or list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<Span>,
    #[serde(default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<usize>,
}

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub code: String,
}

/// One entry of a rich-text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum BodyBlock {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageRef),
    #[serde(rename = "code")]
    Code(CodeBlock),
    #[serde(other)]
    Unknown,
}

/// Rich-text body. Anything that is not an array is treated as absent, and
/// entries that fail to decode become [`BodyBlock::Unknown`].
pub type Body = Vec<BodyBlock>;

fn deserialize_body<'de, D>(deserializer: D) -> Result<Option<Body>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or(BodyBlock::Unknown))
                .collect(),
        ),
        _ => None,
    })
}

/// Publication timestamp: RFC 3339, or a plain `YYYY-MM-DD` date taken as
/// midnight UTC. Any other value is treated as absent.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    tracing::debug!("Ignoring unparseable publishedAt {:?}", raw);
    None
}

fn deserialize_published_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => parse_published_at(&raw),
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::debug!("Ignoring non-string publishedAt {}", other);
            None
        }
    })
}

/// A site: identifier plus display title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Canonical content record shared across sites
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterPost {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "deserialize_published_at")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default, deserialize_with = "deserialize_body")]
    pub body: Option<Body>,
}

/// A per-site wrapper around a master post that may override its fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePost {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub inheritance_enabled: Option<bool>,
    #[serde(default)]
    pub overridden_fields: Option<Vec<String>>,
    /// Dereferenced master post; `None` when the link is unresolved
    #[serde(default)]
    pub master_post: Option<MasterPost>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "deserialize_published_at")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default, deserialize_with = "deserialize_body")]
    pub body: Option<Body>,
}

impl SitePost {
    /// Inheritance is only off when the flag is explicitly `false`
    pub fn inheritance_enabled(&self) -> bool {
        self.inheritance_enabled != Some(false)
    }

    pub fn overridden_fields(&self) -> &[String] {
        self.overridden_fields.as_deref().unwrap_or(&[])
    }

    /// Compute the effective projection, or `None` when the master link is unresolved
    pub fn resolve(&self) -> Option<EffectivePost> {
        let master = self.master_post.as_ref()?;
        let policy = OverridePolicy::new(self.inheritance_enabled(), self.overridden_fields());

        Some(EffectivePost {
            id: self.id.clone(),
            title: policy.resolve(Field::Title, self.title.clone(), master.title.clone()),
            slug: policy.resolve(Field::Slug, self.slug.clone(), master.slug.clone()),
            published_at: policy.resolve(
                Field::PublishedAt,
                self.published_at,
                master.published_at,
            ),
            image: policy.resolve(Field::Image, self.image.clone(), master.image.clone()),
            body: policy.resolve(Field::Body, self.body.clone(), master.body.clone()),
        })
    }
}
