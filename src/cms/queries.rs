//! GROQ queries sent to the content store
//!
//! Site post queries return raw documents with the master post dereferenced;
//! inheritance is resolved locally by [`crate::content::resolver`].

/// All sites, alphabetically
pub const SITES_QUERY: &str = r#"*[_type == "site"] | order(title asc) { _id, title, siteId }"#;

/// The newest master posts that have a slug
pub const MASTER_POSTS_QUERY: &str = r#"*[
  _type == "post"
  && defined(slug.current)
] | order(publishedAt desc)[0...12] { _id, title, slug, publishedAt }"#;

/// One master post by slug
pub const MASTER_POST_QUERY: &str = r#"*[
  _type == "post"
  && slug.current == $slug
][0] { _id, title, slug, publishedAt, image, body }"#;

/// Site posts of a site, list projection
pub const SITE_POSTS_QUERY: &str = r#"*[
  _type == "sitePost"
  && site->siteId == $siteId
  && defined(masterPost)
] {
  _id,
  inheritanceEnabled,
  overriddenFields,
  masterPost->{ _id, title, slug, publishedAt },
  title,
  slug,
  publishedAt
}"#;

/// Site posts of a site, detail projection
pub const SITE_POST_QUERY: &str = r#"*[
  _type == "sitePost"
  && site->siteId == $siteId
  && defined(masterPost)
] {
  _id,
  inheritanceEnabled,
  overriddenFields,
  masterPost->{ _id, title, slug, publishedAt, image, body },
  title,
  slug,
  publishedAt,
  image,
  body
}"#;
