//! Configuration module

mod app;

pub use app::{AppConfig, CmsConfig, RenderConfig, ServerConfig, CONFIG_FILE};
