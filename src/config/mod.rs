//! Viewer configuration
//!
//! Loaded from YAML, then overridden from the environment.

mod viewer_config;

pub use viewer_config::{
    ContentConfig, ContentMode, EtherpadConfig, RefreshConfig, ServerConfig, ViewerConfig,
};
