//! Pad Viewer - live markdown viewer for Etherpad pads and files
//!
//! A view is addressed by a path such as `/output/pad/team/notes?format=ppt`.
//! Each mounted view polls its source, rewrites the text for the requested
//! format, and re-renders whenever something new arrives.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Browser: /output/<file|pad>/<location>?format=...           │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  server        PageParams -> ViewRegistry -> Shell::present  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  refresh       tick: fetch -> transform -> debounce -> render│
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  source        filesystem / Etherpad API / content API       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pad_viewer::{server, source::BackendContentSource, ViewerConfig};
//!
//! let config = ViewerConfig::load("config/pad_viewer.yaml")?;
//! let source = Arc::new(BackendContentSource::new(files, etherpad));
//! let app = server::build_router(server::AppState::new(config, source)?);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod params;
pub mod refresh;
pub mod render;
pub mod server;
pub mod shell;
pub mod source;
pub mod transform;

pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use params::{Format, PageParams, Source};
pub use refresh::{RefreshHandle, TickOutcome, ViewController};
