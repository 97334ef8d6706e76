//! Trellis Server - server-side hydration
//!
//! Renders the server markup of a request into hydratable markup using the
//! component registry of a build.
//!
//! ## Example
//!
//! ```no_run
//! use trellis_server::{BuildConfig, HydrateOptions, create_renderer};
//!
//! # async fn run() -> Result<(), trellis_server::RendererError> {
//! let config = BuildConfig::new().with_root_dir("/srv/app").with_namespace("Ionic");
//! let renderer = create_renderer(config, None, None)?;
//!
//! let results = renderer
//! 	.hydrate_to_string(HydrateOptions::new("<ion-tabs></ion-tabs>").with_url("/about"))
//! 	.await;
//! assert_eq!(results.url.as_deref(), Some("https://localhost/about"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod logger;
pub mod options;
pub mod renderer;
pub mod request;
pub mod validate;

pub use config::{BuildConfig, validate_build_config};
pub use context::{BuildContext, load_app_global};
pub use engine::{HYDRATION_ATTR_ID, HydrateEngine, HydrateJob, MarkupHydrator};
pub use error::{ConfigError, HydrateError, RendererError, RendererResult};
pub use logger::{LogLevel, Logger, init_subscriber};
pub use options::{Anchor, HydrateOptions, HydrateResults};
pub use renderer::{HYDRATE_DIAGNOSTIC_HEADER, Renderer, create_renderer};
pub use request::RequestLike;
pub use validate::{DEFAULT_HOST, DEFAULT_PROTOCOL, normalize_hydrate_options};
