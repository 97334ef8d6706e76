//! # Trellis
//!
//! A component runtime built around compiler-emitted metadata.
//!
//! Components declare which of their fields are reactive state. Trellis
//! turns those fields into accessors backed by the host element's state
//! store, and on the server hydrates pre-rendered markup against the
//! component registry of a build.
//!
//! ## Feature Flags
//!
//! - `core` - metadata model, instance proxies, diagnostics, host capabilities
//! - `registry` - component registry loading
//! - `server` - server-side hydration renderer
//! - `full` (default) - everything above
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use trellis::prelude::*;
//!
//! # async fn run() -> Result<(), RendererError> {
//! let config = BuildConfig::from_file("trellis.toml").unwrap_or_default();
//! let renderer = create_renderer(config, None, None)?;
//!
//! let results = renderer
//! 	.hydrate_to_string(HydrateOptions::new("<ion-tabs></ion-tabs>").with_url("/tabs"))
//! 	.await;
//!
//! for diagnostic in &results.diagnostics {
//! 	eprintln!("{diagnostic}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
#[cfg(feature = "registry")]
pub mod registry;
#[cfg(feature = "server")]
pub mod server;

pub use trellis_core::{
	ComponentMeta, Diagnostic, DiagnosticLevel, DiagnosticType, FieldKind, FieldSpec, HostElement,
	Instance, NoopPlatform, PlatformApi, Sys, install_proxy,
};

#[cfg(feature = "registry")]
pub use trellis_registry::{ComponentRegistry, RegistryError, load_registry};

#[cfg(feature = "server")]
pub use trellis_server::{
	BuildConfig, BuildContext, HydrateEngine, HydrateOptions, HydrateResults, Renderer,
	RendererError, RequestLike, create_renderer,
};

/// Commonly used types, for glob import.
pub mod prelude {
	pub use crate::{
		ComponentMeta, Diagnostic, DiagnosticLevel, DiagnosticType, FieldKind, FieldSpec,
		HostElement, Instance, NoopPlatform, PlatformApi, Sys, install_proxy,
	};

	#[cfg(feature = "registry")]
	pub use crate::{ComponentRegistry, RegistryError, load_registry};

	#[cfg(feature = "server")]
	pub use crate::{
		BuildConfig, BuildContext, HydrateEngine, HydrateOptions, HydrateResults, Renderer,
		RendererError, RequestLike, create_renderer,
	};
	#[cfg(feature = "server")]
	pub use trellis_server::{HydrateError, HydrateJob, LogLevel, Logger};

	// External
	#[cfg(feature = "server")]
	pub use async_trait::async_trait;
}
