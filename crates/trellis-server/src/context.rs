//! Shared build context.
//!
//! A [`BuildContext`] caches the build output the renderer reads once: the
//! component registry and the app global script. It may be shared between
//! several renderers built from the same configuration.
//!
//! # Thread Safety
//!
//! Both caches are load-once. A value is only written while the slot is
//! still empty, so concurrent loaders may duplicate work but the first
//! stored value wins.

use crate::config::BuildConfig;
use parking_lot::RwLock;
use std::sync::Arc;
use trellis_registry::ComponentRegistry;

#[derive(Debug, Default)]
pub struct BuildContext {
	registry: RwLock<Option<Arc<ComponentRegistry>>>,
	app_global: RwLock<Option<Arc<str>>>,
}

impl BuildContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty context ready to share.
	pub fn shared() -> Arc<Self> {
		Arc::new(Self::new())
	}

	/// The cached registry, if one was loaded.
	pub fn registry(&self) -> Option<Arc<ComponentRegistry>> {
		self.registry.read().clone()
	}

	/// Caches `registry` unless another one is already cached, and returns
	/// the cached one.
	pub fn cache_registry(&self, registry: Arc<ComponentRegistry>) -> Arc<ComponentRegistry> {
		if let Some(existing) = self.registry() {
			return existing;
		}
		let mut slot = self.registry.write();
		slot.get_or_insert(registry).clone()
	}

	/// The cached app global script.
	pub fn app_global(&self) -> Option<Arc<str>> {
		self.app_global.read().clone()
	}

	/// Caches the app global script unless one is already cached, and returns
	/// the cached one.
	pub fn cache_app_global(&self, script: impl Into<Arc<str>>) -> Arc<str> {
		if let Some(existing) = self.app_global() {
			return existing;
		}
		let mut slot = self.app_global.write();
		slot.get_or_insert_with(|| script.into()).clone()
	}
}

/// Loads the app global script into `ctx` if it is not cached yet.
///
/// A missing script is not an error. It is logged at debug level and the
/// cache stays empty.
pub fn load_app_global(config: &BuildConfig, ctx: &BuildContext) {
	if ctx.app_global().is_some() {
		return;
	}

	let path = config.app_global_path();
	match config.sys_or_default().fs.read_to_string(&path) {
		Ok(script) => {
			ctx.cache_app_global(script);
		}
		Err(_) => {
			config
				.logger_or_default()
				.debug(format_args!("missing app global: {}", path.display()));
		}
	}
}
