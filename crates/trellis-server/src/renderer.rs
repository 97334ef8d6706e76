//! The hydration renderer.
//!
//! [`create_renderer`] resolves everything a render needs up front (config
//! defaults, the app global and the component registry) and fails there if
//! anything required is missing. After that a [`Renderer`] never fails: every
//! per-request problem ends up as a diagnostic on the returned results.

use crate::config::{BuildConfig, validate_build_config};
use crate::context::{BuildContext, load_app_global};
use crate::engine::{HydrateEngine, HydrateJob, MarkupHydrator};
use crate::error::{HydrateError, RendererResult};
use crate::logger::Logger;
use crate::options::{HydrateOptions, HydrateResults};
use crate::validate::normalize_hydrate_options;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use trellis_core::diagnostic::{Diagnostic, DiagnosticType};
use trellis_core::sys::Sys;
use trellis_registry::{ComponentRegistry, load_registry};

/// Header of the diagnostic reported for a failed hydration.
pub const HYDRATE_DIAGNOSTIC_HEADER: &str = "Hydrate HTML";

/// Builds a renderer for `config`.
///
/// Without `registry`, the registry cached on `context` is used, or it is
/// loaded from [`BuildConfig::registry_json_path`] and cached there. Without
/// `context`, a fresh one is created.
pub fn create_renderer(
	mut config: BuildConfig,
	registry: Option<Arc<ComponentRegistry>>,
	context: Option<Arc<BuildContext>>,
) -> RendererResult<Renderer> {
	let sys = config.sys.get_or_insert_with(Sys::default).clone();
	let log_level = config.log_level;
	let logger = *config.logger.get_or_insert_with(|| Logger::new(log_level));

	validate_build_config(&config)?;

	let context = context.unwrap_or_else(BuildContext::shared);
	load_app_global(&config, &context);

	let registry = match registry.or_else(|| context.registry()) {
		Some(registry) => registry,
		None => {
			let loaded = load_registry(sys.fs.as_ref(), &config.registry_json_path())?;
			context.cache_registry(Arc::new(loaded))
		}
	};

	logger.debug(format_args!(
		"renderer ready: {} components, namespace {}",
		registry.len(),
		config.namespace
	));

	Ok(Renderer {
		config: Arc::new(config),
		context,
		registry,
		engine: Arc::new(MarkupHydrator),
		logger,
	})
}

/// Hydrates server markup, one request at a time or concurrently.
#[derive(Clone)]
pub struct Renderer {
	config: Arc<BuildConfig>,
	context: Arc<BuildContext>,
	registry: Arc<ComponentRegistry>,
	engine: Arc<dyn HydrateEngine>,
	logger: Logger,
}

impl Renderer {
	/// Replaces the hydration engine.
	pub fn with_engine(mut self, engine: impl HydrateEngine + 'static) -> Self {
		self.engine = Arc::new(engine);
		self
	}

	pub fn logger(&self) -> &Logger {
		&self.logger
	}

	pub fn registry(&self) -> &Arc<ComponentRegistry> {
		&self.registry
	}

	pub fn context(&self) -> &Arc<BuildContext> {
		&self.context
	}

	pub fn config(&self) -> &BuildConfig {
		&self.config
	}

	/// Hydrates `opts.html`.
	///
	/// Always completes; failures are reported in `diagnostics`.
	pub async fn hydrate_to_string(&self, mut opts: HydrateOptions) -> HydrateResults {
		let mut results = HydrateResults::new(opts.html.as_str());

		if let Err(err) = self.normalize(&mut opts) {
			self.report(&mut results, &err);
			return results;
		}
		results.url = opts.url.clone();

		let job = HydrateJob {
			config: &*self.config,
			context: &*self.context,
			registry: &*self.registry,
			options: &opts,
		};
		let outcome = AssertUnwindSafe(self.engine.hydrate_html(job, &mut results))
			.catch_unwind()
			.await;

		match outcome {
			Ok(Ok(())) => {}
			Ok(Err(err)) => self.report(&mut results, &err),
			Err(payload) => {
				let err = HydrateError::Panicked(panic_message(&*payload));
				self.report(&mut results, &err);
			}
		}
		results
	}

	/// Hydrates `opts.html` and hands the results to `callback`.
	///
	/// Inside a tokio runtime the work is spawned onto it and this returns
	/// immediately; otherwise it runs to completion on the calling thread.
	/// `callback` is invoked exactly once either way. If the runtime drops the
	/// task before it finishes, the callback gets the input markup with a
	/// single `hydration cancelled` diagnostic.
	pub fn hydrate_to_string_with<F>(&self, opts: HydrateOptions, callback: F)
	where
		F: FnOnce(HydrateResults) + Send + 'static,
	{
		let renderer = self.clone();
		let completion = Completion {
			callback: Some(callback),
			html: opts.html.clone(),
			logger: self.logger,
		};
		let task = async move {
			let results = renderer.hydrate_to_string(opts).await;
			completion.complete(results);
		};

		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				drop(handle.spawn(task));
			}
			Err(_) => futures::executor::block_on(task),
		}
	}

	fn normalize(&self, opts: &mut HydrateOptions) -> Result<(), HydrateError> {
		std::panic::catch_unwind(AssertUnwindSafe(|| {
			normalize_hydrate_options(&self.config, opts)
		}))
		.map_err(|payload| HydrateError::Panicked(panic_message(&*payload)))?
		.map_err(HydrateError::from)
	}

	fn report(&self, results: &mut HydrateResults, err: &HydrateError) {
		report_failure(&self.logger, results, err);
	}
}

fn report_failure(logger: &Logger, results: &mut HydrateResults, err: &HydrateError) {
	logger.error(format_args!("{HYDRATE_DIAGNOSTIC_HEADER}: {err}"));
	results.diagnostics.push(Diagnostic::error(
		DiagnosticType::Hydrate,
		HYDRATE_DIAGNOSTIC_HEADER,
		err.to_string(),
	));
}

/// Delivers results to a callback exactly once, even when dropped unfinished.
struct Completion<F: FnOnce(HydrateResults)> {
	callback: Option<F>,
	html: String,
	logger: Logger,
}

impl<F: FnOnce(HydrateResults)> Completion<F> {
	fn complete(mut self, results: HydrateResults) {
		if let Some(callback) = self.callback.take() {
			callback(results);
		}
	}
}

impl<F: FnOnce(HydrateResults)> Drop for Completion<F> {
	fn drop(&mut self) {
		if let Some(callback) = self.callback.take() {
			let mut results = HydrateResults::new(std::mem::take(&mut self.html));
			report_failure(&self.logger, &mut results, &HydrateError::Cancelled);
			callback(results);
		}
	}
}

impl fmt::Debug for Renderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Renderer")
			.field("namespace", &self.config.namespace)
			.field("components", &self.registry.len())
			.field("logger", &self.logger)
			.finish_non_exhaustive()
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic".to_string()
	}
}
