//! Hydrate request normalization.

use crate::config::BuildConfig;
use crate::options::HydrateOptions;
use crate::request::RequestLike;
use trellis_core::sys::UrlError;

/// Protocol assumed when the request URL carries none.
pub const DEFAULT_PROTOCOL: &str = "https:";

/// Host assumed when the request URL carries none.
pub const DEFAULT_HOST: &str = "localhost";

fn present(value: &Option<String>) -> bool {
	value.as_deref().is_some_and(|v| !v.is_empty())
}

fn fill_from_header(field: &mut Option<String>, req: &dyn RequestLike, names: &[&str]) {
	if present(field) {
		return;
	}
	if let Some(value) = names
		.iter()
		.find_map(|name| req.header(name).filter(|v| !v.is_empty()))
	{
		*field = Some(value);
	}
}

/// Fills in and normalizes the request fields of `opts`.
///
/// Absent fields are derived from `opts.req` when present. The URL is then
/// made absolute, defaulting to `https:` and `localhost`. Running it again on
/// normalized options changes nothing.
pub fn normalize_hydrate_options(
	config: &BuildConfig,
	opts: &mut HydrateOptions,
) -> Result<(), UrlError> {
	if let Some(req) = opts.req.clone() {
		if !present(&opts.url) {
			let original_url = req.original_url();
			opts.url = Some(match req.header("host").filter(|h| !h.is_empty()) {
				Some(host) => format!("{}://{}{}", req.protocol(), host, original_url),
				None => original_url,
			});
		}
		fill_from_header(&mut opts.referrer, req.as_ref(), &["referrer", "referer"]);
		fill_from_header(&mut opts.user_agent, req.as_ref(), &["user-agent"]);
		fill_from_header(&mut opts.cookie, req.as_ref(), &["cookie"]);
	}

	let url = match opts.url.as_deref() {
		Some(url) if !url.is_empty() => url,
		_ => "/",
	};

	let sys = config.sys_or_default();
	let mut parts = sys.url.parse(url)?;
	if parts.protocol.as_deref().is_none_or(str::is_empty) {
		parts.protocol = Some(DEFAULT_PROTOCOL.to_string());
	}
	if parts.hostname.as_deref().is_none_or(str::is_empty) {
		parts.hostname = Some(DEFAULT_HOST.to_string());
	}

	opts.url = Some(sys.url.format(&parts));
	Ok(())
}
