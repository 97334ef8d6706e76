//! Per-request input and output.

use crate::request::RequestLike;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use trellis_core::diagnostic::Diagnostic;

/// Input for one hydration.
#[derive(Clone, Default)]
pub struct HydrateOptions {
	/// Server rendered markup to hydrate.
	pub html: String,
	pub url: Option<String>,
	pub referrer: Option<String>,
	pub user_agent: Option<String>,
	pub cookie: Option<String>,
	/// Request the render was triggered by. Fills in absent fields above.
	pub req: Option<Arc<dyn RequestLike>>,
}

impl HydrateOptions {
	pub fn new(html: impl Into<String>) -> Self {
		Self {
			html: html.into(),
			..Self::default()
		}
	}

	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
		self.referrer = Some(referrer.into());
		self
	}

	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());
		self
	}

	pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
		self.cookie = Some(cookie.into());
		self
	}

	pub fn with_req(mut self, req: impl RequestLike + 'static) -> Self {
		self.req = Some(Arc::new(req));
		self
	}
}

impl fmt::Debug for HydrateOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HydrateOptions")
			.field("html", &self.html)
			.field("url", &self.url)
			.field("referrer", &self.referrer)
			.field("user_agent", &self.user_agent)
			.field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
			.field("req", &self.req.is_some())
			.finish()
	}
}

/// A link found in rendered markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
	pub href: String,
}

/// Output of one hydration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateResults {
	/// Normalized request URL.
	pub url: Option<String>,
	/// Rendered markup; starts out as the input markup.
	pub html: Option<String>,
	pub styles: Option<String>,
	pub anchors: Vec<Anchor>,
	pub diagnostics: Vec<Diagnostic>,
}

impl HydrateResults {
	/// Results seeded with the input markup.
	pub fn new(html: impl Into<String>) -> Self {
		Self {
			html: Some(html.into()),
			..Self::default()
		}
	}
}
