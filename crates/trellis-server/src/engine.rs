//! Hydration engines.
//!
//! An engine turns the server markup of one request into hydratable markup.
//! [`MarkupHydrator`] is the default: it marks every registered component
//! element with a hydration id and collects the page's links.

use crate::config::BuildConfig;
use crate::context::BuildContext;
use crate::error::HydrateError;
use crate::options::{Anchor, HydrateOptions, HydrateResults};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use trellis_registry::ComponentRegistry;
use url::Url;

/// Attribute carrying the hydration id of a component element.
pub const HYDRATION_ATTR_ID: &str = "data-trellis-id";

/// Everything an engine may read for one request.
#[derive(Debug, Clone, Copy)]
pub struct HydrateJob<'a> {
	pub config: &'a BuildConfig,
	pub context: &'a BuildContext,
	pub registry: &'a ComponentRegistry,
	/// Normalized request options.
	pub options: &'a HydrateOptions,
}

#[async_trait]
pub trait HydrateEngine: Send + Sync {
	/// Hydrates `job` into `results`.
	///
	/// `results.html` holds the input markup on entry. Problems that do not
	/// stop the render should be pushed to `results.diagnostics`; an `Err`
	/// is reported as a single hydrate diagnostic by the renderer.
	async fn hydrate_html(
		&self,
		job: HydrateJob<'_>,
		results: &mut HydrateResults,
	) -> Result<(), HydrateError>;
}

static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"<([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
	)
	.expect("Invalid start tag pattern")
});

static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
		.expect("Invalid href pattern")
});

static HYDRATION_ATTR: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\sdata-trellis-id(?:\s*=|\s|$)").expect("Invalid hydration attribute pattern")
});

/// Default engine marking registered component elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupHydrator;

impl MarkupHydrator {
	pub fn new() -> Self {
		Self
	}

	/// Marks component start tags in `html` and collects link targets.
	///
	/// Returns the rewritten markup and every `href` found on an `<a>` tag,
	/// resolved against `base` when possible.
	pub fn hydrate_markup(
		&self,
		html: &str,
		registry: &ComponentRegistry,
		base: Option<&Url>,
	) -> (String, Vec<Anchor>) {
		let mut next_id = 0usize;
		let mut anchors = Vec::new();

		let output = START_TAG.replace_all(html, |caps: &Captures<'_>| {
			let whole = &caps[0];
			let tag = &caps[1];
			let attrs = caps.get(2).map_or("", |m| m.as_str());

			if tag.eq_ignore_ascii_case("a")
				&& let Some(href) = href_value(attrs)
			{
				anchors.push(Anchor {
					href: resolve_href(base, href),
				});
			}

			if !registry.contains(tag) || HYDRATION_ATTR.is_match(attrs) {
				return whole.to_string();
			}

			let id = next_id;
			next_id += 1;
			let insert_at = 1 + tag.len();
			format!(
				"{} {}=\"t-{}\"{}",
				&whole[..insert_at],
				HYDRATION_ATTR_ID,
				id,
				&whole[insert_at..]
			)
		});

		(output.into_owned(), anchors)
	}
}

#[async_trait]
impl HydrateEngine for MarkupHydrator {
	async fn hydrate_html(
		&self,
		job: HydrateJob<'_>,
		results: &mut HydrateResults,
	) -> Result<(), HydrateError> {
		let base = job.options.url.as_deref().and_then(|url| Url::parse(url).ok());
		let html = results.html.as_deref().unwrap_or(job.options.html.as_str());

		let (html, anchors) = self.hydrate_markup(html, job.registry, base.as_ref());

		tracing::debug!(
			url = job.options.url.as_deref().unwrap_or_default(),
			anchors = anchors.len(),
			"hydrated markup"
		);

		results.html = Some(html);
		results.anchors.extend(anchors);
		Ok(())
	}
}

fn href_value(attrs: &str) -> Option<&str> {
	let caps = HREF_ATTR.captures(attrs)?;
	caps.get(1)
		.or_else(|| caps.get(2))
		.or_else(|| caps.get(3))
		.map(|m| m.as_str())
}

fn resolve_href(base: Option<&Url>, href: &str) -> String {
	base.and_then(|base| base.join(href).ok())
		.map(String::from)
		.unwrap_or_else(|| href.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use trellis_core::meta::ComponentMeta;

	#[fixture]
	fn registry() -> ComponentRegistry {
		[ComponentMeta::new("ion-tabs"), ComponentMeta::new("ion-tab")]
			.into_iter()
			.collect()
	}

	#[rstest]
	fn test_marks_component_tags_in_order(registry: ComponentRegistry) {
		// Arrange
		let html = r#"<ion-tabs><ion-tab title="A"></ion-tab><ion-tab/></ion-tabs>"#;

		// Act
		let (output, _) = MarkupHydrator.hydrate_markup(html, &registry, None);

		// Assert
		assert_eq!(
			output,
			r#"<ion-tabs data-trellis-id="t-0"><ion-tab data-trellis-id="t-1" title="A"></ion-tab><ion-tab data-trellis-id="t-2"/></ion-tabs>"#
		);
	}

	#[rstest]
	fn test_markup_without_components_is_unchanged(registry: ComponentRegistry) {
		let html = "<p class=\"x\">hi</p><div><span>there</span></div>";

		let (output, anchors) = MarkupHydrator.hydrate_markup(html, &registry, None);

		assert_eq!(output, html);
		assert!(anchors.is_empty());
	}

	#[rstest]
	fn test_rehydrating_is_idempotent(registry: ComponentRegistry) {
		let html = "<ion-tabs><ion-tab></ion-tab></ion-tabs>";

		let (once, _) = MarkupHydrator.hydrate_markup(html, &registry, None);
		let (twice, _) = MarkupHydrator.hydrate_markup(&once, &registry, None);

		assert_eq!(once, twice);
	}

	#[rstest]
	fn test_tag_match_ignores_case(registry: ComponentRegistry) {
		let (output, _) = MarkupHydrator.hydrate_markup("<ION-TAB></ION-TAB>", &registry, None);

		assert_eq!(output, "<ION-TAB data-trellis-id=\"t-0\"></ION-TAB>");
	}

	#[rstest]
	fn test_quoted_gt_in_attribute(registry: ComponentRegistry) {
		let html = r#"<ion-tab title="a > b">x</ion-tab>"#;

		let (output, _) = MarkupHydrator.hydrate_markup(html, &registry, None);

		assert_eq!(
			output,
			r#"<ion-tab data-trellis-id="t-0" title="a > b">x</ion-tab>"#
		);
	}

	#[rstest]
	fn test_collects_resolved_anchors(registry: ComponentRegistry) {
		// Arrange
		let base = Url::parse("https://localhost/docs/intro").unwrap();
		let html = r#"<a href="/about">About</a><a class="x" href='next'>Next</a><a href=https://example.com/>Ext</a><a name="top"></a>"#;

		// Act
		let (_, anchors) = MarkupHydrator.hydrate_markup(html, &registry, Some(&base));

		// Assert
		let hrefs: Vec<_> = anchors.iter().map(|a| a.href.as_str()).collect();
		assert_eq!(
			hrefs,
			[
				"https://localhost/about",
				"https://localhost/docs/next",
				"https://example.com/",
			]
		);
	}

	#[rstest]
	fn test_anchor_without_base_is_kept_verbatim(registry: ComponentRegistry) {
		let (_, anchors) = MarkupHydrator.hydrate_markup(r#"<a href="/x">x</a>"#, &registry, None);

		assert_eq!(anchors, [Anchor { href: "/x".to_string() }]);
	}
}
