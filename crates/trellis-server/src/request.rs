//! Incoming request capability.

/// Read access to the server request a render was triggered by.
pub trait RequestLike: Send + Sync {
	/// Value of header `name`, if present and valid text.
	fn header(&self, name: &str) -> Option<String>;

	/// Scheme without the trailing colon.
	fn protocol(&self) -> String {
		"http".to_string()
	}

	/// Path and query as received.
	fn original_url(&self) -> String {
		"/".to_string()
	}
}

impl<B: Send + Sync> RequestLike for http::Request<B> {
	fn header(&self, name: &str) -> Option<String> {
		self.headers()
			.get(name)
			.and_then(|value| value.to_str().ok())
			.map(str::to_string)
	}

	fn protocol(&self) -> String {
		self.uri().scheme_str().unwrap_or("http").to_string()
	}

	fn original_url(&self) -> String {
		self.uri()
			.path_and_query()
			.map(|pq| pq.as_str().to_string())
			.unwrap_or_else(|| "/".to_string())
	}
}
