//! Client configuration: API location, auth endpoints, and session-redirect rules.
//!
//! Values are assembled through [`ClientConfigBuilder`], which validates URLs and paths
//! once so the request path never has to.

/// Builder API for assembling client configuration.
pub mod builder;

pub use builder::*;

// std
use std::time::Duration as StdDuration;
// self
use crate::_prelude::*;

/// Paths of the three authentication endpoints, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
	/// Sign-in endpoint (`POST`).
	pub login: String,
	/// Token refresh endpoint (`POST`), authenticated by the refresh cookie.
	pub refresh: String,
	/// Sign-out endpoint (`DELETE`).
	pub logout: String,
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self {
			login: "/auth/login".into(),
			refresh: "/auth/refresh".into(),
			logout: "/auth/logout".into(),
		}
	}
}

/// Immutable configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// API root; request paths are appended to its path.
	pub base_url: Url,
	/// Authentication endpoint paths.
	pub endpoints: AuthEndpoints,
	/// Caller-origin value attached to every request, when running on behalf of a site.
	pub origin: Option<String>,
	/// Header that carries [`ClientConfig::origin`].
	pub origin_header: String,
	/// Location prefix of the authenticated application area.
	pub protected_prefix: String,
	/// Sign-in entry point that expired sessions are redirected to.
	pub sign_in_path: String,
	/// Per-request timeout applied by the default transport.
	pub request_timeout: StdDuration,
}
impl ClientConfig {
	/// Default [`ClientConfig::origin_header`].
	pub const DEFAULT_ORIGIN_HEADER: &str = "Origin";
	/// Default [`ClientConfig::protected_prefix`].
	pub const DEFAULT_PROTECTED_PREFIX: &str = "/dashboard";
	/// Default [`ClientConfig::request_timeout`].
	pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);
	/// Default [`ClientConfig::sign_in_path`].
	pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";

	/// Creates a new builder for the provided API root.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves an API path (with optional query pairs) against the base URL.
	///
	/// The base path is kept, so `https://api.example/v1` + `/customers` yields
	/// `https://api.example/v1/customers`.
	pub fn endpoint_url(&self, path: &str, query: &[(String, String)]) -> Url {
		let (path, embedded_query) = match path.split_once('?') {
			Some((path, query)) => (path, Some(query)),
			None => (path, None),
		};
		let mut url = self.base_url.clone();
		let base_path = url.path().trim_end_matches('/').to_owned();
		let separator = if path.starts_with('/') { "" } else { "/" };

		url.set_path(&format!("{base_path}{separator}{path}"));
		url.set_query(embedded_query);

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
		}

		url
	}

	/// Returns `true` when `path` addresses the refresh endpoint.
	///
	/// Compared the way [`ClientConfig::endpoint_url`] resolves paths, so `auth/refresh`,
	/// `/auth/refresh/` and `/auth/refresh?x=1` all count.
	pub fn is_refresh_path(&self, path: &str) -> bool {
		endpoint_key(path) == endpoint_key(&self.endpoints.refresh)
	}

	/// Returns `true` when `location` lies inside the authenticated application area.
	///
	/// `location` may be a bare path or an absolute URL; only its path is compared, on
	/// segment boundaries (`/dashboard` covers `/dashboard/leads` but not `/dashboards`).
	pub fn is_protected_location(&self, location: &str) -> bool {
		let parsed = Url::parse(location).ok();
		let path = parsed.as_ref().map_or(location, |url| url.path());
		let path = path.split(['?', '#']).next().unwrap_or_default();
		let prefix = self.protected_prefix.trim_end_matches('/');

		if prefix.is_empty() {
			return true;
		}

		path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
	}
}

fn endpoint_key(path: &str) -> &str {
	let path = path.split_once('?').map_or(path, |(path, _)| path);

	path.trim_matches('/')
}
