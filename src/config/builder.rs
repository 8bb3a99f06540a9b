// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	config::{AuthEndpoints, ClientConfig},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// API root.
	pub base_url: Url,
	/// Authentication endpoint paths.
	pub endpoints: AuthEndpoints,
	/// Optional caller-origin value.
	pub origin: Option<String>,
	/// Header carrying the caller origin.
	pub origin_header: String,
	/// Location prefix of the authenticated application area.
	pub protected_prefix: String,
	/// Sign-in entry point.
	pub sign_in_path: String,
	/// Transport timeout per request.
	pub request_timeout: StdDuration,
	/// Accepts plain-HTTP base URLs (local development and tests).
	pub allow_insecure: bool,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with defaults for the provided API root.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			endpoints: AuthEndpoints::default(),
			origin: None,
			origin_header: ClientConfig::DEFAULT_ORIGIN_HEADER.into(),
			protected_prefix: ClientConfig::DEFAULT_PROTECTED_PREFIX.into(),
			sign_in_path: ClientConfig::DEFAULT_SIGN_IN_PATH.into(),
			request_timeout: ClientConfig::DEFAULT_REQUEST_TIMEOUT,
			allow_insecure: false,
		}
	}

	/// Overrides all authentication endpoint paths.
	pub fn endpoints(mut self, endpoints: AuthEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.refresh = path.into();

		self
	}

	/// Sets the caller-origin value attached to every request.
	pub fn origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());

		self
	}

	/// Overrides the header that carries the caller origin.
	pub fn origin_header(mut self, name: impl Into<String>) -> Self {
		self.origin_header = name.into();

		self
	}

	/// Overrides the location prefix of the authenticated area.
	pub fn protected_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.protected_prefix = prefix.into();

		self
	}

	/// Overrides the sign-in entry point.
	pub fn sign_in_path(mut self, path: impl Into<String>) -> Self {
		self.sign_in_path = path.into();

		self
	}

	/// Overrides the per-request transport timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Allows `http://` base URLs.
	pub fn allow_insecure(mut self, allow: bool) -> Self {
		self.allow_insecure = allow;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			endpoints: self.endpoints,
			origin: self.origin,
			origin_header: self.origin_header,
			protected_prefix: self.protected_prefix,
			sign_in_path: self.sign_in_path,
			request_timeout: self.request_timeout,
		};

		config.validate(self.allow_insecure)?;

		Ok(config)
	}
}

impl ClientConfig {
	fn validate(&self, allow_insecure: bool) -> Result<(), ConfigError> {
		if self.base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase { url: self.base_url.to_string() });
		}
		if self.base_url.scheme() != "https" && !(allow_insecure && self.base_url.scheme() == "http")
		{
			return Err(ConfigError::InsecureBaseUrl { url: self.base_url.to_string() });
		}

		validate_path("login", &self.endpoints.login)?;
		validate_path("refresh", &self.endpoints.refresh)?;
		validate_path("logout", &self.endpoints.logout)?;
		validate_path("protected prefix", &self.protected_prefix)?;
		validate_path("sign-in", &self.sign_in_path)?;

		if !is_header_name(&self.origin_header) {
			return Err(ConfigError::InvalidHeader { name: self.origin_header.clone() });
		}
		if self.origin.as_deref().is_some_and(|origin| !is_header_value(origin)) {
			return Err(ConfigError::InvalidHeader { name: self.origin_header.clone() });
		}

		Ok(())
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidPath { name, path: path.to_owned() })
	}
}

pub(crate) fn is_header_name(name: &str) -> bool {
	!name.is_empty()
		&& name.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

pub(crate) fn is_header_value(value: &str) -> bool {
	value.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	#[test]
	fn defaults_cover_auth_endpoints_and_redirect_rules() {
		let config = ClientConfig::builder(url("https://api.leadscore.example"))
			.build()
			.expect("Default config should build.");

		assert_eq!(config.endpoints.login, "/auth/login");
		assert_eq!(config.endpoints.refresh, "/auth/refresh");
		assert_eq!(config.endpoints.logout, "/auth/logout");
		assert_eq!(config.origin, None);
		assert_eq!(config.origin_header, "Origin");
		assert_eq!(config.protected_prefix, "/dashboard");
		assert_eq!(config.sign_in_path, "/sign-in");
	}

	#[test]
	fn plain_http_requires_opt_in() {
		let err = ClientConfig::builder(url("http://localhost:8080"))
			.build()
			.expect_err("Plain HTTP should be rejected by default.");

		assert!(matches!(err, ConfigError::InsecureBaseUrl { .. }));

		ClientConfig::builder(url("http://localhost:8080"))
			.allow_insecure(true)
			.build()
			.expect("Plain HTTP should be accepted once allowed.");
	}

	#[test]
	fn rejects_relative_paths_and_bad_headers() {
		let err = ClientConfig::builder(url("https://api.leadscore.example"))
			.refresh_path("auth/refresh")
			.build()
			.expect_err("Relative refresh path should be rejected.");

		assert!(matches!(err, ConfigError::InvalidPath { name: "refresh", .. }));

		let err = ClientConfig::builder(url("https://api.leadscore.example"))
			.origin_header("X Origin")
			.build()
			.expect_err("Header names with spaces should be rejected.");

		assert!(matches!(err, ConfigError::InvalidHeader { .. }));

		let err = ClientConfig::builder(url("https://api.leadscore.example"))
			.origin("https://app.leadscore.example\n")
			.build()
			.expect_err("Origins with control characters should be rejected.");

		assert!(matches!(err, ConfigError::InvalidHeader { .. }));
	}

	#[test]
	fn rejects_non_base_urls() {
		let err = ClientConfig::builder(url("mailto:ops@leadscore.example"))
			.build()
			.expect_err("Non-base URLs should be rejected.");

		assert!(matches!(err, ConfigError::CannotBeABase { .. }));
	}
}
