//! Client-level error types shared by the transport, refresh, and resource layers.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Callers only ever see one of these: a successful silent refresh never surfaces.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Terminal refresh failure; the session has been cleared.
	#[error(transparent)]
	Refresh(#[from] RefreshFailure),

	/// Upstream API answered with a non-success status unrelated to token recovery.
	#[error("API request failed with status {status}: {message}.")]
	Api {
		/// HTTP status code returned by the API.
		status: u16,
		/// Message extracted from the `{ data: { message } }` envelope, or the status reason.
		message: String,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be encoded.")]
	Encode(#[from] serde_json::Error),
	/// Response body could not be decoded into the requested type.
	#[error("API response could not be decoded.")]
	Decode {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
	/// Sign-in answered 2xx without a usable access token.
	#[error("Endpoint {endpoint} returned an empty access token.")]
	EmptyToken {
		/// Path of the endpoint that answered.
		endpoint: String,
	},
}
impl Error {
	/// Returns the HTTP status attached to the error, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } | Self::Decode { status, .. } => Some(*status),
			Self::Refresh(failure) => failure.status(),
			_ => None,
		}
	}

	/// Returns `true` when the error came from an authorization-denied response.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot carry path segments (e.g. `mailto:`).
	#[error("Base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Base URL must use HTTPS unless insecure URLs were explicitly allowed.
	#[error("Base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// A configured path is not absolute.
	#[error("The {name} path must start with '/': {path}.")]
	InvalidPath {
		/// Which path failed validation.
		name: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// A header name or value is not representable on the wire.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name that failed validation.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Reason a token refresh could not produce a new access token.
///
/// The value is cloned to every request queued behind the refresh, so it carries
/// rendered messages instead of source errors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshFailure {
	/// Refresh endpoint answered with a non-success status (expired or revoked session).
	#[error("Refresh endpoint rejected the session with status {status}: {message}.")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
		/// Message extracted from the error envelope.
		message: String,
	},
	/// Refresh call never produced a response.
	#[error("Refresh call failed before a response arrived: {message}.")]
	Network {
		/// Rendered transport error.
		message: String,
	},
	/// Refresh endpoint answered 2xx without a usable access token.
	#[error("Refresh endpoint returned a malformed payload: {message}.")]
	Malformed {
		/// Rendered decoding error.
		message: String,
	},
	/// The refreshed token could not be persisted.
	#[error("Refreshed token could not be stored: {message}.")]
	Storage {
		/// Rendered storage error.
		message: String,
	},
	/// The session was signed out while the refresh was in flight; its token was discarded.
	#[error("Session was signed out while the refresh was in flight.")]
	SignedOut,
	/// The task driving the refresh was dropped before it settled.
	#[error("Refresh was abandoned before it settled.")]
	Abandoned,
}
impl RefreshFailure {
	/// Returns the HTTP status of a rejected refresh.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_helpers_cover_api_and_refresh_errors() {
		let api = Error::Api { status: 404, message: "Customer not found".into() };

		assert_eq!(api.status(), Some(404));
		assert!(!api.is_unauthorized());

		let refresh: Error =
			RefreshFailure::Rejected { status: 401, message: "Session expired".into() }.into();

		assert!(refresh.is_unauthorized());
		assert_eq!(Error::from(RefreshFailure::Abandoned).status(), None);
	}

	#[test]
	fn body_serialization_failures_are_encode_errors() {
		let source = serde_json::to_value(std::collections::BTreeMap::from([((1_u8, 2_u8), 3_u8)]))
			.expect_err("Tuple map keys should not serialize.");
		let err = Error::from(source);

		assert!(matches!(err, Error::Encode(_)));
		assert!(err.source().is_some());
		assert_eq!(err.status(), None);
	}

	#[test]
	fn refresh_failure_renders_reason() {
		let failure = RefreshFailure::Network { message: "connection reset".into() };

		assert_eq!(
			failure.to_string(),
			"Refresh call failed before a response arrived: connection reset."
		);
	}
}
