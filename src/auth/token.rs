//! Redacted bearer token wrapper with expiry-claim inspection.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const FINGERPRINT_LEN: usize = 12;

/// Short-lived bearer credential attached to every authenticated request.
///
/// The value is opaque to the client except for the `exp` claim of JWT-shaped tokens,
/// which is decoded on demand. `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the `Authorization` header value for this token.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}

	/// Decodes the embedded `exp` claim, if the token is a JWT that carries one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let mut parts = self.0.split('.');
		let (_, payload, _) = (parts.next()?, parts.next()?, parts.next()?);

		if parts.next().is_some() {
			return None;
		}

		let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
		let claims: ExpiryClaim = serde_json::from_slice(&bytes).ok()?;

		OffsetDateTime::from_unix_timestamp(claims.exp?).ok()
	}

	/// Returns `true` when the expiry claim is known and lies at or before `instant`.
	///
	/// Tokens without a decodable claim are never considered expired locally; the API
	/// remains the authority through its 401 responses.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| expires_at <= instant)
	}

	/// Short SHA-256 prefix that identifies the token in logs without revealing it.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());

		digest[..FINGERPRINT_LEN / 2].iter().map(|byte| format!("{byte:02x}")).collect()
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[derive(Deserialize)]
struct ExpiryClaim {
	exp: Option<i64>,
}
