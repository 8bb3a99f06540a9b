//! Login credentials posted to the sign-in endpoint.

// self
use crate::_prelude::*;

/// Email/password pair for `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
	/// Account email address.
	pub email: String,
	/// Account password; never logged.
	pub password: String,
}
impl LoginCredentials {
	/// Creates a credential pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for LoginCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginCredentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_redacts_password() {
		let credentials = LoginCredentials::new("analyst@bank.example", "hunter2");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("analyst@bank.example"));
		assert!(!rendered.contains("hunter2"));
	}

	#[test]
	fn serializes_as_login_payload() {
		let payload = serde_json::to_value(LoginCredentials::new("a@b.example", "pw"))
			.expect("Credentials should serialize to JSON.");

		assert_eq!(payload, serde_json::json!({ "email": "a@b.example", "password": "pw" }));
	}
}
