//! Sign-in, explicit refresh, sign-out, and session inspection.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, LoginCredentials},
	client::{ApiClient, envelope},
	http::{ApiRequest, ApiTransport},
	obs::{self, AuthOp, AuthSpan, OpOutcome},
	session::SessionState,
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Signs in and stores the returned access token.
	///
	/// A 401 here means bad credentials, so the login call never enters token recovery.
	pub async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken> {
		const OP: AuthOp = AuthOp::Login;

		let span = AuthSpan::new(OP, "login");

		obs::record_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let request = ApiRequest::post(self.config.endpoints.login.clone())
					.with_json(credentials)?;
				let response = envelope::into_success(self.dispatch(&request, None).await?)?;
				let payload: envelope::TokenPayload = envelope::decode_data(&response)?;

				if payload.access_token.is_empty() {
					return Err(Error::EmptyToken { endpoint: self.config.endpoints.login.clone() });
				}

				let token = AccessToken::new(payload.access_token);

				self.store.save(token.clone()).await?;

				Ok::<_, Error>(token)
			})
			.await;

		obs::record_result(OP, result)
	}

	/// Refreshes the access token now, joining a refresh that is already in flight.
	///
	/// Failure has the same consequences as a failed automatic refresh: the token is cleared
	/// and the session observer is notified.
	pub async fn refresh(&self) -> Result<AccessToken> {
		self.refresh_shared().await
	}

	/// Signs out. The stored token is cleared whatever the endpoint answers.
	///
	/// A 401 from the endpoint means the server-side session is already gone and counts as
	/// success. A refresh still in flight is revoked: it fails with
	/// [`RefreshFailure::SignedOut`](crate::error::RefreshFailure::SignedOut) instead of
	/// storing its token.
	pub async fn logout(&self) -> Result<()> {
		const OP: AuthOp = AuthOp::Logout;

		let span = AuthSpan::new(OP, "logout");

		obs::record_outcome(OP, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				self.refresh.revoke();

				let token = self.store.load().await?;
				let request = ApiRequest::delete(self.config.endpoints.logout.clone());
				let outcome = self.dispatch(&request, token.as_ref()).await.and_then(|response| {
					if response.is_unauthorized() {
						Ok(response)
					} else {
						envelope::into_success(response)
					}
				});

				self.store.clear().await?;

				outcome.map(|_| ())
			})
			.await;

		obs::record_result(OP, result)
	}

	/// Current lifecycle state of the session.
	pub async fn session_state(&self) -> Result<SessionState> {
		if self.refresh.is_in_flight() {
			return Ok(SessionState::RefreshPending);
		}

		Ok(match self.store.load().await? {
			Some(_) => SessionState::Authenticated,
			None => SessionState::Unauthenticated,
		})
	}

	/// Currently stored access token.
	pub async fn access_token(&self) -> Result<Option<AccessToken>> {
		Ok(self.store.load().await?)
	}
}
