//! Authenticated API client with transparent recovery from expired access tokens.
//!
//! Every request runs through two hooks:
//!
//! - **pre-send**: attach `Authorization: Bearer <token>` when a token is stored, plus the
//!   caller-origin header when one is configured. Never fails.
//! - **post-receive**: on a 401 for a request that is neither the refresh call nor already
//!   replayed, obtain a fresh token through the [`RefreshCoordinator`] (leading the refresh or
//!   queueing behind the one in flight) and replay the request once with it. Every other
//!   outcome passes through unchanged.
//!
//! Callers only see data or a normalized [`Error`]; the refresh mechanics stay invisible
//! unless the refresh itself fails.

mod auth;
mod envelope;

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::ClientConfig,
	error::RefreshFailure,
	http::{ApiRequest, ApiResponse, ApiTransport, PreparedRequest},
	obs::{self, AuthOp, AuthSpan, OpOutcome},
	refresh::{RefreshCoordinator, RefreshLead, RefreshMetrics, RefreshTicket},
	session::{NoopSessionObserver, SessionExpired, SessionObserver},
	store::TokenStore,
};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Authenticated client for the lead-scoring API.
///
/// Clones share the transport, token store, observer, and refresh coordinator, so a refresh
/// triggered through one clone is joined by requests issued through any other.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Validated client configuration.
	pub config: Arc<ClientConfig>,
	/// Storage for the current access token.
	pub store: Arc<dyn TokenStore>,
	/// Host hook notified when the session cannot be recovered.
	pub observer: Arc<dyn SessionObserver>,
	refresh: Arc<RefreshCoordinator>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client over a caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			config: Arc::new(config),
			store,
			observer: Arc::new(NoopSessionObserver),
			refresh: Default::default(),
		}
	}

	/// Registers the session-expired observer.
	pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
		self.observer = observer;

		self
	}

	/// Refresh coordinator shared by all clones of this client.
	pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
		&self.refresh
	}

	/// Counters describing refresh activity.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		self.refresh.metrics()
	}

	/// Sends `request`, recovering from an expired token at most once.
	///
	/// Resolves with the 2xx response; any other status becomes [`Error::Api`], and a failed
	/// refresh becomes [`Error::Refresh`].
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const OP: AuthOp = AuthOp::Request;

		let span = AuthSpan::new(OP, "send");

		obs::record_outcome(OP, OpOutcome::Attempt);

		let result = span.instrument(self.send_authenticated(request)).await;

		obs::record_result(OP, result)
	}

	/// Sends `request` and decodes the `data` member of the response envelope.
	pub async fn fetch<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let response = self.send(request).await?;

		envelope::decode_data(&response)
	}

	async fn send_authenticated(&self, mut request: ApiRequest) -> Result<ApiResponse> {
		let token = self.store.load().await?;
		let response = self.dispatch(&request, token.as_ref()).await?;

		if !self.should_recover(&request, &response) {
			return envelope::into_success(response);
		}

		request.mark_retried();

		let token = self.recover(token).await?;
		let replay = self.dispatch(&request, Some(&token)).await?;

		envelope::into_success(replay)
	}

	fn should_recover(&self, request: &ApiRequest, response: &ApiResponse) -> bool {
		response.is_unauthorized()
			&& !request.is_retried()
			&& !self.config.is_refresh_path(&request.path)
	}

	/// Obtains a token newer than `stale`, joining or leading a refresh as needed.
	async fn recover(&self, stale: Option<AccessToken>) -> Result<AccessToken> {
		// Another request may have finished a refresh while this one was on the wire.
		match self.store.load().await? {
			Some(current) if Some(&current) != stale.as_ref() => Ok(current),
			_ => self.refresh_shared().await,
		}
	}

	pub(crate) async fn refresh_shared(&self) -> Result<AccessToken> {
		match self.refresh.begin() {
			RefreshTicket::Lead(lead) => self.lead_refresh(lead).await,
			RefreshTicket::Wait(waiter) => Ok(waiter.wait().await?),
		}
	}

	async fn lead_refresh(&self, lead: RefreshLead<'_>) -> Result<AccessToken> {
		const OP: AuthOp = AuthOp::Refresh;

		let span = AuthSpan::new(OP, "lead_refresh");

		obs::record_outcome(OP, OpOutcome::Attempt);

		let outcome = span
			.instrument(async {
				let token = self.call_refresh_endpoint().await?;

				if !lead.is_current() {
					return Err(RefreshFailure::SignedOut);
				}

				self.store
					.save(token.clone())
					.await
					.map_err(|e| RefreshFailure::Storage { message: e.to_string() })?;

				// A sign-out may have cleared the store while the save was pending.
				if !lead.is_current() {
					self.clear_token("refresh_signed_out").await;

					return Err(RefreshFailure::SignedOut);
				}

				Ok::<_, RefreshFailure>(token)
			})
			.await;

		// The stale token must be gone before the flag drops; a refresh started after that
		// point stores a token this clear would otherwise erase.
		if outcome.as_ref().is_err_and(|failure| *failure != RefreshFailure::SignedOut) {
			self.clear_token("expire_session").await;
		}

		let released = lead.settle(outcome.clone());

		obs::refresh_settled(
			outcome.as_ref().ok().map(AccessToken::fingerprint).as_deref(),
			released,
		);

		let result = match outcome {
			Ok(token) => Ok(token),
			Err(failure) => {
				if failure != RefreshFailure::SignedOut {
					self.notify_session_expired(&failure);
				}

				Err(failure.into())
			},
		};

		obs::record_result(OP, result)
	}

	async fn call_refresh_endpoint(&self) -> Result<AccessToken, RefreshFailure> {
		let request = ApiRequest::post(self.config.endpoints.refresh.clone());
		let stale = self.store.load().await.ok().flatten();
		let response = self
			.dispatch(&request, stale.as_ref())
			.await
			.map_err(|e| RefreshFailure::Network { message: render_chain(&e) })?;

		if !response.is_success() {
			return Err(RefreshFailure::Rejected {
				status: response.status,
				message: envelope::error_message(&response),
			});
		}

		let payload: envelope::TokenPayload = envelope::decode_data(&response)
			.map_err(|e| RefreshFailure::Malformed { message: render_chain(&e) })?;

		if payload.access_token.is_empty() {
			return Err(RefreshFailure::Malformed { message: "access token is empty".into() });
		}

		Ok(AccessToken::new(payload.access_token))
	}

	async fn clear_token(&self, stage: &'static str) {
		if let Err(e) = self.store.clear().await {
			obs::store_warning(stage, &e);
		}
	}

	fn notify_session_expired(&self, failure: &RefreshFailure) {
		let redirect_to = self
			.observer
			.current_location()
			.filter(|location| self.config.is_protected_location(location))
			.map(|_| self.config.sign_in_path.clone());

		self.observer.session_expired(&SessionExpired { failure: failure.clone(), redirect_to });
	}

	async fn dispatch(
		&self,
		request: &ApiRequest,
		token: Option<&AccessToken>,
	) -> Result<ApiResponse> {
		let prepared = self.prepare(request, token);

		Ok(self.transport.execute(prepared).await?)
	}

	/// Pre-send hook: resolves the URL and attaches bearer and origin headers.
	pub(crate) fn prepare(
		&self,
		request: &ApiRequest,
		token: Option<&AccessToken>,
	) -> PreparedRequest {
		let config = &self.config;
		let mut headers = request
			.headers
			.iter()
			.filter(|(name, _)| {
				!name.eq_ignore_ascii_case("authorization")
					&& !name.eq_ignore_ascii_case(&config.origin_header)
			})
			.cloned()
			.collect::<Vec<_>>();

		if let Some(token) = token {
			headers.push(("Authorization".into(), token.bearer()));
		}
		if let Some(origin) = &config.origin {
			headers.push((config.origin_header.clone(), origin.clone()));
		}

		PreparedRequest {
			method: request.method,
			url: config.endpoint_url(&request.path, &request.query),
			headers,
			body: request.body.as_ref().map(|body| body.to_string().into_bytes()),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client with its own cookie-aware reqwest transport.
	pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config)?;

		Ok(Self::with_transport(config, store, transport))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			config: self.config.clone(),
			store: self.store.clone(),
			observer: self.observer.clone(),
			refresh: self.refresh.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("refresh", &self.refresh)
			.finish()
	}
}

/// Renders an error and its sources as `outer: inner: ...`.
fn render_chain(error: &dyn StdError) -> String {
	let mut rendered = error.to_string();
	let mut source = error.source();

	while let Some(cause) = source {
		rendered.push_str(": ");
		rendered.push_str(&cause.to_string());
		source = cause.source();
	}

	rendered
}
