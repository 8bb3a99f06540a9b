#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
use tokio::sync::Semaphore;
// self
use leadscore_client::{
	auth::AccessToken,
	client::ApiClient,
	config::ClientConfig,
	error::TransportError,
	http::{ApiResponse, ApiTransport, PreparedRequest, TransportFuture},
	session::RecordingSessionObserver,
	store::MemoryStore,
	url::Url,
};

const OPEN_PERMITS: usize = 1_024;

/// Builds a config rooted at `base`, allowing plain HTTP for local mock servers.
pub fn config(base: &str) -> ClientConfig {
	ClientConfig::builder(Url::parse(base).expect("Test base URL should parse."))
		.allow_insecure(true)
		.build()
		.expect("Test config should build.")
}

#[cfg(feature = "reqwest")]
/// Builds a reqwest-backed client against `base` plus handles to its store and observer.
pub fn reqwest_client(
	base: &str,
	token: Option<&str>,
	location: &str,
) -> (
	leadscore_client::client::ReqwestApiClient,
	Arc<MemoryStore>,
	Arc<RecordingSessionObserver>,
) {
	let store = Arc::new(seeded_store(token));
	let observer = Arc::new(RecordingSessionObserver::at(location));
	let client = leadscore_client::client::ReqwestApiClient::new(config(base), store.clone())
		.expect("Reqwest test client should build.")
		.with_observer(observer.clone());

	(client, store, observer)
}

/// Builds a client over a [`ScriptedApi`] plus handles to its store and observer.
pub fn scripted_client(
	api: ScriptedApi,
	token: Option<&str>,
	location: &str,
) -> (ApiClient<ScriptedApi>, Arc<ScriptedApi>, Arc<MemoryStore>, Arc<RecordingSessionObserver>) {
	let api = Arc::new(api);
	let store = Arc::new(seeded_store(token));
	let observer = Arc::new(RecordingSessionObserver::at(location));
	let client = ApiClient::with_transport(
		config("https://api.leadscore.test/v1"),
		store.clone(),
		api.clone(),
	)
	.with_observer(observer.clone());

	(client, api, store, observer)
}

fn seeded_store(token: Option<&str>) -> MemoryStore {
	match token {
		Some(token) => MemoryStore::with_token(AccessToken::new(token)),
		None => MemoryStore::default(),
	}
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
	let deadline = tokio::time::Instant::now() + Duration::from_secs(2);

	while !condition() {
		assert!(tokio::time::Instant::now() < deadline, "Condition should hold within 2s.");

		tokio::time::sleep(Duration::from_millis(5)).await;
	}
}

/// In-process stand-in for the API.
///
/// Resource calls succeed only with the currently accepted bearer token. Refresh calls mint
/// `<prefix>-<n>` tokens, or answer with a configured failure status, and can be held at a
/// gate so tests can queue requests behind an in-flight refresh.
pub struct ScriptedApi {
	accepted: Mutex<Option<String>>,
	prefix: String,
	refresh_status: u16,
	gate: Semaphore,
	refresh_calls: AtomicUsize,
	authorizations: Mutex<Vec<Option<String>>>,
}
impl ScriptedApi {
	pub fn new(accepted: Option<&str>, prefix: &str) -> Self {
		Self {
			accepted: Mutex::new(accepted.map(str::to_owned)),
			prefix: prefix.to_owned(),
			refresh_status: 200,
			gate: Semaphore::new(OPEN_PERMITS),
			refresh_calls: AtomicUsize::new(0),
			authorizations: Mutex::new(Vec::new()),
		}
	}

	/// Holds refresh calls until [`ScriptedApi::open_gate`] is called.
	pub fn gated(mut self) -> Self {
		self.gate = Semaphore::new(0);

		self
	}

	/// Answers refresh calls with `status` instead of a new token.
	pub fn failing_refresh(mut self, status: u16) -> Self {
		self.refresh_status = status;

		self
	}

	pub fn open_gate(&self) {
		self.gate.add_permits(OPEN_PERMITS);
	}

	/// Stops accepting the current token, as if it expired server-side.
	pub fn expire_token(&self) {
		*self.accepted.lock() = None;
	}

	pub fn refresh_calls(&self) -> usize {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	/// `Authorization` headers seen on non-refresh calls, in arrival order.
	pub fn authorizations(&self) -> Vec<Option<String>> {
		self.authorizations.lock().clone()
	}
}
impl ApiTransport for ScriptedApi {
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let authorization = request.header("authorization").map(str::to_owned);

			if request.url.path().ends_with("/auth/refresh") {
				let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
				let _permit = self.gate.acquire().await.map_err(TransportError::network)?;

				if self.refresh_status != 200 {
					return Ok(ApiResponse::new(
						self.refresh_status,
						r#"{"message":"Refresh token revoked"}"#,
					));
				}

				let token = format!("{}-{n}", self.prefix);

				*self.accepted.lock() = Some(token.clone());

				return Ok(ApiResponse::new(
					200,
					format!(r#"{{"data":{{"accessToken":"{token}"}}}}"#),
				));
			}

			self.authorizations.lock().push(authorization.clone());

			let accepted = self.accepted.lock().as_ref().map(|token| format!("Bearer {token}"));

			if authorization.is_some() && authorization == accepted {
				Ok(ApiResponse::new(
					200,
					format!(r#"{{"data":{{"path":"{}"}}}}"#, request.url.path()),
				))
			} else {
				Ok(ApiResponse::new(401, r#"{"message":"Unauthorized"}"#))
			}
		})
	}
}
