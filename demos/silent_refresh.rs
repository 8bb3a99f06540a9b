//! Demonstrates a dashboard session whose access token expires mid-flight.
//!
//! Three list views load at once with an expired token. The client issues one refresh call,
//! replays all three requests with the new token, and the caller only ever sees data.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use leadscore_client::{
	auth::AccessToken,
	client::ReqwestApiClient,
	config::ClientConfig,
	session::RecordingSessionObserver,
	store::MemoryStore,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	for collection in ["customers", "predictions", "campaigns"] {
		server
			.mock_async(|when, then| {
				when.method(GET)
					.path(format!("/api/{collection}"))
					.header("authorization", "Bearer expired");
				then.status(401).json_body(json!({ "message": "Unauthorized" }));
			})
			.await;
		server
			.mock_async(|when, then| {
				when.method(GET)
					.path(format!("/api/{collection}"))
					.header("authorization", "Bearer renewed");
				then.status(200).json_body(json!({ "data": [{ "collection": collection }] }));
			})
			.await;
	}

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200).json_body(json!({ "data": { "accessToken": "renewed" } }));
		})
		.await;
	let config = ClientConfig::builder(Url::parse(&server.url("/api"))?)
		.allow_insecure(true)
		.origin("https://app.leadscore.test")
		.build()?;
	let store = Arc::new(MemoryStore::with_token(AccessToken::new("expired")));
	let observer = Arc::new(RecordingSessionObserver::at("/dashboard"));
	let client = ReqwestApiClient::new(config, store.clone())?.with_observer(observer.clone());
	let (customers, predictions, campaigns) = tokio::try_join!(
		client.customers().list::<Vec<Value>>(&[]),
		client.predictions().list::<Vec<Value>>(&[]),
		client.campaigns().list::<Vec<Value>>(&[]),
	)?;

	println!("customers: {customers:?}");
	println!("predictions: {predictions:?}");
	println!("campaigns: {campaigns:?}");
	println!("refresh calls: {}", refresh.calls_async().await);
	println!("refresh metrics: {:?}", client.refresh_metrics());
	println!("stored token: {:?}", store.current().map(|token| token.fingerprint()));
	println!("session expiries: {}", observer.take_events().len());

	Ok(())
}
